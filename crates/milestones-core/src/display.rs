//! Display toggles for the milestone list.
//!
//! Four independent flags, all on by default. They only decide whether a
//! field's text is drawn; filtering and grouping never look at them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::storage::MilestoneDb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayField {
    Title,
    Target,
    Countdown,
    Notes,
}

impl DisplayField {
    pub const ALL: [DisplayField; 4] = [
        DisplayField::Title,
        DisplayField::Target,
        DisplayField::Countdown,
        DisplayField::Notes,
    ];

    /// Settings-store key.
    pub fn key(self) -> &'static str {
        match self {
            DisplayField::Title => "showTitle",
            DisplayField::Target => "showTarget",
            DisplayField::Countdown => "showCountdown",
            DisplayField::Notes => "showNotes",
        }
    }
}

impl fmt::Display for DisplayField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayField::Title => "title",
            DisplayField::Target => "target",
            DisplayField::Countdown => "countdown",
            DisplayField::Notes => "notes",
        };
        f.write_str(name)
    }
}

impl FromStr for DisplayField {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DisplayField::ALL
            .into_iter()
            .find(|f| s.eq_ignore_ascii_case(&f.to_string()) || s == f.key())
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "display field".into(),
                message: format!("'{s}' is not one of title, target, countdown, notes"),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    pub show_title: bool,
    pub show_target: bool,
    pub show_countdown: bool,
    pub show_notes: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_title: true,
            show_target: true,
            show_countdown: true,
            show_notes: true,
        }
    }
}

impl DisplaySettings {
    pub fn is_shown(&self, field: DisplayField) -> bool {
        match field {
            DisplayField::Title => self.show_title,
            DisplayField::Target => self.show_target,
            DisplayField::Countdown => self.show_countdown,
            DisplayField::Notes => self.show_notes,
        }
    }

    fn slot(&mut self, field: DisplayField) -> &mut bool {
        match field {
            DisplayField::Title => &mut self.show_title,
            DisplayField::Target => &mut self.show_target,
            DisplayField::Countdown => &mut self.show_countdown,
            DisplayField::Notes => &mut self.show_notes,
        }
    }

    /// Read all four flags; unset flags are `true`.
    pub fn load(db: &MilestoneDb) -> Result<Self> {
        let mut settings = Self::default();
        for field in DisplayField::ALL {
            if let Some(value) = db.get_flag(field.key())? {
                *settings.slot(field) = value;
            }
        }
        Ok(settings)
    }

    /// Set one flag and persist it.
    pub fn set(&mut self, db: &MilestoneDb, field: DisplayField, value: bool) -> Result<()> {
        db.set_flag(field.key(), value)?;
        *self.slot(field) = value;
        Ok(())
    }

    /// Flip one flag and persist it. Returns the new value.
    pub fn toggle(&mut self, db: &MilestoneDb, field: DisplayField) -> Result<bool> {
        let value = !self.is_shown(field);
        self.set(db, field, value)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_all_shown() {
        let db = MilestoneDb::open_memory().unwrap();
        let settings = DisplaySettings::load(&db).unwrap();
        assert_eq!(settings, DisplaySettings::default());
        assert!(DisplayField::ALL.iter().all(|f| settings.is_shown(*f)));
    }

    #[test]
    fn toggle_flips_only_one_flag_and_persists() {
        let db = MilestoneDb::open_memory().unwrap();
        let mut settings = DisplaySettings::load(&db).unwrap();
        assert!(!settings.toggle(&db, DisplayField::Notes).unwrap());

        let reloaded = DisplaySettings::load(&db).unwrap();
        assert!(!reloaded.show_notes);
        assert!(reloaded.show_title && reloaded.show_target && reloaded.show_countdown);
        assert_eq!(db.get_flag("showNotes").unwrap(), Some(false));

        assert!(settings.toggle(&db, DisplayField::Notes).unwrap());
        assert!(DisplaySettings::load(&db).unwrap().show_notes);
    }

    #[test]
    fn field_parses_from_name_or_key() {
        assert_eq!("notes".parse::<DisplayField>().unwrap(), DisplayField::Notes);
        assert_eq!("Countdown".parse::<DisplayField>().unwrap(), DisplayField::Countdown);
        assert_eq!("showTarget".parse::<DisplayField>().unwrap(), DisplayField::Target);
        assert!("colour".parse::<DisplayField>().is_err());
    }

    #[test]
    fn serializes_with_settings_keys() {
        let json = serde_json::to_value(DisplaySettings::default()).unwrap();
        for field in DisplayField::ALL {
            assert_eq!(json[field.key()], true);
        }
    }
}
