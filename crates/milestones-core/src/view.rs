//! Render-ready list of milestones.
//!
//! Combines the list engine with the display toggles. A hidden field is
//! blanked to spaces of the same width, so columns do not shift when a
//! toggle changes.

use std::cell::Cell;
use std::fmt::Display;
use std::rc::Rc;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use crate::countdown::countdown;
use crate::display::{DisplayField, DisplaySettings};
use crate::error::Result;
use crate::events::SubscriptionId;
use crate::list::{self, DEFAULT_DATE_FORMAT};
use crate::milestone::Milestone;
use crate::storage::MilestoneDb;

pub const TARGET_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One rendered milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub id: String,
    pub title: String,
    pub target: String,
    pub countdown: String,
    pub notes: String,
}

/// Rows for one day, under its heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionView {
    pub label: String,
    pub rows: Vec<RowView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ListView {
    Empty { placeholder: String },
    Sections { sections: Vec<SectionView> },
}

impl ListView {
    pub fn sections(&self) -> &[SectionView] {
        match self {
            ListView::Empty { .. } => &[],
            ListView::Sections { sections } => sections,
        }
    }

    pub fn row_count(&self) -> usize {
        self.sections().iter().map(|s| s.rows.len()).sum()
    }
}

/// Rendering knobs that come from config.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub date_format: String,
    pub empty_placeholder: String,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            empty_placeholder: "No milestones yet".to_string(),
        }
    }
}

fn shown(text: String, visible: bool) -> String {
    if visible {
        text
    } else {
        " ".repeat(text.chars().count())
    }
}

pub fn render_row<Tz>(
    m: &Milestone,
    settings: &DisplaySettings,
    now: DateTime<Utc>,
    tz: &Tz,
) -> RowView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    RowView {
        id: m.id.clone(),
        title: shown(m.title.clone(), settings.is_shown(DisplayField::Title)),
        target: shown(
            m.target.with_timezone(tz).format(TARGET_FORMAT).to_string(),
            settings.is_shown(DisplayField::Target),
        ),
        countdown: shown(
            countdown(m.target, now),
            settings.is_shown(DisplayField::Countdown),
        ),
        notes: shown(m.notes.clone(), settings.is_shown(DisplayField::Notes)),
    }
}

/// Filter, group and render `all` as seen at `now` in the local timezone.
pub fn build(
    all: Vec<Milestone>,
    query: &str,
    settings: &DisplaySettings,
    now: DateTime<Utc>,
    options: &ViewOptions,
) -> ListView {
    build_in(all, query, settings, now, &Local, options)
}

pub fn build_in<Tz>(
    all: Vec<Milestone>,
    query: &str,
    settings: &DisplaySettings,
    now: DateTime<Utc>,
    tz: &Tz,
    options: &ViewOptions,
) -> ListView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let groups = list::group_in(list::filter(all, query), tz);
    if groups.is_empty() {
        return ListView::Empty {
            placeholder: options.empty_placeholder.clone(),
        };
    }
    let today = now.with_timezone(tz).date_naive();
    let sections = groups
        .into_iter()
        .map(|g| SectionView {
            label: list::label_for_day_with(g.day, today, &options.date_format),
            rows: g
                .milestones
                .iter()
                .map(|m| render_row(m, settings, now, tz))
                .collect(),
        })
        .collect();
    ListView::Sections { sections }
}

/// A list that re-pulls from the store only after a change was announced.
pub struct LiveList {
    dirty: Rc<Cell<bool>>,
    subscription: SubscriptionId,
    milestones: Vec<Milestone>,
    settings: DisplaySettings,
}

impl LiveList {
    pub fn attach(db: &MilestoneDb) -> Result<Self> {
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        let subscription = db.subscribe(move |_| flag.set(true));
        Ok(Self {
            dirty,
            subscription,
            milestones: db.list_milestones()?,
            settings: DisplaySettings::load(db)?,
        })
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Reload rows and toggles if the store changed. Returns true if reloaded.
    pub fn refresh(&mut self, db: &MilestoneDb) -> Result<bool> {
        if !self.dirty.replace(false) {
            return Ok(false);
        }
        self.milestones = db.list_milestones()?;
        self.settings = DisplaySettings::load(db)?;
        Ok(true)
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn view(&self, query: &str, now: DateTime<Utc>, options: &ViewOptions) -> ListView {
        build(self.milestones.clone(), query, &self.settings, now, options)
    }

    pub fn detach(self, db: &MilestoneDb) {
        db.unsubscribe(self.subscription);
    }
}
