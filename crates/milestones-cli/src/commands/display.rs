use clap::Subcommand;
use milestones_core::{DisplayField, DisplaySettings};

use super::open_db;

#[derive(Subcommand)]
pub enum DisplayAction {
    /// Print the four display flags
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Flip one flag (title, target, countdown, notes)
    Toggle {
        field: DisplayField,
    },
    /// Set one flag explicitly
    Set {
        field: DisplayField,
        #[arg(action = clap::ArgAction::Set)]
        visible: bool,
    },
}

fn print_settings(settings: &DisplaySettings) {
    for field in DisplayField::ALL {
        let state = if settings.is_shown(field) { "shown" } else { "hidden" };
        println!("{:<10} {state}", field.to_string());
    }
}

pub fn run(action: DisplayAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_db()?;
    let mut settings = DisplaySettings::load(&db)?;

    match action {
        DisplayAction::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                print_settings(&settings);
            }
        }
        DisplayAction::Toggle { field } => {
            let visible = settings.toggle(&db, field)?;
            println!("{field}: {}", if visible { "shown" } else { "hidden" });
        }
        DisplayAction::Set { field, visible } => {
            settings.set(&db, field, visible)?;
            println!("{field}: {}", if visible { "shown" } else { "hidden" });
        }
    }
    Ok(())
}
