//! Milestone commands: add, list, show, edit, delete.

use chrono::{Local, Utc};
use clap::Args;
use milestones_core::view::{self, ViewOptions, TARGET_FORMAT};
use milestones_core::{
    countdown, parse_target, AddForm, DisplaySettings, EditForm, EditStatus, Milestone,
    ValidationError,
};
use tracing::info;

use super::{load_config, open_db};
use crate::render::render_list;

#[derive(Args)]
pub struct AddArgs {
    /// Titles; each becomes its own milestone
    #[arg(required = true)]
    pub titles: Vec<String>,
    /// Notes attached to every added milestone
    #[arg(long, default_value = "")]
    pub notes: String,
    /// Target: RFC 3339, "YYYY-MM-DD HH:MM", or relative like +2h (default: now)
    #[arg(long)]
    pub target: Option<String>,
    /// Print created milestones as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only show milestones whose title or notes contain this text
    #[arg(long, short, default_value = "")]
    pub search: String,
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct EditArgs {
    /// Milestone ID or unique prefix
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New notes
    #[arg(long)]
    pub notes: Option<String>,
    /// New target
    #[arg(long)]
    pub target: Option<String>,
}

pub fn view_options(config: &milestones_core::Config) -> ViewOptions {
    ViewOptions {
        date_format: config.list.date_format.clone(),
        empty_placeholder: config.list.empty_placeholder.clone(),
    }
}

fn print_milestone(m: &Milestone) {
    println!("{}", m.title);
    println!("  id:        {}", m.id);
    println!(
        "  created:   {}",
        m.created_at.with_timezone(&Local).format(TARGET_FORMAT)
    );
    println!(
        "  target:    {}",
        m.target.with_timezone(&Local).format(TARGET_FORMAT)
    );
    println!("  countdown: {}", countdown(m.target, Utc::now()));
    if !m.notes.is_empty() {
        println!("  notes:     {}", m.notes);
    }
}

/// Each title goes through the add form in turn, so consecutive milestones
/// get targets a few minutes apart. A blank title stops the batch.
pub fn add(args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let db = open_db()?;
    let now = Utc::now();

    let mut form = AddForm::new(now).with_advance(config.target_advance());
    if let Some(target) = &args.target {
        form.target = parse_target(target, now)?;
    }

    let mut created = Vec::with_capacity(args.titles.len());
    for title in args.titles {
        form.title = title;
        form.notes = args.notes.clone();
        let milestone = form.submit(&db, now)?;
        info!(id = %milestone.id, "milestone added");
        if !args.json {
            println!("Milestone created: {}", milestone.id);
            println!("  {}  {}", milestone.title, countdown(milestone.target, now));
        }
        created.push(milestone);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    }
    Ok(())
}

pub fn list(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let db = open_db()?;
    let settings = DisplaySettings::load(&db)?;
    let view = view::build(
        db.list_milestones()?,
        &args.search,
        &settings,
        Utc::now(),
        &view_options(&config),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_list(&view));
    }
    Ok(())
}

pub fn show(id: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_db()?;
    let milestone = db.resolve(id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&milestone)?);
    } else {
        print_milestone(&milestone);
    }
    Ok(())
}

pub fn edit(args: EditArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_db()?;
    let mut form = EditForm::bind(db.resolve(&args.id)?);

    // The whole command is one edit session; refuse before writing anything
    // rather than leave a record without a title.
    if args.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ValidationError::EmptyField {
            field: "title".into(),
        }
        .into());
    }
    let target = args
        .target
        .as_deref()
        .map(|t| parse_target(t, Utc::now()))
        .transpose()?;

    let mut statuses = Vec::new();
    if let Some(title) = args.title {
        statuses.push(form.set_title(&db, title)?);
    }
    if let Some(notes) = args.notes {
        statuses.push(form.set_notes(&db, notes)?);
    }
    if let Some(target) = target {
        statuses.push(form.set_target(&db, target)?);
    }
    if statuses.contains(&EditStatus::Closed) {
        return Err(format!("Milestone was deleted while editing: {}", args.id).into());
    }
    form.done()?;

    println!("Milestone updated:");
    print_milestone(form.milestone());
    Ok(())
}

pub fn delete(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_db()?;
    let milestone = db.resolve(id)?;
    db.delete_milestone(&milestone.id)?;
    println!("Milestone deleted: {}", milestone.id);
    Ok(())
}
