//! Live list with countdowns refreshed on a fixed tick.

use std::collections::HashMap;
use std::io::{IsTerminal, Write};

use chrono::{Local, NaiveDate, Utc};
use clap::Args;
use milestones_core::{CountdownTicker, DisplayField, ListView, LiveList, MilestoneDb, RowHandle};
use tracing::debug;

use super::milestone::view_options;
use super::{load_config, open_db};
use crate::render::render_list;

#[derive(Args)]
pub struct WatchArgs {
    /// Only show milestones whose title or notes contain this text
    #[arg(long, short, default_value = "")]
    pub search: String,
    /// Stop after this many refreshes (default: until Ctrl-C)
    #[arg(long)]
    pub ticks: Option<u64>,
}

/// Visible rows and where each sits in the current view.
struct Screen {
    view: ListView,
    rows: HashMap<RowHandle, (usize, usize)>,
    day: NaiveDate,
}

impl Screen {
    /// Rebuild the view and re-attach every visible row to the ticker.
    fn build(
        live: &LiveList,
        ticker: &mut CountdownTicker,
        search: &str,
        options: &milestones_core::ViewOptions,
    ) -> Self {
        let now = Utc::now();
        let view = live.view(search, now, options);
        ticker.detach_all();
        let mut rows = HashMap::new();
        for (si, section) in view.sections().iter().enumerate() {
            for (ri, row) in section.rows.iter().enumerate() {
                rows.insert(ticker.attach(&row.id), (si, ri));
            }
        }
        Self {
            view,
            rows,
            day: now.with_timezone(&Local).date_naive(),
        }
    }

    fn set_countdown(&mut self, row: RowHandle, text: String) {
        let Some(&(si, ri)) = self.rows.get(&row) else {
            return;
        };
        if let ListView::Sections { sections } = &mut self.view {
            sections[si].rows[ri].countdown = text;
        }
    }
}

fn draw(screen: &Screen, clear: bool) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    if clear {
        write!(out, "\x1b[2J\x1b[H")?;
    }
    write!(out, "{}", render_list(&screen.view))?;
    if !clear {
        writeln!(out, "--")?;
    }
    out.flush()
}

async fn watch_loop(db: MilestoneDb, args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let options = view_options(&config);
    let clear = std::io::stdout().is_terminal();

    let mut live = LiveList::attach(&db)?;
    let mut ticker = CountdownTicker::new();
    let mut screen = Screen::build(&live, &mut ticker, &args.search, &options);

    let mut interval = tokio::time::interval(config.tick_interval());
    let mut remaining = args.ticks;
    loop {
        if remaining == Some(0) {
            break;
        }
        tokio::select! {
            _ = interval.tick() => {}
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(|e| format!("cannot listen for Ctrl-C: {e}"))?;
                break;
            }
        }

        db.check_external_changes()?;
        let today = Local::now().date_naive();
        if live.refresh(&db)? || today != screen.day {
            screen = Screen::build(&live, &mut ticker, &args.search, &options);
        }

        let show_countdown = live.settings().is_shown(DisplayField::Countdown);
        for update in ticker.tick(Utc::now(), live.milestones()) {
            let text = update.text();
            let text = if show_countdown {
                text
            } else {
                " ".repeat(text.len())
            };
            screen.set_countdown(update.row, text);
        }
        draw(&screen, clear)?;

        remaining = remaining.map(|n| n - 1);
    }

    debug!(rows = ticker.attached(), "watch stopped");
    ticker.detach_all();
    live.detach(&db);
    Ok(())
}

pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_db()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch_loop(db, args))
}
