use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "milestones", version, about = "Track milestones with live countdowns")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one or more milestones
    Add(commands::milestone::AddArgs),
    /// List milestones grouped by day
    List(commands::milestone::ListArgs),
    /// Show one milestone
    Show {
        /// Milestone ID or unique prefix
        id: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a milestone in place
    Edit(commands::milestone::EditArgs),
    /// Delete a milestone
    Delete {
        /// Milestone ID or unique prefix
        id: String,
    },
    /// Keep the list on screen, refreshing countdowns
    Watch(commands::watch::WatchArgs),
    /// Show or hide list fields
    Display {
        #[command(subcommand)]
        action: commands::display::DisplayAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("MILESTONES_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Add(args) => commands::milestone::add(args),
        Commands::List(args) => commands::milestone::list(args),
        Commands::Show { id, json } => commands::milestone::show(&id, json),
        Commands::Edit(args) => commands::milestone::edit(args),
        Commands::Delete { id } => commands::milestone::delete(&id),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Display { action } => commands::display::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "milestones", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
