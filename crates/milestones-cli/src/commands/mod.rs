pub mod config;
pub mod display;
pub mod milestone;
pub mod watch;

use milestones_core::{Config, MilestoneDb};

/// Open the record store. Failing here is fatal for every command.
pub fn open_db() -> Result<MilestoneDb, Box<dyn std::error::Error>> {
    Ok(MilestoneDb::open()?)
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::load()?)
}
