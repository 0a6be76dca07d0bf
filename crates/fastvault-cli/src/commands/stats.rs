use clap::Subcommand;
use fastvault_core::Database;

use super::CliResult;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Aggregate statistics over recorded fasts
    Summary,
    /// Recent fasts, newest first
    History {
        #[arg(long, default_value = "10")]
        limit: u32,
    },
}

pub fn run(action: StatsAction) -> CliResult {
    let db = Database::open()?;
    match action {
        StatsAction::Summary => {
            println!("{}", serde_json::to_string_pretty(&db.stats()?)?);
        }
        StatsAction::History { limit } => {
            println!("{}", serde_json::to_string_pretty(&db.history(limit)?)?);
        }
    }
    Ok(())
}
