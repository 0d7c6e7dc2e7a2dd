use std::path::PathBuf;

use breathwork_core::challenge::ChallengeFixture;
use breathwork_core::{aggregate, Config, ValidatedProgress};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Completed-day count and per-day completion for one user
    Summary {
        /// Fixture file with progress rows
        #[arg(long)]
        fixture: PathBuf,
        #[arg(long)]
        user_id: String,
    },
}

pub fn run(action: ProgressAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProgressAction::Summary { fixture, user_id } => {
            let config = Config::load()?;
            let definition = config.challenge_definition()?;
            let rows = ChallengeFixture::load(&fixture)?
                .progress
                .into_iter()
                .filter(|row| row.user_id == user_id)
                .collect();
            let progress = ValidatedProgress::new(&user_id, rows, definition.total_days())?;
            println!("{}", serde_json::to_string_pretty(&aggregate(&progress))?);
        }
    }
    Ok(())
}
