use std::path::PathBuf;
use std::sync::Arc;

use breathwork_core::challenge::{ChallengeFixture, InMemoryChallengeStore, WindowPosition};
use breathwork_core::{ChallengeStatusService, Config, FixedClock, User};
use clap::Subcommand;

use super::parse_instant;

#[derive(Subcommand)]
pub enum ChallengeAction {
    /// Current challenge day
    Day {
        /// Evaluate at this RFC 3339 instant instead of now
        #[arg(long)]
        at: Option<String>,
    },
    /// Full status for a user, using records from a JSON fixture
    Status {
        /// Fixture file with registrations, access grants and progress
        #[arg(long)]
        fixture: PathBuf,
        /// User id; omit to evaluate an anonymous visitor
        #[arg(long)]
        user_id: Option<String>,
        /// User email, checked against the override list
        #[arg(long)]
        email: Option<String>,
        /// Evaluate at this RFC 3339 instant instead of now
        #[arg(long)]
        at: Option<String>,
    },
}

pub fn run(action: ChallengeAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        ChallengeAction::Day { at } => {
            let definition = config.challenge_definition()?;
            let now = parse_instant(at.as_deref())?;
            let position = WindowPosition::at(&now, &definition);
            println!("{}", serde_json::to_string_pretty(&position)?);
        }
        ChallengeAction::Status {
            fixture,
            user_id,
            email,
            at,
        } => {
            let resolver = config.resolver()?;
            let now = parse_instant(at.as_deref())?;
            let store = Arc::new(InMemoryChallengeStore::new(ChallengeFixture::load(&fixture)?));
            let service = ChallengeStatusService::with_clock(
                resolver,
                store.clone(),
                store.clone(),
                store,
                FixedClock::new(now),
            )
            .with_cache_policy(config.cache_policy());

            let user = user_id.map(|id| User::new(id, email.as_deref()));
            let runtime = tokio::runtime::Runtime::new()?;
            let status = runtime.block_on(service.status(user.as_ref()))?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }
    Ok(())
}
