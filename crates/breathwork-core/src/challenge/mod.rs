//! 21-day challenge: window calculation, eligibility, progress and the
//! async status service that ties them to the collaborator ports.

mod access;
mod definition;
mod eligibility;
mod memory;
mod ports;
mod progress;
mod service;
mod status;
mod window;

pub use access::{AccessGrant, AccessType};
pub use definition::{ChallengeDefinition, DEFAULT_TOTAL_DAYS};
pub use eligibility::{
    normalize_email, ChallengeState, Eligibility, EligibilityResolver, OverrideList, Registration,
    User,
};
pub use memory::{ChallengeFixture, InMemoryChallengeStore, Port};
pub use ports::{AccessChecker, ProgressStore, RegistrationStore};
pub use progress::{aggregate, DayProgress, ProgressSummary, ValidatedProgress};
pub use service::{CachePolicy, ChallengeStatusService};
pub use status::ActiveChallengeStatus;
pub use window::{current_day, WindowPosition};
