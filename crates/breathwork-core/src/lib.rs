//! # Breathwork Core Library
//!
//! This library provides the domain logic behind the Breathwork app's
//! guided challenges and breath-hold measurement. It follows a CLI-first
//! philosophy: every operation is available through the standalone CLI
//! binary, and UI layers are thin consumers of the same types.
//!
//! ## Architecture
//!
//! - **Clock**: injectable time source so every evaluation is reproducible
//! - **Challenge**: pure window calculator, eligibility resolver and progress
//!   aggregator, plus an async status service over collaborator ports
//! - **KP**: multi-attempt control-pause measurement
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`current_day`]: challenge day for an instant
//! - [`EligibilityResolver`]: visibility and actionability of today's challenge
//! - [`aggregate`]: completed-day count and per-day lookup
//! - [`ChallengeStatusService`]: fetch, resolve and aggregate in one call
//! - [`Config`]: application configuration management

pub mod challenge;
pub mod clock;
pub mod error;
pub mod kp;
pub mod storage;

pub use challenge::{
    aggregate, current_day, AccessGrant, AccessType, ActiveChallengeStatus, CachePolicy,
    ChallengeDefinition, ChallengeState, ChallengeStatusService, DayProgress, Eligibility,
    EligibilityResolver, OverrideList, ProgressSummary, Registration, User, ValidatedProgress,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigurationError, CoreError, ProgressError, RetrievalError, ValidationError};
pub use kp::{KpConfig, KpMeasurement, KpRating, KpResult};
pub use storage::Config;
