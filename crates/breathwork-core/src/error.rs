//! Core error types for breathwork-core.
//!
//! This module defines the error hierarchy using thiserror. Retrieval
//! failures from collaborators stay distinguishable from "not eligible"
//! results all the way up to the caller.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

/// Core error type for breathwork-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid challenge or application configuration
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A collaborator could not deliver its data
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    /// Progress rows rejected at the boundary
    #[error("Progress error: {0}")]
    Progress(#[from] ProgressError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Configuration errors. These are raised at construction time and
/// prevent the resolver from being built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Challenge end is not after its start
    #[error("Invalid challenge window: end ({end}) must be after start ({start})")]
    InvalidWindow {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },

    /// Challenge day count is zero
    #[error("Invalid challenge day count: {0} (must be at least 1)")]
    InvalidDayCount(u32),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },
}

/// Failure of an external collaborator (storage, identity, access check).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetrievalError {
    /// Registration lookup failed
    #[error("Registration lookup failed: {message}")]
    Registration { message: String },

    /// Access check failed
    #[error("Access check failed: {message}")]
    Access { message: String },

    /// Progress lookup failed
    #[error("Progress lookup failed: {message}")]
    Progress { message: String },

    /// Collaborator is not reachable at all
    #[error("Service unavailable: {service}")]
    Unavailable { service: String },
}

/// Progress rows that violate the per-day invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressError {
    /// Day number outside `1..=total_days`
    #[error("Day {day} is out of range (challenge has {total_days} days)")]
    DayOutOfRange { day: u32, total_days: u32 },

    /// Two rows for the same user and day
    #[error("Duplicate progress row for user '{user_id}' on day {day}")]
    DuplicateDay { user_id: String, day: u32 },

    /// Row owned by a different user than the one being summarized
    #[error("Progress row for user '{found}' returned for user '{expected}'")]
    ForeignUser { expected: String, found: String },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// More measurement attempts than configured
    #[error("Too many attempts: at most {max} allowed")]
    TooManyAttempts { max: usize },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieval_error_converts_into_core_error() {
        let err: CoreError = RetrievalError::Access {
            message: "timeout".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Retrieval(RetrievalError::Access { .. })));
        assert_eq!(err.to_string(), "Retrieval error: Access check failed: timeout");
    }

    #[test]
    fn progress_error_messages_name_the_day() {
        let err = ProgressError::DuplicateDay {
            user_id: "u1".into(),
            day: 4,
        };
        assert!(err.to_string().contains("day 4"));
        assert!(err.to_string().contains("u1"));
    }
}
