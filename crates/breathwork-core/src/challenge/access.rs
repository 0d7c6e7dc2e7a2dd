//! Access grants returned by the time-based access check.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::definition::ChallengeDefinition;

/// Where the user stands relative to the challenge access window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    BeforeChallenge,
    DuringChallenge,
    AfterChallenge,
    NoAccess,
}

impl AccessType {
    /// The access type the window itself implies for `now`.
    pub fn for_instant<Tz: TimeZone>(definition: &ChallengeDefinition, now: &DateTime<Tz>) -> Self {
        if !definition.has_started(now) {
            AccessType::BeforeChallenge
        } else if definition.has_ended(now) {
            AccessType::AfterChallenge
        } else {
            AccessType::DuringChallenge
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::BeforeChallenge => "before_challenge",
            AccessType::DuringChallenge => "during_challenge",
            AccessType::AfterChallenge => "after_challenge",
            AccessType::NoAccess => "no_access",
        }
    }
}

/// Result of the external access check for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub has_access: bool,
    pub access_type: AccessType,
}

impl AccessGrant {
    pub fn new(has_access: bool, access_type: AccessType) -> Self {
        Self {
            has_access,
            access_type,
        }
    }

    pub fn denied() -> Self {
        Self::new(false, AccessType::NoAccess)
    }

    /// Grant a member would receive from a time-based check at `now`.
    pub fn for_member<Tz: TimeZone>(definition: &ChallengeDefinition, now: &DateTime<Tz>) -> Self {
        Self::new(true, AccessType::for_instant(definition, now))
    }

    /// True when the grant can be acted on right now.
    pub fn is_active(&self) -> bool {
        self.has_access && self.access_type == AccessType::DuringChallenge
    }

    /// Checks that the access type agrees with the window at `now`.
    /// `NoAccess` is consistent with any instant as long as `has_access` is false.
    pub fn is_consistent_with<Tz: TimeZone>(
        &self,
        definition: &ChallengeDefinition,
        now: &DateTime<Tz>,
    ) -> bool {
        match self.access_type {
            AccessType::NoAccess => !self.has_access,
            other => other == AccessType::for_instant(definition, now),
        }
    }
}
