//! Eligibility resolver.
//!
//! Decides whether the "today's challenge" affordance renders and whether it
//! can be acted on. Visibility and activity are separate: an override user
//! can see the challenge outside the window, while a registered user only
//! sees it while their access grant says the challenge is running.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::access::AccessGrant;
use super::definition::ChallengeDefinition;
use super::window::current_day;
use crate::error::RetrievalError;

/// Authenticated identity as seen by the challenge core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            id: id.into(),
            email: email.map(str::to_string),
        }
    }
}

/// A user's opt-in to a challenge. Its presence is the only signal used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub user_id: String,
    pub challenge_id: String,
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,
}

impl Registration {
    pub fn new(user_id: impl Into<String>, challenge_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            challenge_id: challenge_id.into(),
            registered_at: None,
        }
    }
}

/// Operator emails allowed to see the challenge regardless of eligibility.
///
/// Emails are trimmed and lowercased on the way in and on lookup; matching
/// is exact after that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideList {
    emails: HashSet<String>,
}

impl OverrideList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| normalize_email(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.contains(&normalize_email(email))
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Derived position of a user in the challenge state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeState {
    Unauthenticated,
    NotEligible,
    EligibleInactive,
    EligibleActive,
}

/// Output of [`EligibilityResolver::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    pub state: ChallengeState,
    pub is_visible: bool,
    pub is_active: bool,
    pub current_day: u32,
    pub is_override: bool,
}

impl Eligibility {
    fn hidden(state: ChallengeState) -> Self {
        Self {
            state,
            is_visible: false,
            is_active: false,
            current_day: 0,
            is_override: false,
        }
    }

    pub fn unauthenticated() -> Self {
        Self::hidden(ChallengeState::Unauthenticated)
    }

    pub fn not_eligible() -> Self {
        Self::hidden(ChallengeState::NotEligible)
    }

    /// Whether the caller should go on to fetch and show progress.
    pub fn is_eligible(&self) -> bool {
        matches!(
            self.state,
            ChallengeState::EligibleInactive | ChallengeState::EligibleActive
        )
    }
}

/// Resolves eligibility for one challenge against an injected override list.
#[derive(Debug, Clone)]
pub struct EligibilityResolver {
    definition: ChallengeDefinition,
    overrides: OverrideList,
}

impl EligibilityResolver {
    pub fn new(definition: ChallengeDefinition, overrides: OverrideList) -> Self {
        Self {
            definition,
            overrides,
        }
    }

    pub fn definition(&self) -> &ChallengeDefinition {
        &self.definition
    }

    pub fn overrides(&self) -> &OverrideList {
        &self.overrides
    }

    pub fn is_override(&self, user: &User) -> bool {
        user.email
            .as_deref()
            .map(|email| self.overrides.contains(email))
            .unwrap_or(false)
    }

    /// Resolve the user's eligibility at `now`.
    ///
    /// `access` is the outcome of the access check. It is only consulted once
    /// the user is known to be registered or on the override list; a failed
    /// check is returned as-is rather than turned into a hidden result.
    pub fn resolve<Tz: TimeZone>(
        &self,
        user: Option<&User>,
        registration: Option<&Registration>,
        access: Result<AccessGrant, RetrievalError>,
        now: &DateTime<Tz>,
    ) -> Result<Eligibility, RetrievalError> {
        let Some(user) = user else {
            return Ok(Eligibility::unauthenticated());
        };

        let is_override = self.is_override(user);
        if registration.is_none() && !is_override {
            tracing::debug!(user_id = %user.id, "user not registered for challenge");
            return Ok(Eligibility::not_eligible());
        }

        let grant = access.inspect_err(|err| {
            tracing::warn!(user_id = %user.id, error = %err, "access check failed");
        })?;

        let is_active = grant.is_active();
        let state = if is_active {
            ChallengeState::EligibleActive
        } else {
            ChallengeState::EligibleInactive
        };
        let eligibility = Eligibility {
            state,
            is_visible: is_override || is_active,
            is_active,
            current_day: current_day(now, &self.definition),
            is_override,
        };

        tracing::debug!(
            user_id = %user.id,
            challenge_id = %self.definition.id(),
            ?eligibility,
            "resolved challenge eligibility"
        );
        Ok(eligibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::access::AccessType;
    use chrono::FixedOffset;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn resolver() -> EligibilityResolver {
        let def = ChallengeDefinition::new(
            "spring-2026",
            at("2026-03-01T00:00:00+01:00"),
            at("2026-03-21T23:59:59+01:00"),
        )
        .unwrap();
        EligibilityResolver::new(def, OverrideList::new(["Admin@Example.com "]))
    }

    fn during() -> Result<AccessGrant, RetrievalError> {
        Ok(AccessGrant::new(true, AccessType::DuringChallenge))
    }

    #[test]
    fn no_user_is_hidden_regardless_of_inputs() {
        let reg = Registration::new("u1", "spring-2026");
        let result = resolver()
            .resolve(None, Some(&reg), during(), &at("2026-03-05T08:00:00+01:00"))
            .unwrap();
        assert_eq!(result, Eligibility::unauthenticated());
        assert!(!result.is_visible);
        assert!(!result.is_active);
        assert_eq!(result.current_day, 0);
    }

    #[test]
    fn no_user_ignores_failed_access_check() {
        let err = Err(RetrievalError::Access {
            message: "offline".into(),
        });
        let result = resolver()
            .resolve(None, None, err, &at("2026-03-05T08:00:00+01:00"))
            .unwrap();
        assert_eq!(result.state, ChallengeState::Unauthenticated);
    }

    #[test]
    fn unregistered_user_is_not_eligible() {
        let user = User::new("u1", Some("someone@example.com"));
        let result = resolver()
            .resolve(Some(&user), None, during(), &at("2026-03-05T08:00:00+01:00"))
            .unwrap();
        assert_eq!(result, Eligibility::not_eligible());
    }

    #[test]
    fn override_user_sees_challenge_before_start() {
        let user = User::new("admin", Some("ADMIN@example.com"));
        let grant = Ok(AccessGrant::new(true, AccessType::BeforeChallenge));
        let result = resolver()
            .resolve(Some(&user), None, grant, &at("2026-02-20T08:00:00+01:00"))
            .unwrap();
        assert!(result.is_visible);
        assert!(!result.is_active);
        assert!(result.is_override);
        assert_eq!(result.current_day, 0);
        assert_eq!(result.state, ChallengeState::EligibleInactive);
    }

    #[test]
    fn registered_user_during_window_is_active() {
        let user = User::new("u1", Some("someone@example.com"));
        let reg = Registration::new("u1", "spring-2026");
        let result = resolver()
            .resolve(Some(&user), Some(&reg), during(), &at("2026-03-05T08:00:00+01:00"))
            .unwrap();
        assert!(result.is_visible);
        assert!(result.is_active);
        assert_eq!(result.current_day, 5);
        assert_eq!(result.state, ChallengeState::EligibleActive);
    }

    #[test]
    fn registered_user_after_window_is_hidden() {
        let user = User::new("u1", None);
        let reg = Registration::new("u1", "spring-2026");
        let grant = Ok(AccessGrant::new(true, AccessType::AfterChallenge));
        let result = resolver()
            .resolve(Some(&user), Some(&reg), grant, &at("2026-04-01T08:00:00+01:00"))
            .unwrap();
        assert!(!result.is_visible);
        assert!(!result.is_active);
        assert_eq!(result.current_day, 0);
        assert_eq!(result.state, ChallengeState::EligibleInactive);
    }

    #[test]
    fn failed_access_check_surfaces_as_error() {
        let user = User::new("u1", None);
        let reg = Registration::new("u1", "spring-2026");
        let err = RetrievalError::Access {
            message: "503".into(),
        };
        let result = resolver().resolve(
            Some(&user),
            Some(&reg),
            Err(err.clone()),
            &at("2026-03-05T08:00:00+01:00"),
        );
        assert_eq!(result, Err(err));
    }

    #[test]
    fn override_matching_is_exact_after_normalization() {
        let list = OverrideList::new(["admin@example.com", "  "]);
        assert_eq!(list.len(), 1);
        assert!(list.contains(" Admin@Example.COM"));
        assert!(!list.contains("admin@example.co"));
        assert!(!list.contains("admin+x@example.com"));
    }
}
