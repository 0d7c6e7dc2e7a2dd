//! In-memory implementation of the collaborator ports.
//!
//! Backs the CLI (loaded from a JSON fixture) and the tests. Each port can be
//! told to fail so callers can exercise their error paths.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::access::AccessGrant;
use super::eligibility::Registration;
use super::ports::{AccessChecker, ProgressStore, RegistrationStore};
use super::progress::DayProgress;
use crate::error::{CoreError, RetrievalError};

/// Serialized form of the records held by [`InMemoryChallengeStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChallengeFixture {
    #[serde(default)]
    pub registrations: Vec<Registration>,
    /// Access grants keyed by user id. Users without an entry are denied.
    #[serde(default)]
    pub access: HashMap<String, AccessGrant>,
    #[serde(default)]
    pub progress: Vec<DayProgress>,
}

impl ChallengeFixture {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Which port a simulated failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    Registration,
    Access,
    Progress,
}

/// Records held in memory plus per-port call counters.
#[derive(Debug)]
pub struct InMemoryChallengeStore {
    fixture: ChallengeFixture,
    failures: HashMap<Port, RetrievalError>,
    calls: HashMap<Port, AtomicUsize>,
}

impl InMemoryChallengeStore {
    pub fn new(fixture: ChallengeFixture) -> Self {
        let calls = [Port::Registration, Port::Access, Port::Progress]
            .into_iter()
            .map(|port| (port, AtomicUsize::new(0)))
            .collect();
        Self {
            fixture,
            failures: HashMap::new(),
            calls,
        }
    }

    /// Make every call to `port` fail with `error`.
    pub fn with_failure(mut self, port: Port, error: RetrievalError) -> Self {
        self.failures.insert(port, error);
        self
    }

    /// Number of times `port` has been queried.
    pub fn calls(&self, port: Port) -> usize {
        self.calls
            .get(&port)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    fn enter(&self, port: Port) -> Result<(), RetrievalError> {
        if let Some(counter) = self.calls.get(&port) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        match self.failures.get(&port) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryChallengeStore {
    fn default() -> Self {
        Self::new(ChallengeFixture::default())
    }
}

#[async_trait]
impl RegistrationStore for InMemoryChallengeStore {
    async fn get_registration(
        &self,
        user_id: &str,
        challenge_id: &str,
    ) -> Result<Option<Registration>, RetrievalError> {
        self.enter(Port::Registration)?;
        Ok(self
            .fixture
            .registrations
            .iter()
            .find(|r| r.user_id == user_id && r.challenge_id == challenge_id)
            .cloned())
    }
}

#[async_trait]
impl AccessChecker for InMemoryChallengeStore {
    async fn check_access(&self, user_id: &str) -> Result<AccessGrant, RetrievalError> {
        self.enter(Port::Access)?;
        Ok(self
            .fixture
            .access
            .get(user_id)
            .copied()
            .unwrap_or_else(AccessGrant::denied))
    }
}

#[async_trait]
impl ProgressStore for InMemoryChallengeStore {
    async fn get_progress(
        &self,
        user_id: &str,
        _challenge_id: &str,
    ) -> Result<Vec<DayProgress>, RetrievalError> {
        self.enter(Port::Progress)?;
        Ok(self
            .fixture
            .progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::access::AccessType;

    fn fixture() -> ChallengeFixture {
        ChallengeFixture::from_json(
            r#"{
                "registrations": [{"user_id": "u1", "challenge_id": "spring-2026"}],
                "access": {"u1": {"has_access": true, "access_type": "during_challenge"}},
                "progress": [
                    {"user_id": "u1", "day_number": 1, "completed_at": "2026-03-01T08:00:00Z"},
                    {"user_id": "u2", "day_number": 1}
                ]
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn looks_up_records_by_user() {
        let store = InMemoryChallengeStore::new(fixture());
        assert!(store.get_registration("u1", "spring-2026").await.unwrap().is_some());
        assert!(store.get_registration("u1", "autumn").await.unwrap().is_none());
        assert_eq!(
            store.check_access("u1").await.unwrap().access_type,
            AccessType::DuringChallenge
        );
        assert_eq!(store.check_access("nobody").await.unwrap(), AccessGrant::denied());
        assert_eq!(store.get_progress("u1", "spring-2026").await.unwrap().len(), 1);
        assert!(store.get_progress("u3", "spring-2026").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn simulated_failure_is_returned_and_counted() {
        let err = RetrievalError::Unavailable {
            service: "access".into(),
        };
        let store = InMemoryChallengeStore::new(fixture()).with_failure(Port::Access, err.clone());
        assert_eq!(store.check_access("u1").await, Err(err));
        assert_eq!(store.calls(Port::Access), 1);
        assert_eq!(store.calls(Port::Registration), 0);
    }
}
