//! Challenge status orchestration.
//!
//! Fetches registration and access concurrently, resolves eligibility,
//! then fetches and aggregates progress for eligible users. Fetch results
//! can be reused for a caller-chosen time-to-live; failures are never cached.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::access::AccessGrant;
use super::eligibility::{EligibilityResolver, Registration, User};
use super::ports::{AccessChecker, ProgressStore, RegistrationStore};
use super::progress::{DayProgress, ValidatedProgress};
use super::status::ActiveChallengeStatus;
use crate::clock::{Clock, SystemClock};
use crate::error::{Result, RetrievalError};

/// How long fetched collaborator data may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    #[serde(with = "seconds")]
    pub ttl: Duration,
}

impl CachePolicy {
    /// Always fetch.
    pub fn disabled() -> Self {
        Self {
            ttl: Duration::zero(),
        }
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl > Duration::zero()
    }

    fn is_fresh(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.is_enabled() && now >= fetched_at && now - fetched_at < self.ttl
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

mod seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::seconds(i64::deserialize(d)?.max(0)))
    }
}

#[derive(Debug, Clone)]
struct Cached<T> {
    value: T,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct UserCache {
    registration: Option<Cached<Option<Registration>>>,
    access: Option<Cached<AccessGrant>>,
    progress: Option<Cached<Vec<DayProgress>>>,
}

/// Builds [`ActiveChallengeStatus`] values from the collaborator ports.
pub struct ChallengeStatusService<R, A, P, C = SystemClock> {
    resolver: EligibilityResolver,
    registrations: R,
    access: A,
    progress: P,
    clock: C,
    cache_policy: CachePolicy,
    cache: Mutex<HashMap<String, UserCache>>,
}

impl<R, A, P> ChallengeStatusService<R, A, P, SystemClock>
where
    R: RegistrationStore,
    A: AccessChecker,
    P: ProgressStore,
{
    pub fn new(resolver: EligibilityResolver, registrations: R, access: A, progress: P) -> Self {
        Self::with_clock(resolver, registrations, access, progress, SystemClock)
    }
}

impl<R, A, P, C> ChallengeStatusService<R, A, P, C>
where
    R: RegistrationStore,
    A: AccessChecker,
    P: ProgressStore,
    C: Clock,
{
    pub fn with_clock(
        resolver: EligibilityResolver,
        registrations: R,
        access: A,
        progress: P,
        clock: C,
    ) -> Self {
        Self {
            resolver,
            registrations,
            access,
            progress,
            clock,
            cache_policy: CachePolicy::disabled(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn resolver(&self) -> &EligibilityResolver {
        &self.resolver
    }

    /// Drop everything cached for one user.
    pub fn invalidate(&self, user_id: &str) {
        self.cache().remove(user_id);
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    /// Evaluate the challenge status for `user` at the clock's current time.
    ///
    /// # Errors
    /// Returns [`CoreError::Retrieval`](crate::CoreError::Retrieval) when a
    /// required collaborator fails and
    /// [`CoreError::Progress`](crate::CoreError::Progress) when the progress
    /// store returns rows that break the per-day invariants.
    pub async fn status(&self, user: Option<&User>) -> Result<ActiveChallengeStatus> {
        let Some(user) = user else {
            return Ok(ActiveChallengeStatus::unauthenticated());
        };
        let now = self.clock.now();

        let (registration, access) = tokio::join!(
            self.fetch_registration(&user.id, now),
            self.fetch_access(&user.id, now)
        );
        let registration = registration?;

        let eligibility = self
            .resolver
            .resolve(Some(user), registration.as_ref(), access, &now)?;
        if !eligibility.is_eligible() {
            return Ok(ActiveChallengeStatus::build(eligibility, None));
        }

        let rows = self.fetch_progress(&user.id, now).await?;
        let progress =
            ValidatedProgress::new(&user.id, rows, self.resolver.definition().total_days())?;
        Ok(ActiveChallengeStatus::build(eligibility, Some(progress)))
    }

    async fn fetch_registration(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Registration>, RetrievalError> {
        if let Some(hit) = self.lookup(user_id, now, |c| c.registration.as_ref()) {
            return Ok(hit);
        }
        let challenge_id = self.resolver.definition().id();
        let value = self
            .registrations
            .get_registration(user_id, challenge_id)
            .await
            .inspect_err(|err| tracing::warn!(user_id, error = %err, "registration lookup failed"))?;
        self.remember(user_id, |c| {
            c.registration = Some(Cached {
                value: value.clone(),
                fetched_at: now,
            })
        });
        Ok(value)
    }

    async fn fetch_access(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessGrant, RetrievalError> {
        if let Some(hit) = self.lookup(user_id, now, |c| c.access.as_ref()) {
            return Ok(hit);
        }
        let value = self.access.check_access(user_id).await?;
        self.remember(user_id, |c| {
            c.access = Some(Cached {
                value,
                fetched_at: now,
            })
        });
        Ok(value)
    }

    async fn fetch_progress(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<DayProgress>, RetrievalError> {
        if let Some(hit) = self.lookup(user_id, now, |c| c.progress.as_ref()) {
            return Ok(hit);
        }
        let challenge_id = self.resolver.definition().id();
        let value = self
            .progress
            .get_progress(user_id, challenge_id)
            .await
            .inspect_err(|err| tracing::warn!(user_id, error = %err, "progress lookup failed"))?;
        self.remember(user_id, |c| {
            c.progress = Some(Cached {
                value: value.clone(),
                fetched_at: now,
            })
        });
        Ok(value)
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, UserCache>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lookup<T, F>(&self, user_id: &str, now: DateTime<Utc>, pick: F) -> Option<T>
    where
        T: Clone,
        F: Fn(&UserCache) -> Option<&Cached<T>>,
    {
        if !self.cache_policy.is_enabled() {
            return None;
        }
        let cache = self.cache();
        let entry = pick(cache.get(user_id)?)?;
        if self.cache_policy.is_fresh(entry.fetched_at, now) {
            tracing::debug!(user_id, "serving cached challenge data");
            Some(entry.value.clone())
        } else {
            None
        }
    }

    fn remember<F>(&self, user_id: &str, update: F)
    where
        F: FnOnce(&mut UserCache),
    {
        if !self.cache_policy.is_enabled() {
            return;
        }
        update(self.cache().entry(user_id.to_string()).or_default());
    }
}
