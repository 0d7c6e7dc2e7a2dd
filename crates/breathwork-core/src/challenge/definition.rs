//! Immutable challenge configuration.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Standard length of a guided challenge.
pub const DEFAULT_TOTAL_DAYS: u32 = 21;

/// A fixed-duration challenge with timezone-aware boundaries.
///
/// Constructed only through [`ChallengeDefinition::new`] or
/// [`ChallengeDefinition::with_total_days`], which reject windows where
/// `end <= start` and zero day counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeDefinition {
    id: String,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    total_days: u32,
}

impl ChallengeDefinition {
    /// Build a definition whose day count is `ceil((end - start) / 1 day)`.
    pub fn new(
        id: impl Into<String>,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Self, ConfigurationError> {
        if end <= start {
            return Err(ConfigurationError::InvalidWindow { start, end });
        }
        let total_days = days_spanned(end - start);
        Self::with_total_days(id, start, end, total_days)
    }

    /// Build a definition with an explicit day count.
    pub fn with_total_days(
        id: impl Into<String>,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        total_days: u32,
    ) -> Result<Self, ConfigurationError> {
        if end <= start {
            return Err(ConfigurationError::InvalidWindow { start, end });
        }
        if total_days == 0 {
            return Err(ConfigurationError::InvalidDayCount(total_days));
        }
        Ok(Self {
            id: id.into(),
            start,
            end,
            total_days,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    /// True once `now` has reached the start instant.
    pub fn has_started<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        *now >= self.start
    }

    /// True strictly after the end instant. The end instant itself is
    /// still part of the window.
    pub fn has_ended<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        *now > self.end
    }

    /// True when `now` lies in `[start, end]`.
    pub fn contains<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        self.has_started(now) && !self.has_ended(now)
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }
}

/// Number of started days in a positive span.
fn days_spanned(span: Duration) -> u32 {
    let whole = span.num_days();
    let partial = span - Duration::days(whole) > Duration::zero();
    let days = if partial { whole + 1 } else { whole };
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

#[derive(Deserialize)]
struct RawDefinition {
    id: String,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    #[serde(default)]
    total_days: Option<u32>,
}

impl<'de> Deserialize<'de> for ChallengeDefinition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawDefinition::deserialize(deserializer)?;
        let built = match raw.total_days {
            Some(days) => Self::with_total_days(raw.id, raw.start, raw.end, days),
            None => Self::new(raw.id, raw.start, raw.end),
        };
        built.map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn computes_day_count_by_rounding_up() {
        let def = ChallengeDefinition::new(
            "spring",
            at("2026-03-01T00:00:00+01:00"),
            at("2026-03-21T23:59:59+01:00"),
        )
        .unwrap();
        assert_eq!(def.total_days(), DEFAULT_TOTAL_DAYS);
    }

    #[test]
    fn exact_multiple_of_days_is_not_rounded() {
        let def = ChallengeDefinition::new(
            "exact",
            at("2026-03-01T00:00:00+00:00"),
            at("2026-03-22T00:00:00+00:00"),
        )
        .unwrap();
        assert_eq!(def.total_days(), 21);
    }

    #[test]
    fn rejects_end_before_start() {
        let err = ChallengeDefinition::new(
            "broken",
            at("2026-03-21T00:00:00+01:00"),
            at("2026-03-01T00:00:00+01:00"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidWindow { .. }));
    }

    #[test]
    fn rejects_empty_window() {
        let instant = at("2026-03-01T00:00:00+01:00");
        assert!(ChallengeDefinition::new("empty", instant, instant).is_err());
    }

    #[test]
    fn rejects_zero_days() {
        let err = ChallengeDefinition::with_total_days(
            "zero",
            at("2026-03-01T00:00:00+01:00"),
            at("2026-03-21T00:00:00+01:00"),
            0,
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::InvalidDayCount(0));
    }

    #[test]
    fn boundaries_are_inclusive() {
        let def = ChallengeDefinition::new(
            "spring",
            at("2026-03-01T00:00:00+01:00"),
            at("2026-03-21T23:59:59+01:00"),
        )
        .unwrap();
        assert!(def.contains(&def.start()));
        assert!(def.contains(&def.end()));
        assert!(!def.has_started(&at("2026-02-28T23:59:59+01:00")));
        assert!(def.has_ended(&at("2026-03-22T00:00:00+01:00")));
    }

    #[test]
    fn deserialize_validates_window() {
        let json = r#"{"id":"x","start":"2026-03-21T00:00:00+01:00","end":"2026-03-01T00:00:00+01:00"}"#;
        assert!(serde_json::from_str::<ChallengeDefinition>(json).is_err());

        let json = r#"{"id":"x","start":"2026-03-01T00:00:00+01:00","end":"2026-03-21T23:59:59+01:00"}"#;
        let def: ChallengeDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.total_days(), 21);
    }
}
