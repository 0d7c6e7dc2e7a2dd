//! Challenge window calculator.
//!
//! Maps an instant to the 1-based challenge day. `0` is returned both before
//! the start and after the end; callers that need to tell those apart use
//! [`ChallengeDefinition::has_started`] / [`ChallengeDefinition::has_ended`].

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use super::definition::ChallengeDefinition;

/// Day number of `now` within the challenge, in `0..=total_days`.
///
/// Day 1 begins exactly at `start`; each further day begins 24 hours later.
/// Results are clamped to `[1, total_days]` inside the window.
pub fn current_day<Tz: TimeZone>(now: &DateTime<Tz>, definition: &ChallengeDefinition) -> u32 {
    if !definition.has_started(now) || definition.has_ended(now) {
        return 0;
    }

    let elapsed = now.with_timezone(&Utc) - definition.start_utc();
    let day = elapsed.num_days().saturating_add(1);
    let day = u32::try_from(day).unwrap_or(u32::MAX);
    day.clamp(1, definition.total_days())
}

/// Snapshot of the window for display: the day plus the raw boundary checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowPosition {
    pub current_day: u32,
    pub has_started: bool,
    pub has_ended: bool,
}

impl WindowPosition {
    pub fn at<Tz: TimeZone>(now: &DateTime<Tz>, definition: &ChallengeDefinition) -> Self {
        Self {
            current_day: current_day(now, definition),
            has_started: definition.has_started(now),
            has_ended: definition.has_ended(now),
        }
    }
}
