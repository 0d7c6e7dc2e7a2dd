//! Per-user challenge status view.

use serde::Serialize;

use super::eligibility::{ChallengeState, Eligibility};
use super::progress::{aggregate, DayProgress, ValidatedProgress};

/// Everything the presentation layer needs to render today's challenge.
///
/// Rebuilt from scratch on every evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveChallengeStatus {
    pub state: ChallengeState,
    pub is_visible: bool,
    pub is_active: bool,
    pub current_day: u32,
    pub completed_days: u32,
    pub progress: Vec<DayProgress>,
}

impl ActiveChallengeStatus {
    pub fn build(eligibility: Eligibility, progress: Option<ValidatedProgress>) -> Self {
        let progress = progress.unwrap_or_default();
        let completed_days = aggregate(&progress).completed_days;
        Self {
            state: eligibility.state,
            is_visible: eligibility.is_visible,
            is_active: eligibility.is_active,
            current_day: eligibility.current_day,
            completed_days,
            progress: progress.into_rows(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self::build(Eligibility::unauthenticated(), None)
    }

    pub fn not_eligible() -> Self {
        Self::build(Eligibility::not_eligible(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn unauthenticated_status_is_empty() {
        let status = ActiveChallengeStatus::unauthenticated();
        assert_eq!(status.state, ChallengeState::Unauthenticated);
        assert!(!status.is_visible);
        assert_eq!(status.completed_days, 0);
        assert!(status.progress.is_empty());
    }

    #[test]
    fn build_counts_completed_rows() {
        let done = Utc.with_ymd_and_hms(2026, 3, 2, 7, 0, 0).unwrap();
        let rows = vec![
            DayProgress::new("u1", 2, Some(done)),
            DayProgress::new("u1", 1, None),
        ];
        let eligibility = Eligibility {
            state: ChallengeState::EligibleActive,
            is_visible: true,
            is_active: true,
            current_day: 3,
            is_override: false,
        };
        let status =
            ActiveChallengeStatus::build(eligibility, Some(ValidatedProgress::new("u1", rows, 21).unwrap()));
        assert_eq!(status.completed_days, 1);
        assert_eq!(status.current_day, 3);
        assert_eq!(status.progress[0].day_number, 1);
        assert_eq!(status.progress[1].day_number, 2);
    }
}
