//! Integration tests for the challenge window calculator.

use breathwork_core::challenge::WindowPosition;
use breathwork_core::{current_day, AccessType, ChallengeDefinition};
use chrono::{DateTime, Duration, FixedOffset};
use proptest::prelude::*;

fn at(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

fn spring() -> ChallengeDefinition {
    ChallengeDefinition::new(
        "spring-2026",
        at("2026-03-01T00:00:00+01:00"),
        at("2026-03-21T23:59:59+01:00"),
    )
    .unwrap()
}

#[test]
fn test_documented_scenarios() {
    let def = spring();
    assert_eq!(def.total_days(), 21);
    assert_eq!(current_day(&at("2026-03-05T08:00:00+01:00"), &def), 5);
    assert_eq!(current_day(&at("2026-02-28T23:59:00+01:00"), &def), 0);
}

#[test]
fn test_every_day_of_the_challenge() {
    let def = spring();
    for day in 1..=21u32 {
        let noon = def.start() + Duration::days(i64::from(day) - 1) + Duration::hours(12);
        assert_eq!(current_day(&noon, &def), day, "noon of day {day}");
    }
}

#[test]
fn test_window_and_access_type_agree() {
    let def = spring();
    for s in [
        "2026-02-01T00:00:00+01:00",
        "2026-03-01T00:00:00+01:00",
        "2026-03-21T23:59:59+01:00",
        "2026-03-22T00:00:00+01:00",
    ] {
        let now = at(s);
        let position = WindowPosition::at(&now, &def);
        let access = AccessType::for_instant(&def, &now);
        assert_eq!(
            position.current_day > 0,
            access == AccessType::DuringChallenge,
            "at {s}"
        );
    }
}

proptest! {
    #[test]
    fn before_start_is_day_zero(secs in 1i64..400_000_000) {
        let def = spring();
        let now = def.start() - Duration::seconds(secs);
        prop_assert_eq!(current_day(&now, &def), 0);
    }

    #[test]
    fn after_end_is_day_zero(secs in 1i64..400_000_000) {
        let def = spring();
        let now = def.end() + Duration::seconds(secs);
        prop_assert_eq!(current_day(&now, &def), 0);
    }

    #[test]
    fn first_twenty_four_hours_are_day_one(secs in 0i64..86_400) {
        let def = spring();
        let now = def.start() + Duration::seconds(secs);
        prop_assert_eq!(current_day(&now, &def), 1);
    }

    #[test]
    fn last_twenty_four_hours_are_last_day(days in 1i64..120, secs in 0i64..=86_400) {
        // Windows that span a whole number of days.
        let start = at("2026-03-01T00:00:00+01:00");
        let end = start + Duration::days(days);
        let def = ChallengeDefinition::new("whole", start, end).unwrap();
        let now = end - Duration::seconds(secs);
        prop_assert_eq!(current_day(&now, &def), def.total_days());
    }

    #[test]
    fn day_is_always_in_range(offset in -5_000_000i64..5_000_000) {
        let def = spring();
        let now = def.start() + Duration::seconds(offset);
        let day = current_day(&now, &def);
        prop_assert!(day <= def.total_days());
        prop_assert_eq!(day == 0, !def.contains(&now));
    }
}
