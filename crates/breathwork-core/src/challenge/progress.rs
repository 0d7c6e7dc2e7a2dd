//! Per-day challenge progress.
//!
//! Rows coming from the progress store are checked once at the boundary
//! ([`ValidatedProgress::new`]) and then aggregated by [`aggregate`].

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ProgressError;

/// One user's record for one challenge day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayProgress {
    pub user_id: String,
    pub day_number: u32,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl DayProgress {
    pub fn new(user_id: impl Into<String>, day_number: u32, completed_at: Option<DateTime<Utc>>) -> Self {
        Self {
            user_id: user_id.into(),
            day_number,
            completed_at,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// One user's progress rows that satisfy the day-range and uniqueness
/// invariants, sorted by day number.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidatedProgress {
    rows: Vec<DayProgress>,
}

impl ValidatedProgress {
    /// Validate `user_id`'s raw rows against a challenge of `total_days` days.
    ///
    /// # Errors
    /// Returns [`ProgressError::ForeignUser`] for a row owned by another
    /// user, [`ProgressError::DayOutOfRange`] for day numbers outside
    /// `1..=total_days` and [`ProgressError::DuplicateDay`] when the user has
    /// more than one row for the same day.
    pub fn new(
        user_id: &str,
        mut rows: Vec<DayProgress>,
        total_days: u32,
    ) -> Result<Self, ProgressError> {
        let mut seen: HashSet<u32> = HashSet::with_capacity(rows.len());
        for row in &rows {
            if row.user_id != user_id {
                return Err(ProgressError::ForeignUser {
                    expected: user_id.to_string(),
                    found: row.user_id.clone(),
                });
            }
            if row.day_number == 0 || row.day_number > total_days {
                return Err(ProgressError::DayOutOfRange {
                    day: row.day_number,
                    total_days,
                });
            }
            if !seen.insert(row.day_number) {
                return Err(ProgressError::DuplicateDay {
                    user_id: row.user_id.clone(),
                    day: row.day_number,
                });
            }
        }
        rows.sort_by_key(|row| row.day_number);
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[DayProgress] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<DayProgress> {
        self.rows
    }
}

/// Completed-day count plus a day-number lookup, ascending by day.
///
/// `completed_days` always equals the number of `Some` entries in `by_day`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub completed_days: u32,
    pub by_day: IndexMap<u32, Option<DateTime<Utc>>>,
}

impl ProgressSummary {
    /// Completion timestamp for `day`; `None` when the day has no row,
    /// `Some(None)` when the row exists but is not completed.
    pub fn completed_at(&self, day: u32) -> Option<Option<DateTime<Utc>>> {
        self.by_day.get(&day).copied()
    }

    pub fn is_day_completed(&self, day: u32) -> bool {
        matches!(self.by_day.get(&day), Some(Some(_)))
    }
}

/// Aggregate validated rows into a [`ProgressSummary`].
///
/// Rows are already sorted by day, so insertion order of `by_day` is
/// ascending. Pure: the same input always yields the same summary.
pub fn aggregate(progress: &ValidatedProgress) -> ProgressSummary {
    let mut by_day = IndexMap::with_capacity(progress.rows.len());
    let mut completed_days = 0u32;

    for row in &progress.rows {
        if row.is_completed() {
            completed_days += 1;
        }
        by_day.insert(row.day_number, row.completed_at);
    }

    ProgressSummary {
        completed_days,
        by_day,
    }
}
