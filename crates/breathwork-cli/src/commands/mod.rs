pub mod challenge;
pub mod config;
pub mod kp;
pub mod progress;

use chrono::{DateTime, FixedOffset, Utc};

/// Parse an optional `--at` argument, defaulting to the current time.
pub fn parse_instant(at: Option<&str>) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    match at {
        Some(s) => Ok(DateTime::<FixedOffset>::parse_from_rfc3339(s)
            .map_err(|e| format!("invalid --at '{s}': {e}"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}
