//! KP (control pause) measurement.
//!
//! A measurement consists of several breath holds, each timed from the
//! exhale to the first urge to inhale. The reported KP is the rounded mean
//! of the recorded attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Configuration for a KP measurement session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpConfig {
    /// Number of holds averaged into one result
    #[serde(default = "default_attempts")]
    pub attempts: usize,
    /// Longest hold accepted, in seconds
    #[serde(default = "default_max_seconds")]
    pub max_seconds: f64,
}

fn default_attempts() -> usize {
    3
}

fn default_max_seconds() -> f64 {
    300.0
}

impl Default for KpConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            max_seconds: default_max_seconds(),
        }
    }
}

/// Coarse band for a KP value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpRating {
    /// Under 20 seconds
    Low,
    /// 20 to 39 seconds
    Moderate,
    /// 40 seconds or more
    Good,
}

impl KpRating {
    pub fn for_seconds(seconds: u32) -> Self {
        match seconds {
            0..=19 => KpRating::Low,
            20..=39 => KpRating::Moderate,
            _ => KpRating::Good,
        }
    }
}

/// One timed breath hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpAttempt {
    pub seconds: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Outcome of a measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpResult {
    pub average_seconds: u32,
    pub attempts: Vec<f64>,
    pub rating: KpRating,
}

/// Collects attempts for one measurement session.
#[derive(Debug, Clone)]
pub struct KpMeasurement {
    config: KpConfig,
    attempts: Vec<KpAttempt>,
}

impl KpMeasurement {
    pub fn new(config: KpConfig) -> Self {
        Self {
            config,
            attempts: Vec::with_capacity(config.attempts),
        }
    }

    /// Record a hold of `seconds` taken at `recorded_at`.
    ///
    /// # Errors
    /// Rejects negative, non-finite or over-long holds, and any attempt past
    /// the configured count.
    pub fn record_at(&mut self, seconds: f64, recorded_at: DateTime<Utc>) -> Result<(), ValidationError> {
        if self.is_complete() {
            return Err(ValidationError::TooManyAttempts {
                max: self.config.attempts,
            });
        }
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "seconds".into(),
                message: format!("hold duration must be a non-negative number, got {seconds}"),
            });
        }
        if seconds > self.config.max_seconds {
            return Err(ValidationError::InvalidValue {
                field: "seconds".into(),
                message: format!(
                    "hold of {seconds}s exceeds the {}s maximum",
                    self.config.max_seconds
                ),
            });
        }
        self.attempts.push(KpAttempt {
            seconds,
            recorded_at,
        });
        Ok(())
    }

    pub fn record(&mut self, seconds: f64) -> Result<(), ValidationError> {
        self.record_at(seconds, Utc::now())
    }

    pub fn attempts(&self) -> &[KpAttempt] {
        &self.attempts
    }

    pub fn is_complete(&self) -> bool {
        self.attempts.len() >= self.config.attempts
    }

    /// Mean of the recorded holds, rounded to whole seconds.
    pub fn average(&self) -> Option<u32> {
        if self.attempts.is_empty() {
            return None;
        }
        let total: f64 = self.attempts.iter().map(|a| a.seconds).sum();
        let mean = total / self.attempts.len() as f64;
        Some(mean.round() as u32)
    }

    pub fn result(&self) -> Option<KpResult> {
        let average_seconds = self.average()?;
        Some(KpResult {
            average_seconds,
            attempts: self.attempts.iter().map(|a| a.seconds).collect(),
            rating: KpRating::for_seconds(average_seconds),
        })
    }

    /// Forget all attempts and start over.
    pub fn reset(&mut self) {
        self.attempts.clear();
    }
}

impl Default for KpMeasurement {
    fn default() -> Self {
        Self::new(KpConfig::default())
    }
}
