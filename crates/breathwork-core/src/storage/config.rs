//! TOML-based application configuration.
//!
//! Stores:
//! - The active challenge window
//! - Operator override emails
//! - Cache time-to-live for collaborator fetches
//! - KP measurement settings
//!
//! Configuration is stored at `~/.config/breathwork/config.toml` and read
//! once at startup; the values derived from it are immutable afterwards.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::challenge::{
    CachePolicy, ChallengeDefinition, EligibilityResolver, OverrideList, DEFAULT_TOTAL_DAYS,
};
use crate::error::{ConfigurationError, CoreError};
use crate::kp::KpConfig;

/// Challenge window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeConfig {
    #[serde(default = "default_challenge_id")]
    pub id: String,
    #[serde(default = "default_start")]
    pub start: DateTime<FixedOffset>,
    #[serde(default = "default_end")]
    pub end: DateTime<FixedOffset>,
    #[serde(default = "default_total_days")]
    pub total_days: u32,
}

/// Operator override configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverridesConfig {
    #[serde(default)]
    pub emails: Vec<String>,
}

/// Cache configuration for collaborator fetches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Zero disables caching.
    #[serde(default)]
    pub ttl_seconds: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/breathwork/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub challenge: ChallengeConfig,
    #[serde(default)]
    pub overrides: OverridesConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub kp: KpConfig,
}

fn default_challenge_id() -> String {
    "spring-2026".into()
}
fn default_start() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2026-03-01T00:00:00+01:00").unwrap_or_default()
}
fn default_end() -> DateTime<FixedOffset> {
    default_start() + Duration::days(21) - Duration::seconds(1)
}
fn default_total_days() -> u32 {
    DEFAULT_TOTAL_DAYS
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            id: default_challenge_id(),
            start: default_start(),
            end: default_end(),
            total_days: default_total_days(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigurationError> {
        let invalid = |message: String| ConfigurationError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let unknown = || invalid("unknown config key".into());

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(invalid("config key is empty".into()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigurationError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content).map_err(|e| ConfigurationError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigurationError::InvalidValue {
            key: "<root>".into(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// into the field's type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        Ok(())
    }

    /// The configured challenge, validated.
    pub fn challenge_definition(&self) -> Result<ChallengeDefinition, ConfigurationError> {
        ChallengeDefinition::with_total_days(
            self.challenge.id.clone(),
            self.challenge.start,
            self.challenge.end,
            self.challenge.total_days,
        )
    }

    pub fn override_list(&self) -> OverrideList {
        OverrideList::new(&self.overrides.emails)
    }

    pub fn cache_policy(&self) -> CachePolicy {
        let secs = i64::try_from(self.cache.ttl_seconds).unwrap_or(i64::MAX);
        CachePolicy::with_ttl(Duration::seconds(secs))
    }

    /// The configured KP measurement settings, validated.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::InvalidValue`] when `kp.attempts` is zero
    /// or `kp.max_seconds` is not a positive finite number.
    pub fn kp_config(&self) -> Result<KpConfig, ConfigurationError> {
        if self.kp.attempts == 0 {
            return Err(ConfigurationError::InvalidValue {
                key: "kp.attempts".into(),
                message: "must be at least 1".into(),
            });
        }
        if !self.kp.max_seconds.is_finite() || self.kp.max_seconds <= 0.0 {
            return Err(ConfigurationError::InvalidValue {
                key: "kp.max_seconds".into(),
                message: format!("must be a positive number of seconds, got {}", self.kp.max_seconds),
            });
        }
        Ok(self.kp)
    }

    /// Resolver for the configured challenge and override list.
    pub fn resolver(&self) -> Result<EligibilityResolver, ConfigurationError> {
        Ok(EligibilityResolver::new(
            self.challenge_definition()?,
            self.override_list(),
        ))
    }
}
