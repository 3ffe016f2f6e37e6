//! Session configuration: sample counts, discard limits, seeds and shrink limits.

use std::time::Duration;

use thiserror::Error;

use crate::random::RandomSource;
use crate::shrink::{ShrinkConfig, ShrinkSearch};

/// Environment variable holding a fixed seed
pub const SEED_VAR: &str = "QUARRY_SEED";
/// Environment variable overriding the sample count
pub const SAMPLES_VAR: &str = "QUARRY_SAMPLES";
/// Environment variable overriding the discard ratio
pub const DISCARD_RATIO_VAR: &str = "QUARRY_DISCARD_RATIO";

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid sample count: {0} (must be > 0)")]
    InvalidSampleCount(usize),

    #[error("invalid discard ratio: {0} (must be > 0)")]
    InvalidDiscardRatio(usize),

    #[error("invalid {limit}: {value} (must be > 0)")]
    InvalidShrinkLimit { limit: &'static str, value: usize },

    #[error("invalid shrink timeout (must be > 0)")]
    InvalidTimeout,

    #[error("environment variable {variable} has unparsable value {value:?}")]
    InvalidEnv {
        variable: &'static str,
        value: String,
    },
}

/// Configuration for one generation session
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    /// Number of valid values each parameter must produce
    pub sample_count: usize,
    /// Attempts allowed per requested sample before giving up
    pub discard_ratio: usize,
    /// Fixed seed for reproducible sessions
    pub seed: Option<u64>,
    /// Whether failing values are shrunk
    pub shrinking: bool,
    pub shrink: ShrinkConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_count: 100,
            discard_ratio: 10,
            seed: None,
            shrinking: true,
            shrink: ShrinkConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Create a validated configuration
    pub fn new(
        sample_count: usize,
        discard_ratio: usize,
        seed: Option<u64>,
        shrink: ShrinkConfig,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            sample_count,
            discard_ratio,
            seed,
            shrinking: true,
            shrink,
        };
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with `QUARRY_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().overlay(|variable| std::env::var(variable).ok())
    }

    /// Overlay values looked up by variable name.
    ///
    /// Absent variables leave the current value in place; present but
    /// unparsable ones are errors.
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = parse_var(&lookup, SEED_VAR)? {
            self.seed = Some(seed);
        }
        if let Some(samples) = parse_var(&lookup, SAMPLES_VAR)? {
            self.sample_count = samples;
        }
        if let Some(ratio) = parse_var(&lookup, DISCARD_RATIO_VAR)? {
            self.discard_ratio = ratio;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn with_discard_ratio(mut self, discard_ratio: usize) -> Self {
        self.discard_ratio = discard_ratio;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_shrink(mut self, shrink: ShrinkConfig) -> Self {
        self.shrink = shrink;
        self
    }

    pub fn with_shrink_timeout(mut self, timeout: Duration) -> Self {
        self.shrink.timeout = timeout;
        self
    }

    pub fn without_shrinking(mut self) -> Self {
        self.shrinking = false;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_count == 0 {
            return Err(ConfigError::InvalidSampleCount(self.sample_count));
        }
        if self.discard_ratio == 0 {
            return Err(ConfigError::InvalidDiscardRatio(self.discard_ratio));
        }
        self.shrink.validate()
    }

    /// Attempts after which a parameter fails to reach `sample_count` values
    pub fn discard_limit(&self) -> usize {
        self.sample_count.saturating_mul(self.discard_ratio)
    }

    /// Random source for this session: seeded if a seed is set, from entropy otherwise
    pub fn random_source(&self) -> RandomSource {
        match self.seed {
            Some(seed) => RandomSource::new(seed),
            None => RandomSource::from_entropy(),
        }
    }

    pub fn shrink_search(&self) -> ShrinkSearch {
        ShrinkSearch::with_config(self.shrink.clone())
    }
}

fn parse_var<F, T>(lookup: &F, variable: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(variable) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { variable, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.sample_count, 100);
        assert_eq!(config.discard_ratio, 10);
        assert_eq!(config.seed, None);
        assert!(config.shrinking);
        assert_eq!(config.shrink, ShrinkConfig::default());
        assert_eq!(config.discard_limit(), 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_session_config_validation() {
        assert_eq!(
            SessionConfig::new(0, 10, None, ShrinkConfig::default()),
            Err(ConfigError::InvalidSampleCount(0))
        );
        assert_eq!(
            SessionConfig::default().with_discard_ratio(0).validate(),
            Err(ConfigError::InvalidDiscardRatio(0))
        );
        assert_eq!(
            SessionConfig::default()
                .with_shrink_timeout(Duration::ZERO)
                .validate(),
            Err(ConfigError::InvalidTimeout)
        );
    }

    #[test]
    fn test_builders() {
        let config = SessionConfig::default()
            .with_sample_count(10)
            .with_discard_ratio(3)
            .with_seed(42)
            .without_shrinking();
        assert_eq!(config.discard_limit(), 30);
        assert_eq!(config.seed, Some(42));
        assert!(!config.shrinking);
        assert_eq!(config.random_source().seed(), 42);
    }

    #[test]
    fn test_overlay_reads_variables() {
        let config = SessionConfig::default()
            .overlay(vars(&[
                (SEED_VAR, "7"),
                (SAMPLES_VAR, " 25 "),
                (DISCARD_RATIO_VAR, "4"),
            ]))
            .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.sample_count, 25);
        assert_eq!(config.discard_ratio, 4);
    }

    #[test]
    fn test_overlay_keeps_values_for_absent_variables() {
        let base = SessionConfig::default().with_seed(3);
        let config = base.clone().overlay(vars(&[])).unwrap();
        assert_eq!(config, base);
    }

    #[test]
    fn test_overlay_rejects_bad_values() {
        assert_eq!(
            SessionConfig::default().overlay(vars(&[(SEED_VAR, "abc")])),
            Err(ConfigError::InvalidEnv {
                variable: SEED_VAR,
                value: "abc".to_string()
            })
        );
        assert_eq!(
            SessionConfig::default().overlay(vars(&[(SAMPLES_VAR, "0")])),
            Err(ConfigError::InvalidSampleCount(0))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::InvalidShrinkLimit {
                limit: "max_shrinks",
                value: 0
            }
            .to_string(),
            "invalid max_shrinks: 0 (must be > 0)"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serializes_with_shrink_limits() {
        let config = SessionConfig::default()
            .with_seed(17)
            .with_shrink(ShrinkConfig::default().with_max_shrinks(5));
        let json = serde_json::to_string(&config).unwrap();
        let restored: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
        assert_eq!(restored.shrink.max_shrinks, 5);
    }
}
