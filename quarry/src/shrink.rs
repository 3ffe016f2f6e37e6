//! Shrink search for minimizing failing values.
//!
//! Starting from a failing value, [`ShrinkSearch`] repeatedly asks the
//! generator for smaller candidates, tries them greatest magnitude first and
//! descends into the first candidate that still fails. Every tested value is
//! remembered so nothing is evaluated twice.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::ConfigError;
use crate::generator::AnyGenerator;
use crate::random::RandomSource;
use crate::value::Value;

/// Result of a shrink search
#[derive(Debug, Clone)]
pub struct ShrinkResult<T> {
    /// Original value that failed
    pub original: T,
    /// Smallest value found that still fails
    pub minimal: T,
    /// Number of successful shrink steps
    pub shrink_steps: usize,
    /// Number of candidates handed to the trial
    pub evaluations: usize,
    pub shrink_duration: Duration,
    /// False when a limit cut the search short
    pub completed: bool,
    pub progress: ShrinkProgress,
}

impl<T: Clone> ShrinkResult<T> {
    /// Result for a value that was not shrunk at all
    pub fn no_shrinking(original: T) -> Self {
        Self {
            minimal: original.clone(),
            original,
            shrink_steps: 0,
            evaluations: 0,
            shrink_duration: Duration::ZERO,
            completed: true,
            progress: ShrinkProgress::default(),
        }
    }
}

/// One accepted shrink step
#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkStep {
    /// Debug rendering of the accepted value
    pub value: String,
    pub magnitude: f64,
    /// Time since the search started
    pub elapsed: Duration,
}

/// Trail of accepted shrink steps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShrinkProgress {
    steps: Vec<ShrinkStep>,
}

impl ShrinkProgress {
    fn record(&mut self, value: &Value, magnitude: f64, elapsed: Duration) {
        self.steps.push(ShrinkStep {
            value: format!("{:?}", value),
            magnitude,
            elapsed,
        });
    }

    pub fn steps(&self) -> &[ShrinkStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Limits on a shrink search
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShrinkConfig {
    /// Maximum number of candidates evaluated
    pub max_shrinks: usize,
    /// Maximum number of successful steps
    pub max_shrink_depth: usize,
    pub timeout: Duration,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            max_shrinks: 100,
            max_shrink_depth: 20,
            timeout: Duration::from_secs(60),
        }
    }
}

impl ShrinkConfig {
    /// Create a validated shrink configuration
    pub fn new(
        max_shrinks: usize,
        max_shrink_depth: usize,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            max_shrinks,
            max_shrink_depth,
            timeout,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_shrinks(mut self, max_shrinks: usize) -> Self {
        self.max_shrinks = max_shrinks;
        self
    }

    pub fn with_max_shrink_depth(mut self, max_shrink_depth: usize) -> Self {
        self.max_shrink_depth = max_shrink_depth;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_shrinks == 0 {
            return Err(ConfigError::InvalidShrinkLimit {
                limit: "max_shrinks",
                value: self.max_shrinks,
            });
        }
        if self.max_shrink_depth == 0 {
            return Err(ConfigError::InvalidShrinkLimit {
                limit: "max_shrink_depth",
                value: self.max_shrink_depth,
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

/// Drives a generator's shrink candidates against a failing trial
#[derive(Debug, Clone, Default)]
pub struct ShrinkSearch {
    config: ShrinkConfig,
}

impl ShrinkSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ShrinkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ShrinkConfig {
        &self.config
    }

    /// Minimize `original`, a value for which `trial` returned `Err`.
    ///
    /// `trial` returns `Err` while a candidate still fails. Candidates from
    /// each round are tried in descending magnitude, ties keeping the
    /// generator's order.
    pub fn shrink<F, E>(
        &self,
        generator: &dyn AnyGenerator,
        random: &mut RandomSource,
        original: Value,
        mut trial: F,
    ) -> ShrinkResult<Value>
    where
        F: FnMut(&Value) -> Result<(), E>,
    {
        if !generator.can_shrink(&original) {
            debug!(value = ?original, generator = %generator.name(), "value cannot be shrunk");
            return ShrinkResult::no_shrinking(original);
        }

        let start = Instant::now();
        let mut current = original.clone();
        let mut tested = vec![original.clone()];
        let mut progress = ShrinkProgress::default();
        let mut evaluations = 0;
        let mut completed = true;

        'search: while generator.can_shrink(&current) {
            if progress.len() >= self.config.max_shrink_depth {
                completed = false;
                break;
            }

            let mut candidates: Vec<(f64, Value)> = generator
                .shrink(random, &current)
                .into_iter()
                .map(|candidate| (generator.magnitude(&candidate), candidate))
                .collect();
            candidates.sort_by(|(a, _), (b, _)| b.total_cmp(a));

            let mut smaller = None;
            for (magnitude, candidate) in candidates {
                if tested.contains(&candidate) {
                    continue;
                }
                if evaluations >= self.config.max_shrinks {
                    debug!(evaluations, "shrink evaluation limit reached");
                    completed = false;
                    break 'search;
                }
                if start.elapsed() >= self.config.timeout {
                    debug!(elapsed = ?start.elapsed(), "shrink timed out");
                    completed = false;
                    break 'search;
                }

                evaluations += 1;
                tested.push(candidate.clone());
                if trial(&candidate).is_err() {
                    smaller = Some((magnitude, candidate));
                    break;
                }
            }

            match smaller {
                Some((magnitude, candidate)) => {
                    progress.record(&candidate, magnitude, start.elapsed());
                    debug!(
                        step = progress.len(),
                        value = ?candidate,
                        magnitude,
                        "found smaller failing value"
                    );
                    current = candidate;
                }
                None => break,
            }
        }

        debug!(
            steps = progress.len(),
            evaluations, completed, "shrinking finished"
        );

        ShrinkResult {
            original,
            minimal: current,
            shrink_steps: progress.len(),
            evaluations,
            shrink_duration: start.elapsed(),
            completed,
            progress,
        }
    }
}
