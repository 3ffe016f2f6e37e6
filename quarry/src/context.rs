//! Bounded generation and shrinking for one parameter.

use std::fmt;

use tracing::{debug, trace};

use crate::config::SessionConfig;
use crate::descriptor::TypeDescriptor;
use crate::directive::Configuration;
use crate::distribution::{GeometricDistribution, Probability};
use crate::error::{DiscardRatioExceeded, Result};
use crate::generator::SharedGenerator;
use crate::random::RandomSource;
use crate::repository::GeneratorRepository;
use crate::shrink::{ShrinkResult, ShrinkSearch};
use crate::status::GenerationStatus;
use crate::value::Value;

/// A declared parameter: its name, requested type and directives
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    descriptor: TypeDescriptor,
    configuration: Configuration,
}

impl Parameter {
    pub fn new(name: impl Into<String>, descriptor: impl Into<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            configuration: Configuration::new(),
        }
    }

    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }
}

/// Drives one parameter's generator through a session.
///
/// Each draw grows the status size geometrically with the attempt count.
/// Draws rejected by the validity predicate count as attempts but not
/// successes; once `sample_count * discard_ratio` attempts have been spent
/// without `sample_count` successes the context gives up with
/// [`DiscardRatioExceeded`]. Every value requested beyond `sample_count`
/// extends the budget by `discard_ratio` attempts.
pub struct GenerationContext {
    parameter: Parameter,
    generator: SharedGenerator,
    random: RandomSource,
    status: GenerationStatus,
    sizes: GeometricDistribution,
    sample_count: usize,
    discard_ratio: usize,
    successes: usize,
    shrinking: bool,
    search: ShrinkSearch,
}

impl GenerationContext {
    /// Context for an already resolved generator
    pub fn new(
        parameter: Parameter,
        generator: SharedGenerator,
        random: RandomSource,
        config: &SessionConfig,
    ) -> Self {
        Self {
            parameter,
            generator,
            random,
            status: GenerationStatus::new(),
            sizes: GeometricDistribution::new(),
            sample_count: config.sample_count,
            discard_ratio: config.discard_ratio,
            successes: 0,
            shrinking: config.shrinking,
            search: config.shrink_search(),
        }
    }

    /// Resolve the parameter's generator from `repository`, then build a context
    pub fn resolve(
        repository: &GeneratorRepository,
        parameter: Parameter,
        random: RandomSource,
        config: &SessionConfig,
    ) -> Result<Self> {
        config.validate()?;
        let generator =
            repository.generator_for(parameter.descriptor(), parameter.configuration())?;
        debug!(
            parameter = %parameter.name(),
            generator = %generator.name(),
            "resolved parameter generator"
        );
        Ok(Self::new(parameter, generator, random, config))
    }

    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    pub fn generator(&self) -> &SharedGenerator {
        &self.generator
    }

    pub fn status(&self) -> &GenerationStatus {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut GenerationStatus {
        &mut self.status
    }

    pub fn random(&mut self) -> &mut RandomSource {
        &mut self.random
    }

    /// Draws made so far, discarded ones included
    pub fn attempts(&self) -> usize {
        self.status.attempts()
    }

    /// Draws accepted by the validity predicate
    pub fn successes(&self) -> usize {
        self.successes
    }

    /// Attempt budget for the value currently being drawn
    fn discard_limit(&self) -> usize {
        let requested = self.sample_count.max(self.successes.saturating_add(1));
        requested.saturating_mul(self.discard_ratio)
    }

    /// Draw until `valid` accepts a value.
    ///
    /// Fails once `sample_count * discard_ratio` attempts are spent before
    /// `sample_count` successes. Past that quota each call may spend at most
    /// `discard_ratio` further attempts.
    pub fn generate<P>(&mut self, valid: P) -> Result<Value, DiscardRatioExceeded>
    where
        P: Fn(&Value) -> bool,
    {
        loop {
            if self.attempts() >= self.discard_limit() {
                let error = DiscardRatioExceeded {
                    parameter: self.parameter.name.clone(),
                    discard_ratio: self.discard_ratio,
                    attempts: self.attempts(),
                    successes: self.successes,
                };
                debug!(%error, "giving up on parameter");
                return Err(error);
            }

            let probability = Probability::for_count(self.attempts());
            let size = self.sizes.sample_probability(probability, &mut self.random);
            self.status
                .set_size(usize::try_from(size).unwrap_or(usize::MAX));
            self.status.record_attempt();

            let value = self.generator.generate(&mut self.random, &mut self.status);
            if valid(&value) {
                self.successes += 1;
                return Ok(value);
            }
            trace!(
                parameter = %self.parameter.name,
                attempts = self.attempts(),
                value = ?value,
                "discarded value"
            );
        }
    }

    /// Draw `sample_count` valid values
    pub fn samples<P>(&mut self, valid: P) -> Result<Vec<Value>, DiscardRatioExceeded>
    where
        P: Fn(&Value) -> bool,
    {
        (0..self.sample_count).map(|_| self.generate(&valid)).collect()
    }

    /// Minimize a failing value with this context's generator.
    ///
    /// `trial` returns `Err` while a candidate still fails. With shrinking
    /// disabled the failing value is returned as is.
    pub fn shrink<F, E>(&mut self, failing: Value, trial: F) -> ShrinkResult<Value>
    where
        F: FnMut(&Value) -> Result<(), E>,
    {
        if !self.shrinking {
            return ShrinkResult::no_shrinking(failing);
        }
        self.search
            .shrink(&*self.generator, &mut self.random, failing, trial)
    }
}

impl fmt::Debug for GenerationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationContext")
            .field("parameter", &self.parameter)
            .field("generator", &self.generator.name())
            .field("attempts", &self.attempts())
            .field("successes", &self.successes)
            .field("sample_count", &self.sample_count)
            .field("discard_ratio", &self.discard_ratio)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeToken;
    use crate::generator::{Generator, share};
    use std::cell::Cell;

    /// Reports the size it was asked to generate at
    struct SizeEcho;

    impl Generator for SizeEcho {
        type Output = usize;

        fn types(&self) -> Vec<TypeToken> {
            vec![TypeToken::new("Size")]
        }

        fn generate(&self, _random: &mut RandomSource, status: &mut GenerationStatus) -> usize {
            status.size()
        }

        fn can_shrink(&self, _larger: &usize) -> bool {
            false
        }
    }

    fn context(sample_count: usize, discard_ratio: usize) -> GenerationContext {
        let config = SessionConfig::default()
            .with_sample_count(sample_count)
            .with_discard_ratio(discard_ratio);
        GenerationContext::new(
            Parameter::new("size", "Size"),
            share(SizeEcho),
            RandomSource::new(2024),
            &config,
        )
    }

    #[test]
    fn test_rejecting_everything_exceeds_discard_ratio() {
        let mut context = context(10, 3);
        let error = context.samples(|_| false).unwrap_err();
        assert_eq!(
            error,
            DiscardRatioExceeded {
                parameter: "size".to_string(),
                discard_ratio: 3,
                attempts: 30,
                successes: 0,
            }
        );
        assert_eq!(context.attempts(), 30);
        assert_eq!(context.successes(), 0);
    }

    #[test]
    fn test_draws_past_quota_stay_bounded() {
        let mut session = context(10, 3);
        assert_eq!(session.samples(|_| true).unwrap().len(), 10);
        assert_eq!(session.attempts(), 10);

        // one more value may spend up to 3 attempts beyond the 30 of the quota
        let error = session.generate(|_| false).unwrap_err();
        assert_eq!(
            error,
            DiscardRatioExceeded {
                parameter: "size".to_string(),
                discard_ratio: 3,
                attempts: 33,
                successes: 10,
            }
        );

        // accepted values past the quota keep extending the budget
        let mut extended = context(2, 2);
        for _ in 0..5 {
            extended.generate(|_| true).unwrap();
        }
        assert_eq!(extended.successes(), 5);
        assert!(extended.generate(|_| false).is_err());
        assert_eq!(extended.attempts(), 12);
    }

    #[test]
    fn test_discards_count_toward_attempts_only() {
        let mut context = context(10, 3);
        let seen = Cell::new(0usize);
        let values = context
            .samples(|_| {
                seen.set(seen.get() + 1);
                seen.get() % 2 == 0
            })
            .unwrap();

        assert_eq!(values.len(), 10);
        assert_eq!(context.attempts(), 20);
        assert_eq!(context.successes(), 10);
    }

    #[test]
    fn test_sizes_grow_with_attempts() {
        let mut context = context(2000, 1);
        let sizes: Vec<usize> = context
            .samples(|_| true)
            .unwrap()
            .iter()
            .map(|value| *value.downcast_ref::<usize>().unwrap())
            .collect();

        let early: usize = sizes[..100].iter().sum();
        let late: usize = sizes[1900..].iter().sum();
        assert!(late > early * 5, "early {} late {}", early, late);
    }

    #[test]
    fn test_unshrinkable_failure_stands() {
        let mut context = context(10, 3);
        let failing = context.generate(|_| true).unwrap();
        let result = context.shrink(failing.clone(), |_| Err::<(), ()>(()));
        assert_eq!(result.minimal, failing);
        assert_eq!(result.shrink_steps, 0);
    }

    #[test]
    fn test_resolve_reports_resolution_errors() {
        let repository = GeneratorRepository::builder().build();
        let result = GenerationContext::resolve(
            &repository,
            Parameter::new("x", "Integer"),
            RandomSource::new(1),
            &SessionConfig::default(),
        );
        assert!(matches!(
            result,
            Err(crate::error::Error::Resolution(_))
        ));
    }
}
