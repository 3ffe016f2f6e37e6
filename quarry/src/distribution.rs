//! Geometric distribution used to pick counts independent of element type.

use crate::error::DistributionError;
use crate::random::RandomSource;

/// A probability known to lie in `(0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Probability(f64);

impl Probability {
    pub fn new(p: f64) -> Result<Self, DistributionError> {
        if p > 0.0 && p <= 1.0 {
            Ok(Self(p))
        } else {
            Err(DistributionError::InvalidProbability(p))
        }
    }

    /// `1 / mean`; a mean below one yields an out-of-domain probability
    pub fn of_mean(mean: f64) -> Result<Self, DistributionError> {
        Self::new(inverse_mean(mean)?)
    }

    /// Same as `of_mean(count + 1)`, which can never be out of domain.
    ///
    /// Samples drawn with it average `count` failures, so they grow with `count`.
    pub fn for_count(count: usize) -> Self {
        Self(1.0 / (count as f64 + 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

fn inverse_mean(mean: f64) -> Result<f64, DistributionError> {
    if mean.is_nan() || mean <= 0.0 {
        return Err(DistributionError::InvalidMean(mean));
    }
    Ok(1.0 / mean)
}

/// Number of Bernoulli failures before the first success
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometricDistribution;

impl GeometricDistribution {
    pub fn new() -> Self {
        Self
    }

    /// Sample with a probability in `(0, 1]`
    pub fn sample(&self, p: f64, random: &mut RandomSource) -> Result<u64, DistributionError> {
        Ok(self.sample_probability(Probability::new(p)?, random))
    }

    /// Inverse-CDF sample from a single uniform draw; O(1) regardless of the
    /// resulting count.
    pub fn sample_probability(&self, p: Probability, random: &mut RandomSource) -> u64 {
        let u = random.next_unit();
        if p.0 >= 1.0 {
            return 0;
        }
        let count = ((1.0 - u).ln() / (1.0 - p.0).ln()).floor();
        // saturating cast; NaN cannot occur since 1 - u is in (0, 1]
        count as u64
    }

    /// `1 / mean` for any positive mean
    pub fn probability_of_mean(&self, mean: f64) -> Result<f64, DistributionError> {
        inverse_mean(mean)
    }

    pub fn sample_with_mean(
        &self,
        mean: f64,
        random: &mut RandomSource,
    ) -> Result<u64, DistributionError> {
        Ok(self.sample_probability(Probability::of_mean(mean)?, random))
    }
}
