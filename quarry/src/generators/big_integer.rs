//! Arbitrary-precision integers.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::descriptor::TypeToken;
use crate::directive::{Directive, DirectiveKind};
use crate::error::{ConfigurationError, RangeError};
use crate::generator::Generator;
use crate::random::RandomSource;
use crate::status::GenerationStatus;

use super::{BIG_INTEGER, draw_length};

/// Arbitrary-precision integers.
///
/// Unbounded sides grow with the status size: a draw spans roughly
/// `2^(size + 1)` on either side of zero (or of the given bound).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BigIntegerGenerator {
    min: Option<BigInt>,
    max: Option<BigInt>,
}

impl BigIntegerGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_range(min: BigInt, max: BigInt) -> Result<Self, RangeError> {
        crate::random::check_range(&min, &max)?;
        Ok(Self {
            min: Some(min),
            max: Some(max),
        })
    }

    fn target(&self) -> BigInt {
        match (&self.min, &self.max) {
            (Some(min), _) if min.is_positive() => min.clone(),
            (_, Some(max)) if max.is_negative() => max.clone(),
            _ => BigInt::zero(),
        }
    }

    fn contains(&self, value: &BigInt) -> bool {
        self.min.as_ref().is_none_or(|min| value >= min)
            && self.max.as_ref().is_none_or(|max| value <= max)
    }
}

impl Generator for BigIntegerGenerator {
    type Output = BigInt;

    fn types(&self) -> Vec<TypeToken> {
        vec![BIG_INTEGER]
    }

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> BigInt {
        if let (Some(min), Some(max)) = (&self.min, &self.max) {
            return random.next_big_int(min, max);
        }

        let bits = draw_length(1, None, random, status);
        let span = BigInt::from(1) << bits;
        let (low, high) = match (&self.min, &self.max) {
            (Some(min), None) => (min.clone(), min + &span),
            (None, Some(max)) => (max - &span, max.clone()),
            _ => (-span.clone(), span),
        };
        random.next_big_int(&low, &high)
    }

    fn can_shrink(&self, larger: &BigInt) -> bool {
        self.contains(larger) && *larger != self.target()
    }

    fn shrink(&self, _random: &mut RandomSource, larger: &BigInt) -> Vec<BigInt> {
        let target = self.target();
        let mut distance = larger - &target;
        let mut candidates = Vec::new();
        while !distance.is_zero() {
            distance /= 2u32;
            candidates.push(&target + &distance);
        }
        candidates
    }

    fn magnitude(&self, value: &BigInt) -> f64 {
        value.abs().to_f64().unwrap_or(f64::MAX)
    }

    fn supports(&self, kind: &DirectiveKind) -> bool {
        *kind == DirectiveKind::InRange
    }

    fn configure(&mut self, directive: &Directive) -> Result<(), ConfigurationError> {
        if let Directive::InRange { min, max } = directive {
            self.min = min.map(BigInt::from);
            self.max = max.map(BigInt::from);
        }
        Ok(())
    }
}
