//! Fixed-width signed integers.

use std::fmt;

use num_traits::{NumCast, PrimInt, Signed, ToPrimitive};
use rand::distributions::uniform::SampleUniform;

use crate::descriptor::TypeToken;
use crate::directive::{Directive, DirectiveKind, resolve_bounds};
use crate::error::{ConfigurationError, RangeError};
use crate::generator::Generator;
use crate::random::{RandomSource, check_range};
use crate::status::GenerationStatus;

/// Primitive integer with a registered type token
pub trait Integral:
    PrimInt + Signed + SampleUniform + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    const TOKEN: TypeToken;
}

macro_rules! impl_integral {
    ($($t:ty => $name:literal),* $(,)?) => {
        $(
            impl Integral for $t {
                const TOKEN: TypeToken = TypeToken::new($name);
            }
        )*
    };
}

impl_integral!(
    i8 => "Byte",
    i16 => "Short",
    i32 => "Integer",
    i64 => "Long",
    i128 => "Int128",
);

/// Uniform integers in `[min, max]`, shrinking by halving toward zero
/// (or toward the bound nearest zero when zero is out of range)
#[derive(Debug, Clone, PartialEq)]
pub struct IntegralGenerator<T> {
    min: T,
    max: T,
}

impl<T: Integral> IntegralGenerator<T> {
    /// Full range of the type
    pub fn new() -> Self {
        Self {
            min: T::min_value(),
            max: T::max_value(),
        }
    }

    pub fn in_range(min: T, max: T) -> Result<Self, RangeError> {
        check_range(&min, &max)?;
        Ok(Self { min, max })
    }

    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }

    /// Value every shrink converges on
    fn target(&self) -> T {
        if self.min > T::zero() {
            self.min
        } else if self.max < T::zero() {
            self.max
        } else {
            T::zero()
        }
    }

    fn narrow(&self, bound: i128) -> Result<T, ConfigurationError> {
        <T as NumCast>::from(bound).ok_or_else(|| ConfigurationError::OutOfDomain {
            generator: format!("IntegralGenerator<{}>", T::TOKEN),
            kind: DirectiveKind::InRange,
            value: bound.to_string(),
        })
    }
}

impl<T: Integral> Default for IntegralGenerator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Integral> Generator for IntegralGenerator<T> {
    type Output = T;

    fn types(&self) -> Vec<TypeToken> {
        vec![T::TOKEN]
    }

    fn generate(&self, random: &mut RandomSource, _status: &mut GenerationStatus) -> T {
        random.next_in(self.min, self.max)
    }

    fn can_shrink(&self, larger: &T) -> bool {
        *larger >= self.min && *larger <= self.max && *larger != self.target()
    }

    fn shrink(&self, _random: &mut RandomSource, larger: &T) -> Vec<T> {
        let target = self.target();
        let two = T::one() + T::one();

        // target and larger share a sign (or target is zero), so the
        // distance cannot overflow
        let mut distance = *larger - target;
        let mut candidates = Vec::new();
        while !distance.is_zero() {
            distance = distance / two;
            candidates.push(target + distance);
        }
        candidates
    }

    fn magnitude(&self, value: &T) -> f64 {
        value.to_f64().map_or(f64::MAX, f64::abs)
    }

    fn supports(&self, kind: &DirectiveKind) -> bool {
        *kind == DirectiveKind::InRange
    }

    fn configure(&mut self, directive: &Directive) -> Result<(), ConfigurationError> {
        if let Directive::InRange { min, max } = directive {
            let min = min.map(|bound| self.narrow(bound)).transpose()?;
            let max = max.map(|bound| self.narrow(bound)).transpose()?;
            let (min, max) = resolve_bounds(min, max, T::min_value(), T::max_value())
                .map_err(|source| ConfigurationError::range(DirectiveKind::InRange, source))?;
            self.min = min;
            self.max = max;
        }
        Ok(())
    }
}
