//! Binary floating-point numbers.

use std::fmt;

use num_traits::{Float, NumCast, ToPrimitive};

use crate::descriptor::TypeToken;
use crate::directive::{Directive, DirectiveKind, resolve_bounds};
use crate::error::ConfigurationError;
use crate::generator::Generator;
use crate::random::RandomSource;
use crate::status::GenerationStatus;

/// Default half-width for a range given only one bound
const OPEN_SPAN: f64 = 1e6;

/// Primitive float with a registered type token
pub trait Floating: Float + fmt::Debug + fmt::Display + Send + Sync + 'static {
    const TOKEN: TypeToken;

    /// Largest precision directive that still rounds exactly
    const MAX_SCALE: u32;

    /// Uniform draw from `[min, max)`
    fn draw(random: &mut RandomSource, min: Self, max: Self) -> Self;
}

impl Floating for f32 {
    const TOKEN: TypeToken = TypeToken::new("Float");
    const MAX_SCALE: u32 = 7;

    fn draw(random: &mut RandomSource, min: f32, max: f32) -> f32 {
        random.next_f32(min, max)
    }
}

impl Floating for f64 {
    const TOKEN: TypeToken = TypeToken::new("Double");
    const MAX_SCALE: u32 = 15;

    fn draw(random: &mut RandomSource, min: f64, max: f64) -> f64 {
        random.next_f64(min, max)
    }
}

/// Finite floats.
///
/// Without a range, values are normally distributed with a spread that
/// grows with the status size. Supports the in-range and precision
/// directives; shrinks toward zero (or the bound nearest zero) through
/// whole-number offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingGenerator<T> {
    bounds: Option<(T, T)>,
    scale: Option<u32>,
}

impl<T: Floating> FloatingGenerator<T> {
    pub fn new() -> Self {
        Self {
            bounds: None,
            scale: None,
        }
    }

    pub fn bounds(&self) -> Option<(T, T)> {
        self.bounds
    }

    fn target(&self) -> T {
        match self.bounds {
            Some((min, _)) if min > T::zero() => min,
            Some((_, max)) if max < T::zero() => max,
            _ => T::zero(),
        }
    }

    fn contains(&self, value: T) -> bool {
        self.bounds
            .is_none_or(|(min, max)| value >= min && value <= max)
    }

    fn round(&self, value: T) -> T {
        let Some(scale) = self.scale else {
            return value;
        };
        let factor = <T as NumCast>::from(10.0f64.powi(scale as i32)).unwrap_or_else(T::one);
        let rounded = (value * factor).round() / factor;
        match self.bounds {
            Some((min, max)) => rounded.max(min).min(max),
            None => rounded,
        }
    }

    fn narrow(&self, bound: i128) -> Result<T, ConfigurationError> {
        <T as NumCast>::from(bound)
            .filter(|bound: &T| bound.is_finite())
            .ok_or_else(|| ConfigurationError::OutOfDomain {
                generator: format!("FloatingGenerator<{}>", T::TOKEN),
                kind: DirectiveKind::InRange,
                value: bound.to_string(),
            })
    }
}

impl<T: Floating> Default for FloatingGenerator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Floating> Generator for FloatingGenerator<T> {
    type Output = T;

    fn types(&self) -> Vec<TypeToken> {
        vec![T::TOKEN]
    }

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> T {
        let value = match self.bounds {
            Some((min, max)) => T::draw(random, min, max),
            None => {
                let spread = (status.size() as f64) + 1.0;
                <T as NumCast>::from(random.next_gaussian() * spread).unwrap_or_else(T::zero)
            }
        };
        self.round(value)
    }

    fn can_shrink(&self, larger: &T) -> bool {
        larger.is_finite() && self.contains(*larger) && *larger != self.target()
    }

    fn shrink(&self, _random: &mut RandomSource, larger: &T) -> Vec<T> {
        let target = self.target();
        let distance = *larger - target;
        let two = T::one() + T::one();

        let mut candidates = vec![target];
        let half = (distance / two).trunc();
        if !half.is_zero() {
            candidates.push(target + half);
        }
        let whole = target + distance.trunc();
        if whole != *larger && !candidates.contains(&whole) {
            candidates.push(whole);
        }
        candidates.retain(|candidate| self.contains(*candidate));
        candidates
    }

    fn magnitude(&self, value: &T) -> f64 {
        value.to_f64().map_or(f64::MAX, f64::abs)
    }

    fn supports(&self, kind: &DirectiveKind) -> bool {
        matches!(kind, DirectiveKind::InRange | DirectiveKind::Precision)
    }

    fn configure(&mut self, directive: &Directive) -> Result<(), ConfigurationError> {
        match directive {
            Directive::InRange { min, max } => {
                let min = min.map(|bound| self.narrow(bound)).transpose()?;
                let max = max.map(|bound| self.narrow(bound)).transpose()?;
                let span = <T as NumCast>::from(OPEN_SPAN).unwrap_or_else(T::max_value);
                let bounds = resolve_bounds(min, max, -span, span)
                    .map_err(|source| ConfigurationError::range(DirectiveKind::InRange, source))?;
                self.bounds = Some(bounds);
            }
            Directive::Precision { scale } => {
                if *scale > T::MAX_SCALE {
                    return Err(ConfigurationError::OutOfDomain {
                        generator: format!("FloatingGenerator<{}>", T::TOKEN),
                        kind: DirectiveKind::Precision,
                        value: scale.to_string(),
                    });
                }
                self.scale = Some(*scale);
            }
            _ => {}
        }
        Ok(())
    }
}
