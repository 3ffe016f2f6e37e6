//! Configuration directives applied to resolved generators.
//!
//! The declaration layer translates user constraints into [`Directive`]s. A
//! generator advertises which [`DirectiveKind`]s it understands; the
//! repository applies each directive only to generators that support it, and
//! a [`Configuration`] marks every directive as strict (must be honoured) or
//! lenient (ignored where unsupported).

use std::fmt;

use crate::error::{ConfigurationError, RangeError};
use crate::random::check_range;

/// Discriminant of a [`Directive`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    InRange,
    Size,
    Distinct,
    Precision,
    Custom(String),
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectiveKind::InRange => f.write_str("in-range"),
            DirectiveKind::Size => f.write_str("size"),
            DirectiveKind::Distinct => f.write_str("distinct"),
            DirectiveKind::Precision => f.write_str("precision"),
            DirectiveKind::Custom(name) => write!(f, "custom:{}", name),
        }
    }
}

/// A single constraint on generated values
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Numeric bounds, both inclusive; an absent bound falls back to the
    /// generator's own limit
    InRange { min: Option<i128>, max: Option<i128> },
    /// Collection size bounds, both inclusive
    Size { min: Option<usize>, max: Option<usize> },
    /// Collection elements must be pairwise distinct
    Distinct,
    /// Decimal places for fractional values
    Precision { scale: u32 },
    /// Free-form directive understood by user generators
    Custom { name: String, payload: String },
}

impl Directive {
    pub fn in_range(min: i128, max: i128) -> Self {
        Self::InRange {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: i128) -> Self {
        Self::InRange {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: i128) -> Self {
        Self::InRange {
            min: None,
            max: Some(max),
        }
    }

    pub fn size(min: usize, max: usize) -> Self {
        Self::Size {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least_size(min: usize) -> Self {
        Self::Size {
            min: Some(min),
            max: None,
        }
    }

    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::InRange { .. } => DirectiveKind::InRange,
            Directive::Size { .. } => DirectiveKind::Size,
            Directive::Distinct => DirectiveKind::Distinct,
            Directive::Precision { .. } => DirectiveKind::Precision,
            Directive::Custom { name, .. } => DirectiveKind::Custom(name.clone()),
        }
    }

    /// Reject payloads that can never be satisfied, before any generator sees them
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let checked = match self {
            Directive::InRange {
                min: Some(min),
                max: Some(max),
            } => check_range(min, max),
            Directive::Size {
                min: Some(min),
                max: Some(max),
            } => check_range(min, max),
            _ => Ok(()),
        };
        checked.map_err(|source| ConfigurationError::range(self.kind(), source))
    }
}

/// Resolve optional bounds against a generator's defaults.
///
/// When only one bound is given and it lies beyond the opposite default, the
/// missing bound collapses onto the given one instead of producing an
/// inverted range.
pub fn resolve_bounds<T>(
    min: Option<T>,
    max: Option<T>,
    default_min: T,
    default_max: T,
) -> Result<(T, T), RangeError>
where
    T: PartialOrd + Copy + fmt::Display,
{
    let (min, max) = match (min, max) {
        (Some(min), Some(max)) => (min, max),
        (Some(min), None) => (min, if min > default_max { min } else { default_max }),
        (None, Some(max)) => (if max < default_min { max } else { default_min }, max),
        (None, None) => (default_min, default_max),
    };
    check_range(&min, &max)?;
    Ok((min, max))
}

/// Whether an unsupported directive is an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    Strict,
    Lenient,
}

/// Directive plus how strictly it must be applied
#[derive(Debug, Clone, PartialEq)]
pub struct ConfiguredDirective {
    pub directive: Directive,
    pub strictness: Strictness,
}

/// Ordered set of directives for one parameter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    directives: Vec<ConfiguredDirective>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directive that must be supported by the resolved generator
    pub fn strict(mut self, directive: Directive) -> Self {
        self.directives.push(ConfiguredDirective {
            directive,
            strictness: Strictness::Strict,
        });
        self
    }

    /// Add a directive that is skipped by generators that do not support it
    pub fn lenient(mut self, directive: Directive) -> Self {
        self.directives.push(ConfiguredDirective {
            directive,
            strictness: Strictness::Lenient,
        });
        self
    }

    pub fn directives(&self) -> &[ConfiguredDirective] {
        &self.directives
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Validate every payload up front
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.directives
            .iter()
            .try_for_each(|configured| configured.directive.validate())
    }
}
