//! Error types for resolution, configuration and generation sessions.

use thiserror::Error;

use crate::config::ConfigError;
use crate::descriptor::TypeDescriptor;
use crate::directive::DirectiveKind;

/// Failure to find or wire a generator for a requested type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolutionError {
    /// No registered generator applies to the requested type
    #[error("no generator found for {requested}")]
    NoGenerator { requested: TypeDescriptor },

    /// Every candidate was dropped because one of its components could not be resolved
    #[error("cannot resolve component of {requested}: {source}")]
    Component {
        requested: TypeDescriptor,
        #[source]
        source: Box<ResolutionError>,
    },

    /// A componentized generator received the wrong number of component generators
    #[error("{generator} needs {expected} component generator(s), received {actual}")]
    ComponentArity {
        generator: String,
        expected: usize,
        actual: usize,
    },
}

impl ResolutionError {
    /// Create a no-generator error for the given request
    pub fn no_generator(requested: &TypeDescriptor) -> Self {
        Self::NoGenerator {
            requested: requested.clone(),
        }
    }

    /// Wrap a component failure with the outer request
    pub fn component(requested: &TypeDescriptor, source: ResolutionError) -> Self {
        Self::Component {
            requested: requested.clone(),
            source: Box::new(source),
        }
    }

    /// The innermost type descriptor that could not be resolved
    pub fn root_cause(&self) -> Option<&TypeDescriptor> {
        match self {
            ResolutionError::NoGenerator { requested } => Some(requested),
            ResolutionError::Component { source, .. } => source.root_cause(),
            ResolutionError::ComponentArity { .. } => None,
        }
    }
}

/// Inverted or otherwise malformed bounds
#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid range: min {min} is greater than max {max}")]
pub struct RangeError {
    pub min: String,
    pub max: String,
}

impl RangeError {
    pub fn new(min: impl ToString, max: impl ToString) -> Self {
        Self {
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}

/// Rejection of a configuration directive
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    /// The generator does not understand this directive kind
    #[error("{generator} does not support the {kind} directive")]
    Unsupported {
        generator: String,
        kind: DirectiveKind,
    },

    /// None of the candidate generators for a type accept a required directive
    #[error("no generator for {requested} supports the {kind} directive")]
    NoCandidateSupports {
        requested: TypeDescriptor,
        kind: DirectiveKind,
    },

    /// The directive payload is malformed
    #[error("malformed {kind} directive: {source}")]
    Range {
        kind: DirectiveKind,
        #[source]
        source: RangeError,
    },

    /// The directive payload does not fit the generator's value type
    #[error("{kind} directive value {value} does not fit {generator}")]
    OutOfDomain {
        generator: String,
        kind: DirectiveKind,
        value: String,
    },
}

impl ConfigurationError {
    /// Create an unsupported-directive error
    pub fn unsupported(generator: impl Into<String>, kind: DirectiveKind) -> Self {
        Self::Unsupported {
            generator: generator.into(),
            kind,
        }
    }

    /// Create a malformed-range error
    pub fn range(kind: DirectiveKind, source: RangeError) -> Self {
        Self::Range { kind, source }
    }
}

/// A weight of zero was supplied to a weighted choice
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("weight must be positive, got {weight}")]
pub struct WeightError {
    pub weight: u32,
}

/// Probability or mean outside the domain of a distribution
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum DistributionError {
    #[error("probability {0} is outside (0, 1]")]
    InvalidProbability(f64),

    #[error("mean {0} must be positive")]
    InvalidMean(f64),
}

/// The validity predicate rejected too many draws for one parameter
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "parameter {parameter} exceeded discard ratio {discard_ratio}: \
     {attempts} attempts produced {successes} valid value(s)"
)]
pub struct DiscardRatioExceeded {
    pub parameter: String,
    pub discard_ratio: usize,
    pub attempts: usize,
    pub successes: usize,
}

/// Top-level error for a generation session
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    DiscardRatioExceeded(#[from] DiscardRatioExceeded),

    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
