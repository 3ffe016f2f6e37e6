#![allow(clippy::result_large_err)]

//! # Quarry - type-directed value generation and shrinking
//!
//! Quarry is the engine underneath a property-based testing runner. Given a
//! declared value type it resolves every registered generator able to produce
//! that type, draws pseudo-random instances with a growing size, discards
//! draws rejected by a validity predicate without looping forever, and when a
//! trial fails searches for a smaller value that still reproduces the
//! failure.
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry::{
//!     Configuration, Directive, GenerationContext, Parameter, RandomSource,
//!     RepositoryBuilder, SessionConfig,
//! };
//!
//! let repository = RepositoryBuilder::with_defaults().build();
//! let parameter = Parameter::new("n", "Integer")
//!     .with_configuration(Configuration::new().strict(Directive::in_range(1, 100)));
//! let config = SessionConfig::default().with_seed(7);
//!
//! let mut context =
//!     GenerationContext::resolve(&repository, parameter, RandomSource::new(7), &config)
//!         .unwrap();
//! let value = context.generate(|_| true).unwrap();
//! let n = *value.downcast_ref::<i32>().unwrap();
//! assert!((1..=100).contains(&n));
//!
//! // every value fails, so the search walks down to the lower bound
//! let result = context.shrink(value, |_| Err::<(), _>("still failing"));
//! assert_eq!(result.minimal.downcast_ref::<i32>(), Some(&1));
//! ```

// Public modules
pub mod combinators;
pub mod composite;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod directive;
pub mod distribution;
pub mod error;
pub mod generator;
pub mod generators;
pub mod parallel;
pub mod random;
pub mod repository;
pub mod shrink;
pub mod status;
pub mod value;
pub mod weighted;

// Re-export the main public API
pub use combinators::{
    BoxedGen, Gen, GenGenerator, frequency, frequency_of_values, from_generator, one_of,
    one_of_values,
};
pub use composite::CompositeGenerator;
pub use config::{ConfigError, SessionConfig};
pub use context::{GenerationContext, Parameter};
pub use descriptor::{TypeDescriptor, TypeHierarchy, TypeToken, Variance};
pub use directive::{Configuration, Directive, DirectiveKind, Strictness};
pub use distribution::{GeometricDistribution, Probability};
pub use error::{
    ConfigurationError, DiscardRatioExceeded, DistributionError, Error, RangeError,
    ResolutionError, Result, WeightError,
};
pub use generator::{AnyGenerator, Generator, SharedGenerator, erase, share};
pub use parallel::{ParallelConfig, SessionOutcome, run_sessions};
pub use random::RandomSource;
pub use repository::{BoundRepository, GeneratorRepository, RepositoryBuilder};
pub use shrink::{ShrinkConfig, ShrinkProgress, ShrinkResult, ShrinkSearch, ShrinkStep};
pub use status::{GenerationStatus, Key};
pub use value::{Datum, Value};
pub use weighted::{Weighted, choose_weighted};
