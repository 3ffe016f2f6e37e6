//! Core generator abstraction and its type-erased form.
//!
//! Concrete generators implement the typed [`Generator`] trait. The
//! repository, composites and the shrink search only ever see the erased
//! [`AnyGenerator`], which works on [`Value`]s and enforces the shrink
//! precondition.

use std::fmt;
use std::sync::Arc;

use crate::descriptor::{TypeDescriptor, TypeToken};
use crate::directive::{Directive, DirectiveKind};
use crate::error::{ConfigurationError, ResolutionError};
use crate::random::RandomSource;
use crate::status::GenerationStatus;
use crate::value::{Datum, Value};

/// Erased generator shared between composites, contexts and threads
pub type SharedGenerator = Arc<dyn AnyGenerator>;

/// Producer and minimizer of values of one or more runtime types
pub trait Generator: Send + Sync + 'static {
    /// The concrete value type produced
    type Output: Datum + Clone;

    /// Type tokens this generator's values are assignable to
    fn types(&self) -> Vec<TypeToken>;

    /// Produce a value. Must depend only on `random`, `status` and
    /// configuration applied before the first call.
    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> Self::Output;

    /// Whether `larger` can be offered to [`Generator::shrink`]
    fn can_shrink(&self, _larger: &Self::Output) -> bool {
        true
    }

    /// Smaller candidates for a failing value, in preference order
    fn shrink(&self, _random: &mut RandomSource, _larger: &Self::Output) -> Vec<Self::Output> {
        Vec::new()
    }

    /// How big a value is; the shrink search tries bigger candidates first
    fn magnitude(&self, _value: &Self::Output) -> f64 {
        0.0
    }

    /// Whether this generator may be registered under `token`, one of the
    /// ancestors of its declared types
    fn can_register_as(&self, _token: &TypeToken) -> bool {
        true
    }

    /// Number of component generators required before first use
    fn needed_components(&self) -> usize {
        0
    }

    /// Whether this generator can produce values for these component types
    fn accepts_components(&self, _components: &[TypeDescriptor]) -> bool {
        true
    }

    /// Receive exactly [`Generator::needed_components`] component generators
    fn add_components(&mut self, _components: Vec<SharedGenerator>) {}

    fn supports(&self, _kind: &DirectiveKind) -> bool {
        false
    }

    /// Apply a directive whose kind this generator supports
    fn configure(&mut self, directive: &Directive) -> Result<(), ConfigurationError> {
        Err(ConfigurationError::unsupported(
            std::any::type_name::<Self>(),
            directive.kind(),
        ))
    }
}

/// Object-safe generator over [`Value`]s
pub trait AnyGenerator: Send + Sync {
    /// Human-readable name for diagnostics
    fn name(&self) -> String;

    fn types(&self) -> Vec<TypeToken>;

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> Value;

    fn can_shrink(&self, larger: &Value) -> bool;

    /// Shrink candidates for `larger`.
    ///
    /// # Panics
    ///
    /// Panics if `can_shrink(larger)` is false; reaching this is a dispatch bug.
    fn shrink(&self, random: &mut RandomSource, larger: &Value) -> Vec<Value>;

    fn magnitude(&self, value: &Value) -> f64;

    /// Whether `value` has the runtime type this generator produces
    fn produces(&self, value: &Value) -> bool;

    fn can_register_as(&self, token: &TypeToken) -> bool;

    fn needed_components(&self) -> usize;

    fn accepts_components(&self, components: &[TypeDescriptor]) -> bool;

    fn add_components(&mut self, components: Vec<SharedGenerator>) -> Result<(), ResolutionError>;

    fn supports(&self, kind: &DirectiveKind) -> bool;

    fn configure(&mut self, directive: &Directive) -> Result<(), ConfigurationError>;
}

impl fmt::Debug for dyn AnyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Adapter from a typed [`Generator`] to [`AnyGenerator`]
struct Erased<G> {
    inner: G,
}

impl<G: Generator> AnyGenerator for Erased<G> {
    fn name(&self) -> String {
        short_type_name::<G>()
    }

    fn types(&self) -> Vec<TypeToken> {
        self.inner.types()
    }

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> Value {
        Value::new(self.inner.generate(random, status))
    }

    fn can_shrink(&self, larger: &Value) -> bool {
        larger
            .downcast_ref::<G::Output>()
            .is_some_and(|larger| self.inner.can_shrink(larger))
    }

    fn shrink(&self, random: &mut RandomSource, larger: &Value) -> Vec<Value> {
        let typed = match larger.downcast_ref::<G::Output>() {
            Some(typed) if self.inner.can_shrink(typed) => typed,
            _ => panic!(
                "{} asked to shrink {:?} ({}) which it cannot shrink",
                self.name(),
                larger,
                larger.type_name()
            ),
        };
        self.inner
            .shrink(random, typed)
            .into_iter()
            .map(Value::new)
            .collect()
    }

    fn magnitude(&self, value: &Value) -> f64 {
        value
            .downcast_ref::<G::Output>()
            .map_or(0.0, |value| self.inner.magnitude(value))
    }

    fn produces(&self, value: &Value) -> bool {
        value.is::<G::Output>()
    }

    fn can_register_as(&self, token: &TypeToken) -> bool {
        self.inner.can_register_as(token)
    }

    fn needed_components(&self) -> usize {
        self.inner.needed_components()
    }

    fn accepts_components(&self, components: &[TypeDescriptor]) -> bool {
        self.inner.accepts_components(components)
    }

    fn add_components(&mut self, components: Vec<SharedGenerator>) -> Result<(), ResolutionError> {
        let expected = self.inner.needed_components();
        if components.len() != expected {
            return Err(ResolutionError::ComponentArity {
                generator: self.name(),
                expected,
                actual: components.len(),
            });
        }
        if expected > 0 {
            self.inner.add_components(components);
        }
        Ok(())
    }

    fn supports(&self, kind: &DirectiveKind) -> bool {
        self.inner.supports(kind)
    }

    fn configure(&mut self, directive: &Directive) -> Result<(), ConfigurationError> {
        if !self.inner.supports(&directive.kind()) {
            return Err(ConfigurationError::unsupported(self.name(), directive.kind()));
        }
        directive.validate()?;
        self.inner.configure(directive)
    }
}

/// Erase a typed generator
pub fn erase<G: Generator>(generator: G) -> Box<dyn AnyGenerator> {
    Box::new(Erased { inner: generator })
}

/// Erase a typed generator into a shareable handle
pub fn share<G: Generator>(generator: G) -> SharedGenerator {
    Arc::new(Erased { inner: generator })
}

fn short_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
