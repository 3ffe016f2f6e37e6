//! Weighted union of erased generators.

use crate::descriptor::{TypeDescriptor, TypeToken};
use crate::directive::{Directive, DirectiveKind};
use crate::error::{ConfigurationError, ResolutionError};
use crate::generator::{AnyGenerator, SharedGenerator};
use crate::random::RandomSource;
use crate::status::GenerationStatus;
use crate::value::Value;
use crate::weighted::{Weighted, choose_weighted};

/// Dispatches each call to one of several constituent generators.
///
/// Generation picks a constituent with probability proportional to its
/// weight. Shrinking picks, with the same weighting, among the constituents
/// able to shrink the value, since a value may have come from any of them.
pub struct CompositeGenerator {
    constituents: Vec<Weighted<SharedGenerator>>,
}

impl CompositeGenerator {
    /// # Panics
    ///
    /// Panics if `constituents` is empty.
    pub fn new(constituents: Vec<Weighted<SharedGenerator>>) -> Self {
        assert!(
            !constituents.is_empty(),
            "a composite generator needs at least one constituent"
        );
        Self { constituents }
    }

    /// Every constituent with weight one
    pub fn uniform(generators: Vec<SharedGenerator>) -> Self {
        Self::new(generators.into_iter().map(Weighted::unit).collect())
    }

    pub fn constituents(&self) -> &[Weighted<SharedGenerator>] {
        &self.constituents
    }

    fn shrinkers_of(&self, larger: &Value) -> Vec<Weighted<SharedGenerator>> {
        self.constituents
            .iter()
            .filter(|constituent| constituent.item().can_shrink(larger))
            .cloned()
            .collect()
    }
}

impl AnyGenerator for CompositeGenerator {
    fn name(&self) -> String {
        let names: Vec<String> = self
            .constituents
            .iter()
            .map(|constituent| constituent.item().name())
            .collect();
        format!("Composite[{}]", names.join(", "))
    }

    fn types(&self) -> Vec<TypeToken> {
        let mut types: Vec<TypeToken> = Vec::new();
        for constituent in &self.constituents {
            for token in constituent.item().types() {
                if !types.contains(&token) {
                    types.push(token);
                }
            }
        }
        types
    }

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> Value {
        choose_weighted(random, &self.constituents).generate(random, status)
    }

    fn can_shrink(&self, larger: &Value) -> bool {
        self.constituents
            .iter()
            .any(|constituent| constituent.item().can_shrink(larger))
    }

    fn shrink(&self, random: &mut RandomSource, larger: &Value) -> Vec<Value> {
        let shrinkers = self.shrinkers_of(larger);
        if shrinkers.is_empty() {
            return Vec::new();
        }
        choose_weighted(random, &shrinkers).shrink(random, larger)
    }

    /// Measured by the first constituent producing the value's runtime type
    fn magnitude(&self, value: &Value) -> f64 {
        self.constituents
            .iter()
            .find(|constituent| constituent.item().produces(value))
            .map_or(0.0, |constituent| constituent.item().magnitude(value))
    }

    fn produces(&self, value: &Value) -> bool {
        self.constituents
            .iter()
            .any(|constituent| constituent.item().produces(value))
    }

    fn can_register_as(&self, token: &TypeToken) -> bool {
        self.constituents
            .iter()
            .all(|constituent| constituent.item().can_register_as(token))
    }

    fn needed_components(&self) -> usize {
        0
    }

    fn accepts_components(&self, components: &[TypeDescriptor]) -> bool {
        components.is_empty()
    }

    fn add_components(&mut self, components: Vec<SharedGenerator>) -> Result<(), ResolutionError> {
        if components.is_empty() {
            return Ok(());
        }
        Err(ResolutionError::ComponentArity {
            generator: self.name(),
            expected: 0,
            actual: components.len(),
        })
    }

    fn supports(&self, _kind: &DirectiveKind) -> bool {
        false
    }

    /// Constituents are configured before they are combined
    fn configure(&mut self, directive: &Directive) -> Result<(), ConfigurationError> {
        Err(ConfigurationError::unsupported(self.name(), directive.kind()))
    }
}
