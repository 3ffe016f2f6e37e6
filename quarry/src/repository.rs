//! Generator registration and type resolution.
//!
//! A [`RepositoryBuilder`] collects generator factories and the type
//! hierarchy they are matched against, then freezes into a
//! [`GeneratorRepository`]. Resolving a [`TypeDescriptor`] gathers every
//! registration whose declared types are assignable to the request, wires
//! component generators for containers, applies the requested
//! [`Configuration`] and, when several candidates survive, combines them into
//! a uniform [`CompositeGenerator`].
//!
//! Every resolution builds fresh generator instances from the registered
//! factories, so configuring a resolved generator never affects the shared
//! repository.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::composite::CompositeGenerator;
use crate::descriptor::{TypeDescriptor, TypeHierarchy, TypeToken};
use crate::directive::{Configuration, DirectiveKind, Strictness};
use crate::error::{ConfigurationError, ResolutionError, Result};
use crate::generator::{AnyGenerator, Generator, SharedGenerator, erase};
use crate::random::RandomSource;
use crate::status::GenerationStatus;
use crate::value::Value;

/// Nesting depth beyond which componentized candidates are no longer wired
const MAX_COMPONENT_DEPTH: usize = 8;

/// Builds a fresh, unconfigured generator
pub type GeneratorFactory = Arc<dyn Fn() -> Box<dyn AnyGenerator> + Send + Sync>;

struct Registration {
    /// Consulted for declared types and registration opt-outs only
    prototype: Box<dyn AnyGenerator>,
    factory: GeneratorFactory,
}

impl Registration {
    fn new(factory: GeneratorFactory) -> Self {
        Self {
            prototype: factory(),
            factory,
        }
    }

    fn applies_to(&self, token: &TypeToken, hierarchy: &TypeHierarchy) -> bool {
        self.prototype
            .types()
            .iter()
            .any(|declared| hierarchy.is_assignable(declared, token))
    }
}

/// Mutable registration phase of a [`GeneratorRepository`]
#[derive(Default)]
pub struct RepositoryBuilder {
    hierarchy: TypeHierarchy,
    registrations: Vec<Registration>,
}

impl RepositoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the built-in generators and their type hierarchy
    pub fn with_defaults() -> Self {
        crate::generators::register_defaults(Self::new())
    }

    /// Declare `supertype` as a direct supertype or interface of `subtype`
    pub fn declare(
        mut self,
        subtype: impl Into<TypeToken>,
        supertype: impl Into<TypeToken>,
    ) -> Self {
        self.hierarchy.declare(subtype, supertype);
        self
    }

    /// Register a typed generator; `factory` is called once per resolution
    pub fn register<G, F>(self, factory: F) -> Self
    where
        G: Generator,
        F: Fn() -> G + Send + Sync + 'static,
    {
        self.register_erased(move || erase(factory()))
    }

    /// Register a factory of already-erased generators
    pub fn register_erased<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn AnyGenerator> + Send + Sync + 'static,
    {
        let registration = Registration::new(Arc::new(factory));
        debug!(
            generator = %registration.prototype.name(),
            types = ?registration.prototype.types(),
            "registered generator"
        );
        self.registrations.push(registration);
        self
    }

    pub fn build(self) -> GeneratorRepository {
        GeneratorRepository {
            hierarchy: self.hierarchy,
            registrations: self.registrations,
        }
    }
}

/// Immutable registry resolving type descriptors to generators
pub struct GeneratorRepository {
    hierarchy: TypeHierarchy,
    registrations: Vec<Registration>,
}

/// Per-candidate result of component wiring
enum Wiring {
    Wired(Box<dyn AnyGenerator>),
    Dropped,
    Failed(ResolutionError),
}

/// Per-candidate result of applying a configuration
enum Applied {
    Configured,
    Refused {
        kind: DirectiveKind,
        error: ConfigurationError,
    },
}

impl GeneratorRepository {
    pub fn builder() -> RepositoryBuilder {
        RepositoryBuilder::new()
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// Number of registered generators
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Bind this repository to a random source for one parameter session
    pub fn with_random(&self, random: RandomSource) -> BoundRepository<'_> {
        BoundRepository {
            repository: self,
            random,
        }
    }

    /// Resolve a generator for `descriptor` with no configuration
    pub fn resolve(&self, descriptor: &TypeDescriptor) -> Result<SharedGenerator, ResolutionError> {
        let candidates = self.candidates_for(descriptor, 0)?;
        Ok(combine(candidates))
    }

    /// Resolve a generator for `descriptor` and apply `configuration` to it.
    ///
    /// Candidates lacking support for a strict directive are dropped; lenient
    /// directives are skipped where unsupported.
    pub fn generator_for(
        &self,
        descriptor: &TypeDescriptor,
        configuration: &Configuration,
    ) -> Result<SharedGenerator> {
        configuration.validate()?;
        let candidates = self.candidates_for(descriptor, 0)?;
        let configured = configure_candidates(descriptor, candidates, configuration)?;
        Ok(combine(configured))
    }

    /// Registrations applicable to the lookup token of `descriptor`
    fn matching(&self, descriptor: &TypeDescriptor) -> Vec<&Registration> {
        let token = descriptor.lookup_token();
        let applicable: Vec<&Registration> = self
            .registrations
            .iter()
            .filter(|registration| registration.applies_to(token, &self.hierarchy))
            .collect();

        let willing: Vec<&Registration> = applicable
            .iter()
            .copied()
            .filter(|registration| registration.prototype.can_register_as(token))
            .collect();

        if token.is_any() && willing.is_empty() {
            applicable
        } else {
            willing
        }
    }

    fn candidates_for(
        &self,
        descriptor: &TypeDescriptor,
        depth: usize,
    ) -> Result<Vec<Box<dyn AnyGenerator>>, ResolutionError> {
        let matching = self.matching(descriptor);
        let mut wired = Vec::with_capacity(matching.len());
        let mut failure = None;

        for registration in matching {
            match self.wire(descriptor, (registration.factory)(), depth) {
                Wiring::Wired(generator) => wired.push(generator),
                Wiring::Dropped => {}
                Wiring::Failed(error) => {
                    failure.get_or_insert(error);
                }
            }
        }

        if wired.is_empty() {
            let error = match failure {
                Some(error) => ResolutionError::component(descriptor, error),
                None => ResolutionError::no_generator(descriptor),
            };
            debug!(requested = %descriptor, %error, "resolution failed");
            return Err(error);
        }

        debug!(requested = %descriptor, candidates = wired.len(), "resolved generators");
        Ok(wired)
    }

    /// Supply component generators to a candidate that needs them
    fn wire(
        &self,
        descriptor: &TypeDescriptor,
        mut generator: Box<dyn AnyGenerator>,
        depth: usize,
    ) -> Wiring {
        let needed = generator.needed_components();
        if needed == 0 {
            return Wiring::Wired(generator);
        }
        if depth >= MAX_COMPONENT_DEPTH {
            trace!(generator = %generator.name(), depth, "component nesting too deep");
            return Wiring::Dropped;
        }

        let params: Vec<TypeDescriptor> = if descriptor.params().is_empty() {
            vec![TypeDescriptor::wildcard(); needed]
        } else if descriptor.params().len() == needed {
            descriptor.params().to_vec()
        } else {
            trace!(
                generator = %generator.name(),
                needed,
                given = descriptor.params().len(),
                "component arity mismatch"
            );
            return Wiring::Dropped;
        };

        if !generator.accepts_components(&params) {
            trace!(generator = %generator.name(), ?params, "components rejected");
            return Wiring::Dropped;
        }

        let mut components = Vec::with_capacity(needed);
        for param in &params {
            match self.candidates_for(param, depth + 1) {
                Ok(candidates) => components.push(combine(candidates)),
                Err(error) => return Wiring::Failed(error),
            }
        }

        match generator.add_components(components) {
            Ok(()) => Wiring::Wired(generator),
            Err(error) => Wiring::Failed(error),
        }
    }
}

impl fmt::Debug for GeneratorRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .registrations
            .iter()
            .map(|registration| registration.prototype.name())
            .collect();
        f.debug_struct("GeneratorRepository")
            .field("hierarchy", &self.hierarchy)
            .field("generators", &names)
            .finish()
    }
}

fn apply(
    generator: &mut dyn AnyGenerator,
    configuration: &Configuration,
) -> Result<Applied, ConfigurationError> {
    for configured in configuration.directives() {
        let kind = configured.directive.kind();
        if generator.supports(&kind) {
            match generator.configure(&configured.directive) {
                Ok(()) => {}
                Err(error @ ConfigurationError::Range { .. }) => return Err(error),
                Err(error) => return Ok(Applied::Refused { kind, error }),
            }
        } else if configured.strictness == Strictness::Strict {
            let error = ConfigurationError::unsupported(generator.name(), kind.clone());
            return Ok(Applied::Refused { kind, error });
        }
    }
    Ok(Applied::Configured)
}

/// Configure every candidate, dropping those that refuse a directive.
///
/// Malformed payloads abort resolution; a refusal is only an error once no
/// candidate is left.
fn configure_candidates(
    descriptor: &TypeDescriptor,
    candidates: Vec<Box<dyn AnyGenerator>>,
    configuration: &Configuration,
) -> Result<Vec<Box<dyn AnyGenerator>>, ConfigurationError> {
    if configuration.is_empty() {
        return Ok(candidates);
    }

    let single = candidates.len() == 1;
    let mut configured = Vec::with_capacity(candidates.len());
    let mut refusal = None;

    for mut candidate in candidates {
        match apply(candidate.as_mut(), configuration)? {
            Applied::Configured => configured.push(candidate),
            Applied::Refused { kind, error } => {
                trace!(generator = %candidate.name(), %kind, %error, "candidate dropped");
                refusal.get_or_insert((kind, error));
            }
        }
    }

    match refusal {
        Some((kind, error)) if configured.is_empty() => {
            if single {
                Err(error)
            } else {
                Err(ConfigurationError::NoCandidateSupports {
                    requested: descriptor.clone(),
                    kind,
                })
            }
        }
        _ => Ok(configured),
    }
}

fn combine(mut candidates: Vec<Box<dyn AnyGenerator>>) -> SharedGenerator {
    if candidates.len() == 1 {
        if let Some(only) = candidates.pop() {
            return Arc::from(only);
        }
    }
    Arc::new(CompositeGenerator::uniform(
        candidates.into_iter().map(Arc::from).collect(),
    ))
}

/// A repository bound to the random source of one parameter session
pub struct BoundRepository<'r> {
    repository: &'r GeneratorRepository,
    random: RandomSource,
}

impl<'r> BoundRepository<'r> {
    pub fn repository(&self) -> &'r GeneratorRepository {
        self.repository
    }

    pub fn random(&mut self) -> &mut RandomSource {
        &mut self.random
    }

    pub fn into_random(self) -> RandomSource {
        self.random
    }

    pub fn generator_for(
        &self,
        descriptor: &TypeDescriptor,
        configuration: &Configuration,
    ) -> Result<SharedGenerator> {
        self.repository.generator_for(descriptor, configuration)
    }

    /// Resolve and immediately draw one value with the bound random source
    pub fn produce(
        &mut self,
        descriptor: &TypeDescriptor,
        status: &mut GenerationStatus,
    ) -> Result<Value> {
        let generator = self.repository.resolve(descriptor)?;
        Ok(generator.generate(&mut self.random, status))
    }
}
