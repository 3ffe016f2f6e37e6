//! Maps with distinct keys, general and string-keyed.

use crate::descriptor::{TypeDescriptor, TypeToken};
use crate::directive::{Directive, DirectiveKind, resolve_bounds};
use crate::error::ConfigurationError;
use crate::generator::{Generator, SharedGenerator};
use crate::random::RandomSource;
use crate::status::GenerationStatus;
use crate::value::Value;

use super::{MAP, STRING, STRING_MAP, draw_length};

/// Maps as key/value entries with pairwise distinct keys.
///
/// Needs a key and a value component. The string-keyed variant only accepts
/// `String` (or unconstrained) key types.
#[derive(Clone)]
pub struct MapGenerator {
    token: TypeToken,
    string_keys_only: bool,
    keys: Option<SharedGenerator>,
    values: Option<SharedGenerator>,
    min_size: usize,
    max_size: Option<usize>,
}

impl MapGenerator {
    pub fn new() -> Self {
        Self {
            token: MAP,
            string_keys_only: false,
            keys: None,
            values: None,
            min_size: 0,
            max_size: None,
        }
    }

    pub fn string_keyed() -> Self {
        Self {
            token: STRING_MAP,
            string_keys_only: true,
            ..Self::new()
        }
    }

    pub fn of(keys: SharedGenerator, values: SharedGenerator) -> Self {
        Self {
            keys: Some(keys),
            values: Some(values),
            ..Self::new()
        }
    }
}

impl Default for MapGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for MapGenerator {
    type Output = Vec<(Value, Value)>;

    fn types(&self) -> Vec<TypeToken> {
        vec![self.token.clone()]
    }

    /// # Panics
    ///
    /// Panics if the key and value generators have not been supplied.
    fn generate(
        &self,
        random: &mut RandomSource,
        status: &mut GenerationStatus,
    ) -> Vec<(Value, Value)> {
        let (Some(keys), Some(values)) = (&self.keys, &self.values) else {
            panic!("MapGenerator used before its components were supplied");
        };
        let size = draw_length(self.min_size, self.max_size, random, status);

        let mut entries: Vec<(Value, Value)> = Vec::with_capacity(size);
        let mut draws = 0;
        while entries.len() < size && draws < size.saturating_mul(10) {
            let key = keys.generate(random, status);
            let value = values.generate(random, status);
            if !entries.iter().any(|(existing, _)| *existing == key) {
                entries.push((key, value));
            }
            draws += 1;
        }
        entries
    }

    fn can_shrink(&self, larger: &Vec<(Value, Value)>) -> bool {
        larger.len() > self.min_size
            || self
                .values
                .as_ref()
                .is_some_and(|values| larger.iter().any(|(_, value)| values.can_shrink(value)))
    }

    fn shrink(
        &self,
        random: &mut RandomSource,
        larger: &Vec<(Value, Value)>,
    ) -> Vec<Vec<(Value, Value)>> {
        let mut candidates = Vec::new();

        if larger.len() > self.min_size {
            candidates.push(larger[..self.min_size].to_vec());
            for i in 0..larger.len() {
                let mut without = larger.clone();
                without.remove(i);
                candidates.push(without);
            }
        }

        if let Some(values) = &self.values {
            for (i, (_, value)) in larger.iter().enumerate() {
                if !values.can_shrink(value) {
                    continue;
                }
                for smaller in values.shrink(random, value) {
                    let mut replaced = larger.clone();
                    replaced[i].1 = smaller;
                    candidates.push(replaced);
                }
            }
        }

        candidates
    }

    fn magnitude(&self, value: &Vec<(Value, Value)>) -> f64 {
        value.len() as f64
    }

    fn can_register_as(&self, token: &TypeToken) -> bool {
        !token.is_any()
    }

    fn needed_components(&self) -> usize {
        2
    }

    fn accepts_components(&self, components: &[TypeDescriptor]) -> bool {
        if !self.string_keys_only {
            return true;
        }
        components
            .first()
            .is_some_and(|key| key.is_wildcard() || *key.lookup_token() == STRING)
    }

    fn add_components(&mut self, components: Vec<SharedGenerator>) {
        let mut components = components.into_iter();
        self.keys = components.next();
        self.values = components.next();
    }

    fn supports(&self, kind: &DirectiveKind) -> bool {
        *kind == DirectiveKind::Size
    }

    fn configure(&mut self, directive: &Directive) -> Result<(), ConfigurationError> {
        if let Directive::Size { min, max } = directive {
            let (low, high) = resolve_bounds(*min, *max, 0, usize::MAX)
                .map_err(|source| ConfigurationError::range(DirectiveKind::Size, source))?;
            self.min_size = low;
            self.max_size = max.map(|_| high);
        }
        Ok(())
    }
}
