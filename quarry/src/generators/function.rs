//! Pure, memoizing generated functions.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, PoisonError};

use rand::RngCore;

use crate::descriptor::TypeToken;
use crate::generator::{Generator, SharedGenerator};
use crate::random::RandomSource;
use crate::status::GenerationStatus;
use crate::value::Value;

use super::FUNCTION;

/// A generated pure function.
///
/// The result for an argument is drawn from the result generator with a
/// random source seeded from the function's seed and a hash of the
/// argument's debug text, then memoized, so equal arguments always map to
/// equal results.
#[derive(Clone)]
pub struct FunctionValue {
    seed: u64,
    size: usize,
    result: SharedGenerator,
    cache: Arc<Mutex<HashMap<String, Value>>>,
}

impl FunctionValue {
    pub fn new(seed: u64, size: usize, result: SharedGenerator) -> Self {
        Self {
            seed,
            size,
            result,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn apply(&self, argument: &Value) -> Value {
        let key = format!("{:?}", argument);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(result) = cache.get(&key) {
            return result.clone();
        }

        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let mut random = RandomSource::new(self.seed ^ hasher.finish());
        let mut status = GenerationStatus::with_size(self.size);
        let result = self.result.generate(&mut random, &mut status);
        cache.insert(key, result.clone());
        result
    }

    /// Number of distinct arguments applied so far
    pub fn memoized(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function seed={} returning {}>", self.seed, self.result.name())
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed
            && self.size == other.size
            && Arc::ptr_eq(&self.result, &other.result)
    }
}

/// Functions from one component type to another.
///
/// Components are `[argument, result]`; only the result generator is used,
/// since results depend on arguments only through their hash.
#[derive(Clone, Default)]
pub struct FunctionGenerator {
    result: Option<SharedGenerator>,
}

impl FunctionGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(result: SharedGenerator) -> Self {
        Self {
            result: Some(result),
        }
    }
}

impl Generator for FunctionGenerator {
    type Output = FunctionValue;

    fn types(&self) -> Vec<TypeToken> {
        vec![FUNCTION]
    }

    /// # Panics
    ///
    /// Panics if no result generator has been supplied.
    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> FunctionValue {
        let Some(result) = &self.result else {
            panic!("FunctionGenerator used before its components were supplied");
        };
        FunctionValue::new(random.next_u64(), status.size(), Arc::clone(result))
    }

    fn can_shrink(&self, _larger: &FunctionValue) -> bool {
        false
    }

    fn can_register_as(&self, token: &TypeToken) -> bool {
        !token.is_any()
    }

    fn needed_components(&self) -> usize {
        2
    }

    fn add_components(&mut self, mut components: Vec<SharedGenerator>) {
        self.result = components.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::share;
    use crate::generators::IntegralGenerator;

    fn function(seed: u64) -> FunctionValue {
        let generator = FunctionGenerator::returning(share(IntegralGenerator::<i64>::new()));
        let mut random = RandomSource::new(seed);
        generator.generate(&mut random, &mut GenerationStatus::with_size(10))
    }

    #[test]
    fn test_equal_arguments_give_equal_results() {
        let f = function(1);
        let a = f.apply(&Value::new("hello".to_string()));
        let b = f.apply(&Value::new("hello".to_string()));
        assert_eq!(a, b);
        assert_eq!(f.memoized(), 1);

        f.apply(&Value::new("world".to_string()));
        assert_eq!(f.memoized(), 2);
    }

    #[test]
    fn test_results_are_reproducible_from_seed() {
        let first = function(9);
        let second = function(9);
        for argument in 0i32..20 {
            assert_eq!(
                first.apply(&Value::new(argument)),
                second.apply(&Value::new(argument))
            );
        }
    }

    #[test]
    fn test_different_arguments_usually_differ() {
        let f = function(3);
        let results: Vec<Value> = (0i32..20).map(|a| f.apply(&Value::new(a))).collect();
        let distinct = results
            .iter()
            .enumerate()
            .filter(|(i, r)| !results[..*i].contains(r))
            .count();
        assert!(distinct > 15);
    }

    #[test]
    fn test_clones_share_the_cache() {
        let f = function(4);
        let g = f.clone();
        f.apply(&Value::new(1u8));
        assert_eq!(g.memoized(), 1);
        assert_eq!(f, g);
    }

    #[test]
    #[should_panic(expected = "before its components were supplied")]
    fn test_unwired_function_generator_panics() {
        let mut random = RandomSource::new(1);
        FunctionGenerator::new().generate(&mut random, &mut GenerationStatus::new());
    }
}
