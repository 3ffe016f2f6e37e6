//! Variable-length lists over one element generator.

use crate::descriptor::TypeToken;
use crate::directive::{Directive, DirectiveKind, resolve_bounds};
use crate::error::ConfigurationError;
use crate::generator::{Generator, SharedGenerator};
use crate::random::RandomSource;
use crate::status::GenerationStatus;
use crate::value::Value;

use super::{LIST, draw_length};

/// Lists of values from one element generator.
///
/// Supports the size and distinct directives. Distinct lists give up on
/// reaching the drawn length after ten draws per element, so they may come
/// out shorter when the element space is small.
#[derive(Clone, Default)]
pub struct ListGenerator {
    element: Option<SharedGenerator>,
    min_size: usize,
    max_size: Option<usize>,
    distinct: bool,
}

impl ListGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build directly around an element generator, outside any repository
    pub fn of(element: SharedGenerator) -> Self {
        Self {
            element: Some(element),
            ..Self::default()
        }
    }

    fn is_distinct(&self, values: &[Value]) -> bool {
        values
            .iter()
            .enumerate()
            .all(|(i, value)| !values[..i].contains(value))
    }
}

impl Generator for ListGenerator {
    type Output = Vec<Value>;

    fn types(&self) -> Vec<TypeToken> {
        vec![LIST]
    }

    /// # Panics
    ///
    /// Panics if no element generator has been supplied.
    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> Vec<Value> {
        let Some(element) = &self.element else {
            panic!("ListGenerator used before its components were supplied");
        };
        let length = draw_length(self.min_size, self.max_size, random, status);

        if !self.distinct {
            return (0..length)
                .map(|_| element.generate(random, status))
                .collect();
        }

        let mut values: Vec<Value> = Vec::with_capacity(length);
        let mut draws = 0;
        while values.len() < length && draws < length.saturating_mul(10) {
            let value = element.generate(random, status);
            if !values.contains(&value) {
                values.push(value);
            }
            draws += 1;
        }
        values
    }

    fn can_shrink(&self, larger: &Vec<Value>) -> bool {
        larger.len() > self.min_size
            || self
                .element
                .as_ref()
                .is_some_and(|element| larger.iter().any(|value| element.can_shrink(value)))
    }

    fn shrink(&self, random: &mut RandomSource, larger: &Vec<Value>) -> Vec<Vec<Value>> {
        let mut candidates = Vec::new();

        if larger.len() > self.min_size {
            // Shorter prefixes
            for length in (self.min_size..larger.len()).rev() {
                candidates.push(larger[..length].to_vec());
            }
            // Each element removed
            for i in 0..larger.len() {
                let mut without = larger.clone();
                without.remove(i);
                candidates.push(without);
            }
        }

        // Each element replaced by one of its own shrinks
        if let Some(element) = &self.element {
            for (i, value) in larger.iter().enumerate() {
                if !element.can_shrink(value) {
                    continue;
                }
                for smaller in element.shrink(random, value) {
                    let mut replaced = larger.clone();
                    replaced[i] = smaller;
                    if !self.distinct || self.is_distinct(&replaced) {
                        candidates.push(replaced);
                    }
                }
            }
        }

        candidates
    }

    fn magnitude(&self, value: &Vec<Value>) -> f64 {
        let elements: f64 = match &self.element {
            Some(element) => value.iter().map(|v| element.magnitude(v)).sum(),
            None => 0.0,
        };
        value.len() as f64 + elements
    }

    fn can_register_as(&self, token: &TypeToken) -> bool {
        !token.is_any()
    }

    fn needed_components(&self) -> usize {
        1
    }

    fn add_components(&mut self, mut components: Vec<SharedGenerator>) {
        self.element = components.pop();
    }

    fn supports(&self, kind: &DirectiveKind) -> bool {
        matches!(kind, DirectiveKind::Size | DirectiveKind::Distinct)
    }

    fn configure(&mut self, directive: &Directive) -> Result<(), ConfigurationError> {
        match directive {
            Directive::Size { min, max } => {
                let (low, high) = resolve_bounds(*min, *max, 0, usize::MAX)
                    .map_err(|source| ConfigurationError::range(DirectiveKind::Size, source))?;
                self.min_size = low;
                self.max_size = max.map(|_| high);
            }
            Directive::Distinct => self.distinct = true,
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::share;
    use crate::generators::IntegralGenerator;

    fn digits() -> ListGenerator {
        ListGenerator::of(share(IntegralGenerator::in_range(0i64, 9).unwrap()))
    }

    fn list(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::new).collect()
    }

    #[test]
    #[should_panic(expected = "before its components were supplied")]
    fn test_unwired_list_generator_panics() {
        ListGenerator::new().generate(&mut RandomSource::new(1), &mut GenerationStatus::new());
    }

    #[test]
    fn test_size_directive_bounds_length() {
        let mut generator = digits();
        generator.configure(&Directive::size(3, 5)).unwrap();
        let mut random = RandomSource::new(40);
        let mut status = GenerationStatus::with_size(100);
        for _ in 0..200 {
            let len = generator.generate(&mut random, &mut status).len();
            assert!((3..=5).contains(&len));
        }
    }

    #[test]
    fn test_length_follows_status_size() {
        let generator = digits();
        let mut random = RandomSource::new(40);
        let mut empty = GenerationStatus::with_size(0);
        assert!(generator.generate(&mut random, &mut empty).is_empty());

        let mut big = GenerationStatus::with_size(20);
        let total: usize = (0..500)
            .map(|_| generator.generate(&mut random, &mut big).len())
            .sum();
        let mean = total as f64 / 500.0;
        assert!((15.0..25.0).contains(&mean), "mean length {}", mean);
    }

    #[test]
    fn test_distinct_lists_have_no_duplicates() {
        let mut generator = digits();
        generator.configure(&Directive::Distinct).unwrap();
        generator.configure(&Directive::size(5, 8)).unwrap();
        let mut random = RandomSource::new(41);
        let mut status = GenerationStatus::new();
        for _ in 0..100 {
            let values = generator.generate(&mut random, &mut status);
            assert!(generator.is_distinct(&values));
        }
    }

    #[test]
    fn test_shrink_removes_and_shrinks_elements() {
        let generator = digits();
        let mut random = RandomSource::new(1);
        let candidates = generator.shrink(&mut random, &list(&[4, 0]));
        assert!(candidates.contains(&list(&[4])));
        assert!(candidates.contains(&list(&[])));
        assert!(candidates.contains(&list(&[0])));
        assert!(candidates.contains(&list(&[2, 0])));
        assert!(!generator.can_shrink(&list(&[])));
    }
}
