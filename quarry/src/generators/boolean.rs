//! Booleans, shrinking toward `false`.

use crate::descriptor::TypeToken;
use crate::generator::Generator;
use crate::random::RandomSource;
use crate::status::GenerationStatus;

use super::BOOLEAN;

/// Fair coin; `true` shrinks to `false`
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanGenerator;

impl Generator for BooleanGenerator {
    type Output = bool;

    fn types(&self) -> Vec<TypeToken> {
        vec![BOOLEAN]
    }

    fn generate(&self, random: &mut RandomSource, _status: &mut GenerationStatus) -> bool {
        random.next_bool()
    }

    fn can_shrink(&self, larger: &bool) -> bool {
        *larger
    }

    fn shrink(&self, _random: &mut RandomSource, _larger: &bool) -> Vec<bool> {
        vec![false]
    }

    fn magnitude(&self, value: &bool) -> f64 {
        if *value { 1.0 } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_generator() {
        let generator = BooleanGenerator;
        let mut random = RandomSource::new(3);
        let mut status = GenerationStatus::new();

        let trues = (0..1000)
            .filter(|_| generator.generate(&mut random, &mut status))
            .count();
        assert!((400..=600).contains(&trues));

        assert!(generator.can_shrink(&true));
        assert!(!generator.can_shrink(&false));
        assert_eq!(generator.shrink(&mut random, &true), vec![false]);
    }
}
