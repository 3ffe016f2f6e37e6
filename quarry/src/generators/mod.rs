//! Reference generators for common value shapes.
//!
//! These are ordinary clients of the engine: each implements
//! [`Generator`](crate::generator::Generator) and is registered through
//! [`register_defaults`], together with the type hierarchy they resolve
//! against.

mod big_integer;
mod boolean;
mod floating;
mod function;
mod integral;
mod list;
mod map;
mod string;

pub use big_integer::BigIntegerGenerator;
pub use boolean::BooleanGenerator;
pub use floating::{Floating, FloatingGenerator};
pub use function::{FunctionGenerator, FunctionValue};
pub use integral::{Integral, IntegralGenerator};
pub use list::ListGenerator;
pub use map::MapGenerator;
pub use string::StringGenerator;

use crate::descriptor::TypeToken;
use crate::distribution::{GeometricDistribution, Probability};
use crate::random::RandomSource;
use crate::repository::RepositoryBuilder;
use crate::status::GenerationStatus;

pub const NUMBER: TypeToken = TypeToken::new("Number");
pub const COMPARABLE: TypeToken = TypeToken::new("Comparable");
pub const BOOLEAN: TypeToken = TypeToken::new("Boolean");
pub const BIG_INTEGER: TypeToken = TypeToken::new("BigInteger");
pub const STRING: TypeToken = TypeToken::new("String");
pub const CHAR_SEQUENCE: TypeToken = TypeToken::new("CharSequence");
pub const LIST: TypeToken = TypeToken::new("List");
pub const COLLECTION: TypeToken = TypeToken::new("Collection");
pub const MAP: TypeToken = TypeToken::new("Map");
pub const STRING_MAP: TypeToken = TypeToken::new("StringMap");
pub const FUNCTION: TypeToken = TypeToken::new("Function");

/// Register every reference generator and the hierarchy they live in
pub fn register_defaults(builder: RepositoryBuilder) -> RepositoryBuilder {
    let mut builder = builder;
    for token in [
        i8::TOKEN,
        i16::TOKEN,
        i32::TOKEN,
        i64::TOKEN,
        i128::TOKEN,
        BIG_INTEGER,
        f32::TOKEN,
        f64::TOKEN,
    ] {
        builder = builder
            .declare(token.clone(), NUMBER)
            .declare(token, COMPARABLE);
    }

    builder
        .declare(BOOLEAN, COMPARABLE)
        .declare(STRING, CHAR_SEQUENCE)
        .declare(STRING, COMPARABLE)
        .declare(LIST, COLLECTION)
        .declare(STRING_MAP, MAP)
        .register(IntegralGenerator::<i8>::new)
        .register(IntegralGenerator::<i16>::new)
        .register(IntegralGenerator::<i32>::new)
        .register(IntegralGenerator::<i64>::new)
        .register(IntegralGenerator::<i128>::new)
        .register(BigIntegerGenerator::new)
        .register(FloatingGenerator::<f32>::new)
        .register(FloatingGenerator::<f64>::new)
        .register(|| BooleanGenerator)
        .register(StringGenerator::new)
        .register(ListGenerator::new)
        .register(MapGenerator::new)
        .register(MapGenerator::string_keyed)
        .register(FunctionGenerator::new)
}

/// Collection length: uniform within `[min, max]` when a maximum is set,
/// otherwise `min` plus a geometric draw averaging the status size
pub(crate) fn draw_length(
    min: usize,
    max: Option<usize>,
    random: &mut RandomSource,
    status: &GenerationStatus,
) -> usize {
    match max {
        Some(max) => random.next_usize(min, max),
        None => {
            let extra = GeometricDistribution::new()
                .sample_probability(Probability::for_count(status.size()), random);
            min.saturating_add(usize::try_from(extra).unwrap_or(usize::MAX))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;

    #[test]
    fn test_defaults_resolve_common_types() {
        let repository = RepositoryBuilder::with_defaults().build();
        for name in [
            "Integer", "Long", "Double", "Float", "Boolean", "String", "BigInteger", "Number",
        ] {
            assert!(
                repository.resolve(&TypeDescriptor::exact(name)).is_ok(),
                "{} did not resolve",
                name
            );
        }
        let list_of_strings = TypeDescriptor::exact("List").with_param("String");
        assert!(repository.resolve(&list_of_strings).is_ok());
    }

    #[test]
    fn test_draw_length_respects_bounds() {
        let mut random = RandomSource::new(8);
        let status = GenerationStatus::with_size(0);
        for _ in 0..100 {
            let bounded = draw_length(2, Some(4), &mut random, &status);
            assert!((2..=4).contains(&bounded));
            // size zero means no extra elements
            assert_eq!(draw_length(3, None, &mut random, &status), 3);
        }
    }
}
