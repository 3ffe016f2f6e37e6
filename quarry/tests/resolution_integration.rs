//! Integration tests for type resolution through the repository
//!
//! Covers composition of every applicable generator, configuration
//! application and component wiring across the reference generators.

use std::collections::HashSet;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use quarry::generators::MapGenerator;
use quarry::{
    Configuration, ConfigurationError, Directive, DirectiveKind, Error, GenerationStatus,
    Generator, RandomSource, RepositoryBuilder, ResolutionError, TypeDescriptor, TypeToken,
    Value,
};

/// Produces its own name so draws can be attributed
struct Tagged {
    token: &'static str,
}

impl Generator for Tagged {
    type Output = &'static str;

    fn types(&self) -> Vec<TypeToken> {
        vec![TypeToken::new(self.token)]
    }

    fn generate(&self, _random: &mut RandomSource, _status: &mut GenerationStatus) -> &'static str {
        self.token
    }
}

fn number_repository() -> quarry::GeneratorRepository {
    RepositoryBuilder::new()
        .declare("Integer", "Number")
        .declare("Long", "Number")
        .declare("Double", "Number")
        .register(|| Tagged { token: "Integer" })
        .register(|| Tagged { token: "Long" })
        .register(|| Tagged { token: "Double" })
        .build()
}

fn tally(values: impl IntoIterator<Item = Value>) -> [usize; 3] {
    let mut counts = [0usize; 3];
    for value in values {
        let index = match *value.downcast_ref::<&'static str>().unwrap() {
            "Integer" => 0,
            "Long" => 1,
            "Double" => 2,
            other => panic!("unexpected tag {}", other),
        };
        counts[index] += 1;
    }
    counts
}

#[test]
fn test_three_number_generators_are_chosen_evenly() {
    let repository = number_repository();
    let number = TypeDescriptor::exact("Number");
    let mut random = RandomSource::new(9000);
    let mut status = GenerationStatus::new();

    let draws = (0..9000).map(|_| {
        let generator = repository.resolve(&number).unwrap();
        generator.generate(&mut random, &mut status)
    });
    let counts = tally(draws.collect::<Vec<_>>());

    for count in counts {
        assert!(
            (2850..=3150).contains(&count),
            "counts {:?} stray more than 5% from 3000",
            counts
        );
    }
}

#[test]
fn test_number_selection_passes_chi_squared() {
    let repository = number_repository();
    let generator = repository.resolve(&TypeDescriptor::exact("Number")).unwrap();
    let mut random = RandomSource::new(31337);
    let mut status = GenerationStatus::new();

    let draws = 12_000;
    let counts = tally((0..draws).map(|_| generator.generate(&mut random, &mut status)));
    let expected = draws as f64 / 3.0;
    let chi_squared: f64 = counts
        .iter()
        .map(|&observed| (observed as f64 - expected).powi(2) / expected)
        .sum();

    // two degrees of freedom, p = 0.001
    assert!(chi_squared < 13.82, "chi-squared {} for {:?}", chi_squared, counts);
}

#[test]
fn test_exact_request_picks_single_generator() {
    let repository = number_repository();
    let generator = repository.resolve(&TypeDescriptor::exact("Long")).unwrap();
    let mut random = RandomSource::new(1);
    let mut status = GenerationStatus::new();
    for _ in 0..50 {
        let value = generator.generate(&mut random, &mut status);
        assert_eq!(value.downcast_ref::<&'static str>(), Some(&"Long"));
    }
}

#[test]
fn test_unknown_type_names_the_request() {
    let repository = number_repository();
    let error = repository
        .resolve(&TypeDescriptor::exact("Widget"))
        .unwrap_err();
    assert_eq!(
        error,
        ResolutionError::no_generator(&TypeDescriptor::exact("Widget"))
    );
    assert!(error.to_string().contains("Widget"));
}

#[test]
fn test_range_directive_bounds_default_integers() {
    let repository = RepositoryBuilder::with_defaults().build();
    let configuration = Configuration::new().strict(Directive::in_range(-3, 3));
    let generator = repository
        .generator_for(&TypeDescriptor::exact("Integer"), &configuration)
        .unwrap();

    let mut random = RandomSource::new(77);
    let mut status = GenerationStatus::with_size(10);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..500 {
        let value = generator.generate(&mut random, &mut status);
        let n = *value.downcast_ref::<i32>().unwrap();
        assert!((-3..=3).contains(&n));
        seen.insert(n);
    }
    assert_eq!(seen.len(), 7);
}

/// Numeric value of any default `Number`, or `None` for a byte
fn number_value(value: &Value) -> Option<f64> {
    if let Some(n) = value.downcast_ref::<i16>() {
        Some(f64::from(*n))
    } else if let Some(n) = value.downcast_ref::<i32>() {
        Some(f64::from(*n))
    } else if let Some(n) = value.downcast_ref::<i64>() {
        n.to_f64()
    } else if let Some(n) = value.downcast_ref::<i128>() {
        n.to_f64()
    } else if let Some(n) = value.downcast_ref::<BigInt>() {
        n.to_f64()
    } else if let Some(n) = value.downcast_ref::<f32>() {
        Some(f64::from(*n))
    } else {
        value.downcast_ref::<f64>().copied()
    }
}

#[test]
fn test_range_beyond_one_number_type_drops_only_that_type() {
    let repository = RepositoryBuilder::with_defaults().build();
    let number = TypeDescriptor::exact("Number");

    for configuration in [
        Configuration::new().strict(Directive::in_range(0, 1000)),
        Configuration::new().lenient(Directive::in_range(0, 1000)),
    ] {
        let generator = repository.generator_for(&number, &configuration).unwrap();
        assert!(!generator.types().contains(&TypeToken::new("Byte")));

        let mut random = RandomSource::new(1000);
        let mut status = GenerationStatus::with_size(30);
        let mut kinds = HashSet::new();
        for _ in 0..2000 {
            let value = generator.generate(&mut random, &mut status);
            assert!(!value.is::<i8>(), "byte drawn: {:?}", value);
            let n = number_value(&value).unwrap();
            assert!((0.0..=1000.0).contains(&n), "{:?} out of range", value);
            kinds.insert(value.type_name());
        }
        // Short, Integer, Long, Int128, BigInteger, Float and Double
        assert_eq!(kinds.len(), 7, "{:?}", kinds);
    }
}

#[test]
fn test_range_beyond_only_candidate_is_reported() {
    let repository = RepositoryBuilder::with_defaults().build();
    let configuration = Configuration::new().strict(Directive::in_range(0, 1000));
    let result = repository.generator_for(&TypeDescriptor::exact("Byte"), &configuration);
    assert!(matches!(
        result,
        Err(Error::Configuration(ConfigurationError::OutOfDomain {
            kind: DirectiveKind::InRange,
            ..
        }))
    ));
}

#[test]
fn test_precision_reaches_only_floating_candidates() {
    let repository = RepositoryBuilder::with_defaults().build();
    let configuration = Configuration::new()
        .strict(Directive::in_range(-5, 5))
        .strict(Directive::Precision { scale: 2 });
    let generator = repository
        .generator_for(&TypeDescriptor::exact("Number"), &configuration)
        .unwrap();
    assert_eq!(
        generator.types(),
        vec![TypeToken::new("Float"), TypeToken::new("Double")]
    );

    let mut random = RandomSource::new(5);
    let mut status = GenerationStatus::new();
    for _ in 0..300 {
        let value = generator.generate(&mut random, &mut status);
        let n = number_value(&value).unwrap();
        let hundredths = n * 100.0;
        assert!((hundredths - hundredths.round()).abs() < 1e-2, "{:?}", value);
        assert!((-5.0..=5.0).contains(&n));
    }
}

#[test]
fn test_single_point_range_always_yields_that_point() {
    let repository = RepositoryBuilder::with_defaults().build();
    let configuration = Configuration::new().strict(Directive::in_range(42, 42));
    let generator = repository
        .generator_for(&TypeDescriptor::exact("Long"), &configuration)
        .unwrap();

    let mut random = RandomSource::new(3);
    let mut status = GenerationStatus::new();
    for _ in 0..100 {
        let value = generator.generate(&mut random, &mut status);
        assert_eq!(value.downcast_ref::<i64>(), Some(&42));
    }
}

#[test]
fn test_inverted_range_fails_before_generation() {
    let repository = RepositoryBuilder::with_defaults().build();
    let configuration = Configuration::new().lenient(Directive::in_range(10, 1));
    let result = repository.generator_for(&TypeDescriptor::exact("Integer"), &configuration);
    assert!(matches!(
        result,
        Err(Error::Configuration(ConfigurationError::Range {
            kind: DirectiveKind::InRange,
            ..
        }))
    ));
}

#[test]
fn test_strict_directive_rejected_by_unsupporting_generator() {
    let repository = RepositoryBuilder::with_defaults().build();
    let configuration = Configuration::new().strict(Directive::in_range(0, 1));
    let result = repository.generator_for(&TypeDescriptor::exact("Boolean"), &configuration);
    assert!(matches!(
        result,
        Err(Error::Configuration(ConfigurationError::Unsupported {
            kind: DirectiveKind::InRange,
            ..
        }))
    ));
}

#[test]
fn test_lenient_directive_is_skipped_by_unsupporting_generator() {
    let repository = RepositoryBuilder::with_defaults().build();
    let configuration = Configuration::new().lenient(Directive::in_range(0, 1));
    let generator = repository
        .generator_for(&TypeDescriptor::exact("Boolean"), &configuration)
        .unwrap();
    let value = generator.generate(&mut RandomSource::new(8), &mut GenerationStatus::new());
    assert!(value.is::<bool>());
}

#[test]
fn test_list_of_integers_respects_size_directive() {
    let repository = RepositoryBuilder::with_defaults().build();
    let descriptor = TypeDescriptor::exact("List").with_param("Integer");
    let configuration = Configuration::new().strict(Directive::size(2, 4));
    let generator = repository.generator_for(&descriptor, &configuration).unwrap();

    let mut random = RandomSource::new(12);
    let mut status = GenerationStatus::with_size(20);
    for _ in 0..100 {
        let value = generator.generate(&mut random, &mut status);
        let elements = value.downcast_ref::<Vec<Value>>().unwrap();
        assert!((2..=4).contains(&elements.len()));
        assert!(elements.iter().all(|element| element.is::<i32>()));
    }
}

#[test]
fn test_string_keyed_map_rejects_integer_keys() {
    let repository = RepositoryBuilder::new()
        .declare("StringMap", "Map")
        .register(MapGenerator::string_keyed)
        .register(|| Tagged { token: "Integer" })
        .register(|| Tagged { token: "String" })
        .build();

    let integer_keys = TypeDescriptor::exact("StringMap").with_params(["Integer", "Integer"]);
    assert_eq!(
        repository.resolve(&integer_keys).unwrap_err(),
        ResolutionError::no_generator(&integer_keys)
    );

    let string_keys = TypeDescriptor::exact("StringMap").with_params(["String", "Integer"]);
    assert!(repository.resolve(&string_keys).is_ok());
}

#[test]
fn test_general_map_request_drops_string_keyed_candidate_for_integer_keys() {
    let repository = RepositoryBuilder::with_defaults().build();
    let descriptor = TypeDescriptor::exact("Map").with_params(["Integer", "Boolean"]);
    let generator = repository.resolve(&descriptor).unwrap();

    let mut random = RandomSource::new(21);
    let mut status = GenerationStatus::with_size(8);
    for _ in 0..50 {
        let value = generator.generate(&mut random, &mut status);
        let entries = value.downcast_ref::<Vec<(Value, Value)>>().unwrap();
        for (key, entry) in entries {
            assert!(key.is::<i32>());
            assert!(entry.is::<bool>());
        }
    }
}

#[test]
fn test_missing_component_is_reported_through_container() {
    let repository = RepositoryBuilder::with_defaults().build();
    let descriptor = TypeDescriptor::exact("List").with_param("Widget");
    let error = repository.resolve(&descriptor).unwrap_err();
    assert!(matches!(error, ResolutionError::Component { .. }));
    assert_eq!(
        error.root_cause(),
        Some(&TypeDescriptor::exact("Widget"))
    );
}
