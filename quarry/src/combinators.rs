//! Functional generator combinators.
//!
//! [`Gen`] is the lightweight counterpart to [`Generator`]: anything that can
//! produce a value from a [`RandomSource`] and a [`GenerationStatus`]. Plain
//! closures are `Gen`s, and [`from_generator`] lifts a typed generator.

use std::marker::PhantomData;

use crate::descriptor::TypeToken;
use crate::generator::Generator;
use crate::random::RandomSource;
use crate::status::GenerationStatus;
use crate::value::Datum;
use crate::weighted::{Weighted, choose_weighted};

/// Boxed, thread-safe generator of `T`
pub struct BoxedGen<T>(Box<dyn Gen<Output = T> + Send + Sync>);

/// Produces values from randomness and generation status
pub trait Gen {
    type Output;

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> Self::Output;

    /// Transform each produced value; consumes no extra randomness
    fn map<U, F>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Output) -> U,
    {
        Map { inner: self, f }
    }

    /// Generate a value, use it to pick another generator, then generate from that
    fn flat_map<G, F>(self, f: F) -> FlatMap<Self, F>
    where
        Self: Sized,
        G: Gen,
        F: Fn(Self::Output) -> G,
    {
        FlatMap { inner: self, f }
    }

    /// Regenerate until `predicate` holds.
    ///
    /// The loop is unbounded; use a `GenerationContext` when the predicate
    /// may be nearly impossible to satisfy.
    fn filter<P>(self, predicate: P) -> Filter<Self, P>
    where
        Self: Sized,
        P: Fn(&Self::Output) -> bool,
    {
        Filter {
            inner: self,
            predicate,
        }
    }

    /// Fixed-length sequence of independent draws
    fn times(self, count: usize) -> Times<Self>
    where
        Self: Sized,
    {
        Times { inner: self, count }
    }

    fn boxed(self) -> BoxedGen<Self::Output>
    where
        Self: Sized + Send + Sync + 'static,
    {
        BoxedGen(Box::new(self))
    }
}

impl<F, T> Gen for F
where
    F: Fn(&mut RandomSource, &mut GenerationStatus) -> T,
{
    type Output = T;

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> T {
        self(random, status)
    }
}

impl<T> Gen for BoxedGen<T> {
    type Output = T;

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> T {
        self.0.generate(random, status)
    }
}

pub struct Map<G, F> {
    inner: G,
    f: F,
}

impl<G, F, U> Gen for Map<G, F>
where
    G: Gen,
    F: Fn(G::Output) -> U,
{
    type Output = U;

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> U {
        (self.f)(self.inner.generate(random, status))
    }
}

pub struct FlatMap<G, F> {
    inner: G,
    f: F,
}

impl<G, F, H> Gen for FlatMap<G, F>
where
    G: Gen,
    H: Gen,
    F: Fn(G::Output) -> H,
{
    type Output = H::Output;

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> H::Output {
        let first = self.inner.generate(random, status);
        (self.f)(first).generate(random, status)
    }
}

pub struct Filter<G, P> {
    inner: G,
    predicate: P,
}

impl<G, P> Gen for Filter<G, P>
where
    G: Gen,
    P: Fn(&G::Output) -> bool,
{
    type Output = G::Output;

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> G::Output {
        loop {
            let value = self.inner.generate(random, status);
            if (self.predicate)(&value) {
                return value;
            }
        }
    }
}

pub struct Times<G> {
    inner: G,
    count: usize,
}

impl<G: Gen> Gen for Times<G> {
    type Output = Vec<G::Output>;

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> Self::Output {
        (0..self.count)
            .map(|_| self.inner.generate(random, status))
            .collect()
    }
}

/// Uniform choice among fixed values
pub struct OneOfValues<T> {
    values: Vec<T>,
}

impl<T: Clone> Gen for OneOfValues<T> {
    type Output = T;

    fn generate(&self, random: &mut RandomSource, _status: &mut GenerationStatus) -> T {
        random.choose(&self.values).clone()
    }
}

/// Choose uniformly among values.
///
/// # Panics
///
/// Panics if `values` is empty.
pub fn one_of_values<T: Clone>(values: Vec<T>) -> OneOfValues<T> {
    assert!(!values.is_empty(), "one_of_values requires at least one value");
    OneOfValues { values }
}

/// Weighted choice among sub-generators
pub struct Frequency<T> {
    choices: Vec<Weighted<BoxedGen<T>>>,
}

impl<T> Gen for Frequency<T> {
    type Output = T;

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> T {
        choose_weighted(random, &self.choices).generate(random, status)
    }
}

/// Choose uniformly among generators.
///
/// # Panics
///
/// Panics if `generators` is empty.
pub fn one_of<T>(generators: Vec<BoxedGen<T>>) -> Frequency<T> {
    frequency(generators.into_iter().map(Weighted::unit).collect())
}

/// Choose among generators with probability proportional to weight.
///
/// # Panics
///
/// Panics if `choices` is empty.
pub fn frequency<T>(choices: Vec<Weighted<BoxedGen<T>>>) -> Frequency<T> {
    assert!(!choices.is_empty(), "frequency requires at least one generator");
    Frequency { choices }
}

/// Weighted choice among fixed values
pub fn frequency_of_values<T>(choices: Vec<Weighted<T>>) -> impl Gen<Output = T>
where
    T: Clone,
{
    assert!(!choices.is_empty(), "frequency requires at least one value");
    move |random: &mut RandomSource, _status: &mut GenerationStatus| {
        choose_weighted(random, &choices).clone()
    }
}

/// A typed [`Generator`] viewed as a [`Gen`]
pub struct FromGenerator<G> {
    generator: G,
}

impl<G: Generator> Gen for FromGenerator<G> {
    type Output = G::Output;

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> G::Output {
        self.generator.generate(random, status)
    }
}

pub fn from_generator<G: Generator>(generator: G) -> FromGenerator<G> {
    FromGenerator { generator }
}

/// A [`Gen`] registered under explicit type tokens.
///
/// Values produced this way cannot be shrunk.
pub struct GenGenerator<G, T> {
    gen_: G,
    types: Vec<TypeToken>,
    _marker: PhantomData<fn() -> T>,
}

impl<G, T> GenGenerator<G, T>
where
    G: Gen<Output = T>,
{
    pub fn new(types: Vec<TypeToken>, gen_: G) -> Self {
        Self {
            gen_,
            types,
            _marker: PhantomData,
        }
    }
}

impl<G, T> Generator for GenGenerator<G, T>
where
    G: Gen<Output = T> + Send + Sync + 'static,
    T: Datum + Clone,
{
    type Output = T;

    fn types(&self) -> Vec<TypeToken> {
        self.types.clone()
    }

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> T {
        self.gen_.generate(random, status)
    }

    fn can_shrink(&self, _larger: &T) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digit() -> impl Gen<Output = i64> {
        |random: &mut RandomSource, _: &mut GenerationStatus| random.next_i64(0, 9)
    }

    #[test]
    fn test_map_consumes_no_extra_randomness() {
        let mut plain_random = RandomSource::new(5);
        let mut mapped_random = RandomSource::new(5);
        let mut status = GenerationStatus::new();

        let plain: Vec<i64> = (0..20)
            .map(|_| digit().generate(&mut plain_random, &mut status))
            .collect();
        let mapped: Vec<i64> = (0..20)
            .map(|_| digit().map(|d| d * 10).generate(&mut mapped_random, &mut status))
            .collect();

        let expected: Vec<i64> = plain.iter().map(|d| d * 10).collect();
        assert_eq!(mapped, expected);
    }

    #[test]
    fn test_flat_map_draws_in_order() {
        let lengths = digit().flat_map(|n| digit().times(n as usize));
        let mut random = RandomSource::new(17);
        let mut status = GenerationStatus::new();

        let mut replay = RandomSource::new(17);
        let expected_len = replay.next_i64(0, 9) as usize;

        let values = lengths.generate(&mut random, &mut status);
        assert_eq!(values.len(), expected_len);
        assert!(values.iter().all(|d| (0..=9).contains(d)));
    }

    #[test]
    fn test_filter_only_yields_matching_values() {
        let evens = digit().filter(|d| d % 2 == 0);
        let mut random = RandomSource::new(3);
        let mut status = GenerationStatus::new();
        for _ in 0..100 {
            assert_eq!(evens.generate(&mut random, &mut status) % 2, 0);
        }
    }

    #[test]
    fn test_times_produces_exact_length() {
        let mut random = RandomSource::new(3);
        let mut status = GenerationStatus::new();
        assert_eq!(digit().times(0).generate(&mut random, &mut status), Vec::<i64>::new());
        assert_eq!(digit().times(12).generate(&mut random, &mut status).len(), 12);
    }

    #[test]
    fn test_one_of_values_and_frequency() {
        let mut random = RandomSource::new(9);
        let mut status = GenerationStatus::new();

        let colours = one_of_values(vec!["red", "green"]);
        for _ in 0..20 {
            let colour = colours.generate(&mut random, &mut status);
            assert!(colour == "red" || colour == "green");
        }

        let biased = frequency(vec![
            Weighted::new(
                (|_: &mut RandomSource, _: &mut GenerationStatus| 'a').boxed(),
                1,
            )
            .unwrap(),
            Weighted::new(
                (|_: &mut RandomSource, _: &mut GenerationStatus| 'b').boxed(),
                9,
            )
            .unwrap(),
        ]);
        let bs = (0..10_000)
            .filter(|_| biased.generate(&mut random, &mut status) == 'b')
            .count();
        assert!((8700..=9300).contains(&bs), "b drawn {} times", bs);
    }

    #[test]
    fn test_frequency_of_values() {
        let mut random = RandomSource::new(9);
        let mut status = GenerationStatus::new();
        let only = frequency_of_values(vec![Weighted::new(7u8, 4).unwrap()]);
        assert_eq!(only.generate(&mut random, &mut status), 7);
    }

    #[test]
    #[should_panic(expected = "requires at least one")]
    fn test_one_of_empty_panics() {
        one_of::<u8>(Vec::new());
    }

    #[test]
    fn test_gen_generator_is_not_shrinkable() {
        let generator = GenGenerator::new(vec![TypeToken::new("Digit")], digit());
        let mut random = RandomSource::new(1);
        let mut status = GenerationStatus::new();
        let value = generator.generate(&mut random, &mut status);
        assert!((0..=9).contains(&value));
        assert!(!generator.can_shrink(&value));
        assert_eq!(generator.types(), vec![TypeToken::new("Digit")]);
    }
}
