//! Seeded source of randomness shared by every generator in a session.
//!
//! All sampling in the engine (generation, weighted choice, distributions and
//! shrink candidate selection) routes through one [`RandomSource`], so a whole
//! generation/shrink session can be replayed from its seed.

use std::fmt;

use num_bigint::{BigInt, RandBigInt};
use rand::distributions::uniform::SampleUniform;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::error::RangeError;

/// Validate that `min <= max`, for callers that want to reject bounds before
/// any value is drawn.
pub fn check_range<T: PartialOrd + fmt::Display>(min: &T, max: &T) -> Result<(), RangeError> {
    if min > max {
        Err(RangeError::new(min, max))
    } else {
        Ok(())
    }
}

/// Deterministic pseudo-random number source
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
    seed: u64,
}

impl RandomSource {
    /// Create a source from an explicit seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a source from OS entropy.
    ///
    /// The drawn seed is kept so failures can still be reported with it.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Seed this source was last (re)seeded with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the stream from a new seed
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.seed = seed;
    }

    /// Derive an independent child source whose seed is drawn from this stream
    pub fn fork(&mut self) -> Self {
        Self::new(self.rng.next_u64())
    }

    pub fn next_bool(&mut self) -> bool {
        self.rng.r#gen()
    }

    /// Uniform draw from `[0, 1)`
    pub fn next_unit(&mut self) -> f64 {
        self.rng.r#gen()
    }

    pub fn next_bytes(&mut self, count: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; count];
        self.rng.fill_bytes(&mut bytes);
        bytes
    }

    /// Uniform draw from the inclusive range `[min, max]`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn next_in<T>(&mut self, min: T, max: T) -> T
    where
        T: SampleUniform + PartialOrd + Copy + fmt::Debug,
    {
        assert!(min <= max, "invalid range: min {:?} is greater than max {:?}", min, max);
        self.rng.gen_range(min..=max)
    }

    pub fn next_i8(&mut self, min: i8, max: i8) -> i8 {
        self.next_in(min, max)
    }

    pub fn next_i16(&mut self, min: i16, max: i16) -> i16 {
        self.next_in(min, max)
    }

    pub fn next_i32(&mut self, min: i32, max: i32) -> i32 {
        self.next_in(min, max)
    }

    pub fn next_i64(&mut self, min: i64, max: i64) -> i64 {
        self.next_in(min, max)
    }

    pub fn next_i128(&mut self, min: i128, max: i128) -> i128 {
        self.next_in(min, max)
    }

    pub fn next_usize(&mut self, min: usize, max: usize) -> usize {
        self.next_in(min, max)
    }

    /// Uniform draw from `[min, max)`; returns `min` when the bounds are equal.
    ///
    /// # Panics
    ///
    /// Panics if `min > max` or either bound is NaN.
    pub fn next_f64(&mut self, min: f64, max: f64) -> f64 {
        assert!(min <= max, "invalid range: min {} is greater than max {}", min, max);
        if min == max {
            return min;
        }
        let value = min + (max - min) * self.next_unit();
        // rounding can land exactly on max for wide ranges
        if value >= max { min } else { value }
    }

    pub fn next_f32(&mut self, min: f32, max: f32) -> f32 {
        assert!(min <= max, "invalid range: min {} is greater than max {}", min, max);
        if min == max {
            return min;
        }
        let value = min + (max - min) * self.rng.r#gen::<f32>();
        if value >= max { min } else { value }
    }

    /// Uniform draw over the Unicode scalar values in `[min, max]`
    pub fn next_char(&mut self, min: char, max: char) -> char {
        self.next_in(min, max)
    }

    /// Uniform draw from the inclusive arbitrary-precision range `[min, max]`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn next_big_int(&mut self, min: &BigInt, max: &BigInt) -> BigInt {
        assert!(min <= max, "invalid range: min {} is greater than max {}", min, max);
        if min == max {
            return min.clone();
        }
        let upper = max + 1u32;
        self.rng.gen_bigint_range(min, &upper)
    }

    /// Uniform non-negative integer with at most `bits` bits
    pub fn next_big_int_bits(&mut self, bits: u64) -> BigInt {
        BigInt::from(self.rng.gen_biguint(bits))
    }

    /// Standard normal draw (Box-Muller)
    pub fn next_gaussian(&mut self) -> f64 {
        let u1 = 1.0 - self.next_unit();
        let u2 = self.next_unit();
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }

    /// Pick one element uniformly.
    ///
    /// # Panics
    ///
    /// Panics if `items` is empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "cannot choose from an empty slice");
        &items[self.next_usize(0, items.len() - 1)]
    }
}

impl RngCore for RandomSource {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
