//! Items paired with positive selection weights.

use crate::error::WeightError;
use crate::random::RandomSource;

/// An item with a positive selection weight
#[derive(Debug, Clone, PartialEq)]
pub struct Weighted<T> {
    item: T,
    weight: u32,
}

impl<T> Weighted<T> {
    /// Pair an item with a weight; zero weights are rejected
    pub fn new(item: T, weight: u32) -> Result<Self, WeightError> {
        if weight == 0 {
            return Err(WeightError { weight });
        }
        Ok(Self { item, weight })
    }

    /// Weight of one, for uniform choices
    pub fn unit(item: T) -> Self {
        Self { item, weight: 1 }
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn into_item(self) -> T {
        self.item
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Weighted<U> {
        Weighted {
            item: f(self.item),
            weight: self.weight,
        }
    }
}

/// Pick an item with probability `weight / total_weight`.
///
/// Draws a single integer in `[0, total - 1]` and walks the cumulative
/// weights.
///
/// # Panics
///
/// Panics if `choices` is empty.
pub fn choose_weighted<'a, T>(random: &mut RandomSource, choices: &'a [Weighted<T>]) -> &'a T {
    assert!(!choices.is_empty(), "cannot choose from no weighted items");
    let total: u64 = choices.iter().map(|choice| u64::from(choice.weight)).sum();
    let mut sample = random.next_in(0, total - 1);

    for choice in choices {
        let weight = u64::from(choice.weight);
        if sample < weight {
            return &choice.item;
        }
        sample -= weight;
    }

    unreachable!("sample is below the total weight")
}
