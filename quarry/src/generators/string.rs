//! Strings over a configurable character range.

use crate::descriptor::TypeToken;
use crate::directive::{Directive, DirectiveKind, resolve_bounds};
use crate::error::{ConfigurationError, RangeError};
use crate::generator::Generator;
use crate::random::{RandomSource, check_range};
use crate::status::GenerationStatus;

use super::{STRING, draw_length};

/// Strings over an inclusive character range, printable ASCII by default.
///
/// Lengths follow the status size unless a size directive bounds them.
#[derive(Debug, Clone, PartialEq)]
pub struct StringGenerator {
    lowest: char,
    highest: char,
    min_length: usize,
    max_length: Option<usize>,
}

impl StringGenerator {
    pub fn new() -> Self {
        Self {
            lowest: ' ',
            highest: '~',
            min_length: 0,
            max_length: None,
        }
    }

    pub fn with_chars(lowest: char, highest: char) -> Result<Self, RangeError> {
        check_range(&lowest, &highest)?;
        Ok(Self {
            lowest,
            highest,
            ..Self::new()
        })
    }

    fn in_alphabet(&self, c: char) -> bool {
        self.lowest <= c && c <= self.highest
    }
}

impl Default for StringGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for StringGenerator {
    type Output = String;

    fn types(&self) -> Vec<TypeToken> {
        vec![STRING]
    }

    fn generate(&self, random: &mut RandomSource, status: &mut GenerationStatus) -> String {
        let length = draw_length(self.min_length, self.max_length, random, status);
        (0..length)
            .map(|_| random.next_char(self.lowest, self.highest))
            .collect()
    }

    fn can_shrink(&self, larger: &String) -> bool {
        larger.chars().count() > self.min_length
            || larger.chars().any(|c| c != self.lowest && self.in_alphabet(c))
    }

    fn shrink(&self, _random: &mut RandomSource, larger: &String) -> Vec<String> {
        let chars: Vec<char> = larger.chars().collect();
        let mut candidates = Vec::new();

        // Shorter prefixes, down to the minimum length
        if chars.len() > self.min_length {
            for length in (self.min_length..chars.len()).rev() {
                candidates.push(chars[..length].iter().collect());
            }
        }

        // Each character replaced by the lowest one
        for (i, &c) in chars.iter().enumerate() {
            if c != self.lowest && self.in_alphabet(c) {
                let mut simpler = chars.clone();
                simpler[i] = self.lowest;
                candidates.push(simpler.into_iter().collect());
            }
        }

        candidates
    }

    fn magnitude(&self, value: &String) -> f64 {
        value.chars().count() as f64
    }

    fn supports(&self, kind: &DirectiveKind) -> bool {
        *kind == DirectiveKind::Size
    }

    fn configure(&mut self, directive: &Directive) -> Result<(), ConfigurationError> {
        if let Directive::Size { min, max } = directive {
            let (low, high) = resolve_bounds(*min, *max, 0, usize::MAX)
                .map_err(|source| ConfigurationError::range(DirectiveKind::Size, source))?;
            self.min_length = low;
            self.max_length = max.map(|_| high);
        }
        Ok(())
    }
}
