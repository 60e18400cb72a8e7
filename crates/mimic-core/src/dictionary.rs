//! Word dictionary for same-length substitution

use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;

/// Words bucketed by their letter count.
///
/// Only words made entirely of letters are kept, so a bucket keyed `n` holds
/// words of exactly `n` alphabetic characters and nothing else.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    buckets: HashMap<usize, Vec<String>>,
    word_count: usize,
}

impl Dictionary {
    /// Build from a newline-delimited word list; lines are trimmed and blank
    /// lines dropped.
    pub fn from_text(text: &str) -> Self {
        Self::from_words(text.lines().map(str::trim).filter(|line| !line.is_empty()))
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut buckets: HashMap<usize, Vec<String>> = HashMap::new();
        let mut word_count = 0;

        for word in words {
            let word = word.as_ref();
            if word.is_empty() || !word.chars().all(char::is_alphabetic) {
                continue;
            }
            buckets
                .entry(word.chars().count())
                .or_default()
                .push(word.to_string());
            word_count += 1;
        }

        Self {
            buckets,
            word_count,
        }
    }

    /// Pick a random word with exactly `letters` letters.
    pub fn pick<R: Rng + ?Sized>(&self, letters: usize, rng: &mut R) -> Option<&str> {
        self.buckets
            .get(&letters)
            .and_then(|bucket| bucket.choose(rng))
            .map(String::as_str)
    }

    pub fn bucket(&self, letters: usize) -> &[String] {
        self.buckets.get(&letters).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.word_count
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }
}
