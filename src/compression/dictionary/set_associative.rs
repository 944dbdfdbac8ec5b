//! Set-associative dictionary.

use super::recency::RecencyList;
use super::{sentinel, Dictionary, Probe};
use crate::compression::config::{DictionaryOrganization, WordSplit};
use crate::compression::word::Word;
use crate::hashing::bucket_for;

/// Entries partitioned into fixed-size LRU sets.
///
/// A hash of the word's high bits picks the set; scanning, recency and
/// victim selection then happen inside that set only, exactly as in
/// [`LinearScan`](super::LinearScan).
#[derive(Debug, Clone)]
pub struct SetAssociative<W: Word> {
    entries: Vec<W>,
    recency: RecencyList,
    num_sets: usize,
    split: WordSplit<W>,
}

impl<W: Word> SetAssociative<W> {
    /// Creates `num_sets` sets of `set_size` entries.
    pub fn new(set_size: usize, num_sets: usize, split: WordSplit<W>) -> Self {
        SetAssociative {
            entries: vec![sentinel(); set_size * num_sets],
            recency: RecencyList::new(num_sets, set_size),
            num_sets,
            split,
        }
    }

    /// The set a word maps to.
    pub fn set_for(&self, word: W) -> usize {
        bucket_for(self.split.high(word).widen(), self.num_sets)
    }
}

impl<W: Word> Dictionary<W> for SetAssociative<W> {
    fn lookup(&self, word: W) -> Probe<W> {
        let high = self.split.high(word);
        let set = self.set_for(word);
        let index = self
            .recency
            .find_or_victim(set, |i| self.split.high(self.entries[i]) == high);
        Probe {
            index,
            value: self.entries[index],
        }
    }

    fn value(&self, index: usize) -> W {
        self.entries[index]
    }

    fn promote(&mut self, index: usize) {
        self.recency.promote(index);
    }

    fn set_value(&mut self, index: usize, value: W) {
        self.entries[index] = value;
    }

    fn capacity(&self) -> usize {
        self.entries.len()
    }

    fn organization(&self) -> DictionaryOrganization {
        DictionaryOrganization::SetAssociative
    }
}
