//! Fully-associative dictionary searched by a linear scan.

use super::recency::RecencyList;
use super::{sentinel, Dictionary, Probe};
use crate::compression::config::{DictionaryOrganization, WordSplit};
use crate::compression::word::Word;

/// A single LRU set holding every entry.
///
/// Lookup walks the set from most to least recently used and returns the
/// first entry whose high bits match the word; if none does, the least
/// recently used entry is the candidate (and the victim on a miss).
#[derive(Debug, Clone)]
pub struct LinearScan<W: Word> {
    entries: Vec<W>,
    recency: RecencyList,
    split: WordSplit<W>,
}

impl<W: Word> LinearScan<W> {
    /// Creates a dictionary of `capacity` entries.
    pub fn new(capacity: usize, split: WordSplit<W>) -> Self {
        LinearScan {
            entries: vec![sentinel(); capacity],
            recency: RecencyList::new(1, capacity),
            split,
        }
    }
}

impl<W: Word> Dictionary<W> for LinearScan<W> {
    fn lookup(&self, word: W) -> Probe<W> {
        let high = self.split.high(word);
        let index = self
            .recency
            .find_or_victim(0, |i| self.split.high(self.entries[i]) == high);
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
        DictionaryOrganization::FullyAssociativeLinear
    }
}
