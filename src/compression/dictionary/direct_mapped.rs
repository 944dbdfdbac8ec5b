//! Direct-mapped dictionary: every bucket is a set of one.

use super::{sentinel, Dictionary, Probe};
use crate::compression::config::{DictionaryOrganization, WordSplit};
use crate::compression::word::Word;
use crate::hashing::bucket_for;

/// A dictionary where a word's high bits pick its single candidate entry,
/// which is also the entry a miss replaces.
#[derive(Debug, Clone)]
pub struct DirectMapped<W: Word> {
    entries: Vec<W>,
    split: WordSplit<W>,
}

impl<W: Word> DirectMapped<W> {
    /// Creates a dictionary with `capacity` buckets.
    pub fn new(capacity: usize, split: WordSplit<W>) -> Self {
        DirectMapped {
            entries: vec![sentinel(); capacity],
            split,
        }
    }

    fn bucket(&self, word: W) -> usize {
        bucket_for(self.split.high(word).widen(), self.entries.len())
    }
}

impl<W: Word> Dictionary<W> for DirectMapped<W> {
    fn lookup(&self, word: W) -> Probe<W> {
        let index = self.bucket(word);
        Probe {
            index,
            value: self.entries[index],
        }
    }

    fn value(&self, index: usize) -> W {
        self.entries[index]
    }

    fn promote(&mut self, _index: usize) {}

    fn set_value(&mut self, index: usize, value: W) {
        self.entries[index] = value;
    }

    fn capacity(&self) -> usize {
        self.entries.len()
    }

    fn organization(&self) -> DictionaryOrganization {
        DictionaryOrganization::DirectMapped
    }
}
