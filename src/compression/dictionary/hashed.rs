//! Fully-associative dictionary with a hash index over high bits.

use super::recency::RecencyList;
use super::{sentinel, Dictionary, Probe};
use crate::compression::config::{DictionaryOrganization, WordSplit};
use crate::compression::word::Word;
use crate::hashing::FnvBuildHasher;
use std::collections::HashMap;

/// Behaves exactly like [`LinearScan`](super::LinearScan) but answers
/// lookups in O(1) on average.
///
/// The index maps a high-bit pattern to the most recently used entry holding
/// it, which is the entry a linear scan would stop at. Distinct entries only
/// share high bits while several of them still hold the sentinel; once a
/// pattern is in the dictionary, later words with the same high bits hit it
/// and overwrite it in place.
#[derive(Debug, Clone)]
pub struct FullyAssociativeHashed<W: Word> {
    entries: Vec<W>,
    recency: RecencyList,
    index: HashMap<W, usize, FnvBuildHasher>,
    split: WordSplit<W>,
}

impl<W: Word> FullyAssociativeHashed<W> {
    /// Creates a dictionary of `capacity` entries.
    pub fn new(capacity: usize, split: WordSplit<W>) -> Self {
        let entries = vec![sentinel(); capacity];
        let mut index = HashMap::with_capacity_and_hasher(capacity, FnvBuildHasher);
        // Walk LRU to MRU so the most recent holder of each pattern wins.
        for (slot, &value) in entries.iter().enumerate().rev() {
            index.insert(split.high(value), slot);
        }
        FullyAssociativeHashed {
            entries,
            recency: RecencyList::new(1, capacity),
            index,
            split,
        }
    }

    /// Most recently used entry, other than `except`, whose high bits are
    /// `high`.
    fn next_holder(&self, high: W, except: usize) -> Option<usize> {
        self.recency
            .iter(0)
            .find(|&i| i != except && self.split.high(self.entries[i]) == high)
    }
}

impl<W: Word> Dictionary<W> for FullyAssociativeHashed<W> {
    fn lookup(&self, word: W) -> Probe<W> {
        let index = match self.index.get(&self.split.high(word)) {
            Some(&slot) => slot,
            None => self.recency.tail(0),
        };
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
        // Now the most recent entry with its pattern.
        self.index.insert(self.split.high(self.entries[index]), index);
    }

    fn set_value(&mut self, index: usize, value: W) {
        let old_high = self.split.high(self.entries[index]);
        let new_high = self.split.high(value);
        self.entries[index] = value;
        if old_high == new_high {
            return;
        }

        if self.index.get(&old_high) == Some(&index) {
            match self.next_holder(old_high, index) {
                Some(holder) => self.index.insert(old_high, holder),
                None => self.index.remove(&old_high),
            };
        }

        let replace = match self.index.get(&new_high) {
            None => true,
            Some(&holder) => self.recency.more_recent(index, holder),
        };
        if replace {
            self.index.insert(new_high, index);
        }
    }

    fn capacity(&self) -> usize {
        self.entries.len()
    }

    fn organization(&self) -> DictionaryOrganization {
        DictionaryOrganization::FullyAssociativeHashed
    }
}
