//! Recency-managed dictionaries of recently seen words.
//!
//! The modeler and the decoder drive a dictionary through exactly the same
//! sequence of operations, so every organization must be deterministic and
//! must keep `lookup` free of side effects: the decoder never performs the
//! lookups the modeler did for ZERO and EXACT words, and the two dictionaries
//! have to stay in lockstep regardless.
//!
//! Four organizations share the [`Dictionary`] contract:
//!
//! - [`DirectMapped`]: one entry per bucket, no recency tracking.
//! - [`LinearScan`]: one LRU set, scanned from most to least recently used.
//! - [`FullyAssociativeHashed`]: same behavior as [`LinearScan`], with a hash
//!   index over high bits instead of the scan.
//! - [`SetAssociative`]: several independent LRU sets, picked by hash.
//!
//! Entries start out holding [`SENTINEL`] rather than zero. Zero words get
//! their own tag and never enter the dictionary, so a zero-initialized
//! dictionary would only make the EXACT check match words it should not.

use crate::compression::config::{CodecConfig, DictionaryOrganization, WordSplit};
use crate::compression::word::Word;

pub mod direct_mapped;
pub mod hashed;
pub mod linear_scan;
pub mod recency;
pub mod set_associative;

pub use direct_mapped::DirectMapped;
pub use hashed::FullyAssociativeHashed;
pub use linear_scan::LinearScan;
pub use set_associative::SetAssociative;

/// Value every entry holds in a fresh dictionary.
pub const SENTINEL: u64 = 1;

/// The entry a word is compared against, and that entry's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe<W: Word> {
    /// Index of the entry, in `0..capacity`
    pub index: usize,
    /// Current value of the entry
    pub value: W,
}

/// Common contract of every dictionary organization.
pub trait Dictionary<W: Word>: Send {
    /// Returns the entry `word` would be matched against: an entry sharing
    /// its high bits if the organization finds one, otherwise the victim that
    /// a miss would overwrite. Does not change any state.
    fn lookup(&self, word: W) -> Probe<W>;

    /// Current value of an entry.
    fn value(&self, index: usize) -> W;

    /// Makes an entry the most recently used of its set.
    fn promote(&mut self, index: usize);

    /// Overwrites an entry's value without touching recency order.
    fn set_value(&mut self, index: usize, value: W);

    /// Number of entries.
    fn capacity(&self) -> usize;

    /// Which organization this is.
    fn organization(&self) -> DictionaryOrganization;
}

/// Builds a fresh, sentinel-filled dictionary for a validated configuration.
pub fn build<W: Word>(config: &CodecConfig) -> Box<dyn Dictionary<W>> {
    let split = WordSplit::new(config.low_bits);
    match config.organization {
        DictionaryOrganization::DirectMapped => {
            Box::new(DirectMapped::new(config.capacity(), split))
        }
        DictionaryOrganization::FullyAssociativeLinear => {
            Box::new(LinearScan::new(config.capacity(), split))
        }
        DictionaryOrganization::FullyAssociativeHashed => {
            Box::new(FullyAssociativeHashed::new(config.capacity(), split))
        }
        DictionaryOrganization::SetAssociative => Box::new(SetAssociative::new(
            config.set_size,
            config.num_sets,
            split,
        )),
    }
}

#[inline]
pub(crate) fn sentinel<W: Word>() -> W {
    W::from_field(SENTINEL as u16)
}
