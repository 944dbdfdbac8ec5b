//! Classification of page words against the dictionary.
//!
//! The modeler turns a page into four intermediate, unpacked streams:
//! one tag per word, a dictionary index per EXACT or PARTIAL word, low bits
//! per PARTIAL word and the full value of every MISS word. Words are visited
//! in stride order and every stream is appended in that same order, which is
//! the order the decoder replays them in.

use crate::compression::config::WordSplit;
use crate::compression::dictionary::Dictionary;
use crate::compression::word::Word;

/// Classification of one word. The discriminants are the 2-bit codes
/// stored in the tags area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// The word is zero and matched no entry.
    Zero = 0b00,
    /// The high bits matched an entry; the low bits are recorded.
    Partial = 0b01,
    /// Nothing matched; the full word is recorded.
    Miss = 0b10,
    /// The word equals an entry's value.
    Exact = 0b11,
}

impl Tag {
    /// Number of bits a packed tag occupies.
    pub const BITS: u32 = 2;

    /// Decodes a 2-bit field. Only the low two bits are looked at.
    #[inline]
    pub fn from_bits(bits: u16) -> Tag {
        match bits & 0b11 {
            0b00 => Tag::Zero,
            0b01 => Tag::Partial,
            0b10 => Tag::Miss,
            _ => Tag::Exact,
        }
    }

    /// The 2-bit field for this tag.
    #[inline]
    pub fn bits(self) -> u16 {
        self as u16
    }
}

/// How many words received each tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagCounts {
    /// ZERO words
    pub zero: usize,
    /// EXACT words
    pub exact: usize,
    /// PARTIAL words
    pub partial: usize,
    /// MISS words
    pub miss: usize,
}

impl TagCounts {
    /// Tallies a tag sequence.
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        let mut counts = TagCounts::default();
        for tag in tags {
            counts.record(tag);
        }
        counts
    }

    #[inline]
    fn record(&mut self, tag: Tag) {
        match tag {
            Tag::Zero => self.zero += 1,
            Tag::Exact => self.exact += 1,
            Tag::Partial => self.partial += 1,
            Tag::Miss => self.miss += 1,
        }
    }

    /// Words that reference a dictionary entry.
    pub fn indexed(&self) -> usize {
        self.exact + self.partial
    }

    /// Total words tallied.
    pub fn total(&self) -> usize {
        self.zero + self.exact + self.partial + self.miss
    }
}

/// The modeler's unpacked output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelStreams<W: Word> {
    /// One tag per word, in traversal order
    pub tags: Vec<Tag>,
    /// Entry index of every EXACT and PARTIAL word
    pub dict_indices: Vec<u16>,
    /// Low bits of every PARTIAL word
    pub low_bits: Vec<u16>,
    /// Every MISS word, verbatim
    pub full_words: Vec<W>,
    /// Per-tag totals
    pub counts: TagCounts,
}

impl<W: Word> ModelStreams<W> {
    fn with_capacity(words: usize) -> Self {
        ModelStreams {
            tags: Vec::with_capacity(words),
            dict_indices: Vec::with_capacity(words),
            low_bits: Vec::with_capacity(words),
            full_words: Vec::new(),
            counts: TagCounts::default(),
        }
    }

    fn push(&mut self, tag: Tag) {
        self.tags.push(tag);
        self.counts.record(tag);
    }
}

/// Positions of a `len`-word page in stride order: `0, stride, 2*stride, ...`,
/// then `1, stride + 1, ...`, up to offset `stride - 1`.
pub fn traversal_order(len: usize, stride: usize) -> impl Iterator<Item = usize> {
    let stride = stride.max(1);
    (0..stride.min(len)).flat_map(move |offset| (offset..len).step_by(stride))
}

/// Classifies every word of `page` against `dict`, updating the dictionary
/// as it goes.
///
/// For each word, the dictionary is probed once and:
///
/// 1. EXACT if the word equals the probed entry (checked before the zero
///    test, so a zero word would be EXACT if an entry held zero; entries
///    never acquire zero through this function, which leaves that branch
///    unreachable from a fresh dictionary). The entry is promoted.
/// 2. ZERO if the word is zero. The dictionary is not touched.
/// 3. PARTIAL if the high bits match. The entry is overwritten and promoted.
/// 4. MISS otherwise. The probed victim is overwritten and promoted.
pub fn model<W: Word>(
    page: &[W],
    dict: &mut dyn Dictionary<W>,
    split: &WordSplit<W>,
    stride: usize,
) -> ModelStreams<W> {
    let mut streams = ModelStreams::with_capacity(page.len());
    for position in traversal_order(page.len(), stride) {
        let word = page[position];
        let probe = dict.lookup(word);
        if word == probe.value {
            streams.push(Tag::Exact);
            streams.dict_indices.push(probe.index as u16);
            dict.promote(probe.index);
        } else if word.is_zero() {
            streams.push(Tag::Zero);
        } else {
            if split.high(word) == split.high(probe.value) {
                streams.push(Tag::Partial);
                streams.dict_indices.push(probe.index as u16);
                streams.low_bits.push(split.low(word));
            } else {
                streams.push(Tag::Miss);
                streams.full_words.push(word);
            }
            dict.set_value(probe.index, word);
            dict.promote(probe.index);
        }
    }
    streams
}
