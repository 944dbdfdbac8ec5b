//! Codec configuration and the values derived from it.

use crate::compression::bit_packer::MAX_BITS_PER_VALUE;
use crate::compression::encoder::max_compressed_words;
use crate::compression::word::Word;
use crate::compression::Result;
use crate::error::Error;
use std::fmt;

/// Smallest supported low-bit split.
pub const MIN_LOW_BITS: u32 = 4;
/// Largest supported low-bit split.
pub const MAX_LOW_BITS: u32 = 16;
/// Linux small-page size, the default page.
pub const DEFAULT_PAGE_BYTES: usize = 4096;

/// How the dictionary's entries are organized into sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictionaryOrganization {
    /// One entry per bucket, bucket chosen by hashing the high bits.
    DirectMapped,
    /// One LRU set holding every entry, searched by a linear scan.
    FullyAssociativeLinear,
    /// One LRU set holding every entry, searched through a hash index.
    FullyAssociativeHashed,
    /// Several LRU sets, set chosen by hashing the high bits.
    SetAssociative,
}

impl DictionaryOrganization {
    /// Picks the organization a given geometry implies: a set size of one is
    /// direct-mapped, a single set is fully associative (hashed when
    /// `hashed_lookup` is set), anything else is set-associative.
    pub fn infer(set_size: usize, num_sets: usize, hashed_lookup: bool) -> Self {
        if set_size == 1 {
            DictionaryOrganization::DirectMapped
        } else if num_sets == 1 {
            if hashed_lookup {
                DictionaryOrganization::FullyAssociativeHashed
            } else {
                DictionaryOrganization::FullyAssociativeLinear
            }
        } else {
            DictionaryOrganization::SetAssociative
        }
    }

    /// Every organization, in a fixed order.
    pub const ALL: [DictionaryOrganization; 4] = [
        DictionaryOrganization::DirectMapped,
        DictionaryOrganization::FullyAssociativeLinear,
        DictionaryOrganization::FullyAssociativeHashed,
        DictionaryOrganization::SetAssociative,
    ];
}

impl fmt::Display for DictionaryOrganization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DictionaryOrganization::DirectMapped => "direct-mapped",
            DictionaryOrganization::FullyAssociativeLinear => "fully-associative-linear",
            DictionaryOrganization::FullyAssociativeHashed => "fully-associative-hashed",
            DictionaryOrganization::SetAssociative => "set-associative",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for DictionaryOrganization {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DictionaryOrganization::ALL
            .into_iter()
            .find(|org| org.to_string() == s)
            .ok_or_else(|| Error::config(format!("unknown dictionary organization '{}'", s)))
    }
}

/// Configuration for a codec instance.
///
/// Fixed for the lifetime of the codec; the compressor and decompressor of a
/// page must use identical configurations, since none of it is recorded in
/// the compressed header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Word width in bits, 32 or 64
    pub word_width: u32,
    /// Number of low bits recorded explicitly on a partial match
    pub low_bits: u32,
    /// Dictionary organization
    pub organization: DictionaryOrganization,
    /// Entries per dictionary set
    pub set_size: usize,
    /// Number of dictionary sets
    pub num_sets: usize,
    /// Interleaving factor for the word traversal order
    pub stride: usize,
    /// Size of a page in bytes
    pub page_bytes: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            word_width: 64,
            low_bits: 10,
            organization: DictionaryOrganization::SetAssociative,
            set_size: 4,
            num_sets: 4,
            stride: 1,
            page_bytes: DEFAULT_PAGE_BYTES,
        }
    }
}

impl CodecConfig {
    /// Default configuration for a given word type.
    pub fn for_word<W: Word>() -> Self {
        Self {
            word_width: W::BITS,
            ..Self::default()
        }
    }

    /// Sets the low-bit split.
    pub fn with_low_bits(mut self, low_bits: u32) -> Self {
        self.low_bits = low_bits;
        self
    }

    /// Sets the organization and geometry explicitly.
    pub fn with_dictionary(
        mut self,
        organization: DictionaryOrganization,
        set_size: usize,
        num_sets: usize,
    ) -> Self {
        self.organization = organization;
        self.set_size = set_size;
        self.num_sets = num_sets;
        self
    }

    /// Sets the geometry and infers the organization from it.
    pub fn with_geometry(self, set_size: usize, num_sets: usize, hashed_lookup: bool) -> Self {
        let organization = DictionaryOrganization::infer(set_size, num_sets, hashed_lookup);
        self.with_dictionary(organization, set_size, num_sets)
    }

    /// Sets the traversal stride.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    /// Sets the page size in bytes.
    pub fn with_page_bytes(mut self, page_bytes: usize) -> Self {
        self.page_bytes = page_bytes;
        self
    }

    /// Total number of dictionary entries.
    pub fn capacity(&self) -> usize {
        self.set_size.saturating_mul(self.num_sets)
    }

    /// Bits needed to encode a dictionary index.
    pub fn index_bits(&self) -> u32 {
        self.capacity().trailing_zeros()
    }

    /// Words in one page.
    pub fn words_per_page(&self) -> usize {
        self.page_bytes / (self.word_width as usize / 8)
    }

    /// Checks the configuration against the word type `W`.
    pub fn validate<W: Word>(&self) -> Result<()> {
        if self.word_width != 32 && self.word_width != 64 {
            return Err(Error::config(format!(
                "word width {} is not 32 or 64",
                self.word_width
            )));
        }
        if self.word_width != W::BITS {
            return Err(Error::config(format!(
                "word width {} does not match the codec's {}-bit word type",
                self.word_width,
                W::BITS
            )));
        }
        if !(MIN_LOW_BITS..=MAX_LOW_BITS).contains(&self.low_bits) {
            return Err(Error::config(format!(
                "low bits {} outside {}..={}",
                self.low_bits, MIN_LOW_BITS, MAX_LOW_BITS
            )));
        }
        if self.set_size == 0 || self.num_sets == 0 {
            return Err(Error::config("dictionary needs at least one set and one entry per set"));
        }
        let capacity = self
            .set_size
            .checked_mul(self.num_sets)
            .ok_or_else(|| Error::config("dictionary capacity overflows"))?;
        if capacity < 2 || !capacity.is_power_of_two() {
            return Err(Error::config(format!(
                "dictionary capacity {} is not a power of two of at least 2",
                capacity
            )));
        }
        if self.index_bits() > MAX_BITS_PER_VALUE {
            return Err(Error::config(format!(
                "dictionary capacity {} needs {} index bits, at most {} supported",
                capacity,
                self.index_bits(),
                MAX_BITS_PER_VALUE
            )));
        }
        match self.organization {
            DictionaryOrganization::DirectMapped if self.set_size != 1 => {
                return Err(Error::config(format!(
                    "direct-mapped dictionary needs a set size of 1, got {}",
                    self.set_size
                )));
            }
            DictionaryOrganization::FullyAssociativeLinear
            | DictionaryOrganization::FullyAssociativeHashed
                if self.num_sets != 1 =>
            {
                return Err(Error::config(format!(
                    "fully-associative dictionary needs exactly one set, got {}",
                    self.num_sets
                )));
            }
            _ => {}
        }
        if self.stride == 0 {
            return Err(Error::config("stride must be at least 1"));
        }
        if self.page_bytes == 0 || self.page_bytes % W::BYTES != 0 {
            return Err(Error::config(format!(
                "page size {} is not a positive multiple of {} bytes",
                self.page_bytes,
                W::BYTES
            )));
        }
        let worst_case = max_compressed_words(self.words_per_page(), W::BITS) * W::BYTES;
        if worst_case > 2 * self.page_bytes {
            return Err(Error::config(format!(
                "page size {} is too small: worst-case output of {} bytes exceeds twice the page",
                self.page_bytes, worst_case
            )));
        }
        Ok(())
    }
}

/// Splits words into the high bits used for matching and the low bits
/// recorded on partial matches.
#[derive(Debug, Clone, Copy)]
pub struct WordSplit<W: Word> {
    low_bits: u32,
    low_mask: W,
}

impl<W: Word> WordSplit<W> {
    /// Creates a split at `low_bits`, which must be below `W::BITS`.
    pub fn new(low_bits: u32) -> Self {
        Self {
            low_bits,
            low_mask: (W::one() << low_bits as usize) - W::one(),
        }
    }

    /// Number of low bits.
    pub fn low_bits(&self) -> u32 {
        self.low_bits
    }

    /// The word with its low bits shifted out.
    #[inline]
    pub fn high(&self, word: W) -> W {
        word >> self.low_bits as usize
    }

    /// The low bits of the word, as a packable field.
    #[inline]
    pub fn low(&self, word: W) -> u16 {
        (word & self.low_mask).to_field()
    }

    /// Replaces the low bits of `base` with `low`.
    #[inline]
    pub fn splice(&self, base: W, low: u16) -> W {
        (base & !self.low_mask) | (W::from_field(low) & self.low_mask)
    }
}
