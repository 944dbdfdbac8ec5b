//! Serialization of modeler streams into the compressed page layout.
//!
//! ```text
//! word 0   num_words
//! word 1   start of the dictionary-index area
//! word 2   start of the low-bits area
//! word 3   end of the low-bits area (total compressed length)
//! word 4.. tags (2 bits each) | full words | dict indices | low bits
//! ```
//!
//! Every area starts on a word boundary.

use crate::compression::bit_packer::{pack_into, packed_len};
use crate::compression::modeler::{ModelStreams, Tag};
use crate::compression::word::Word;
use crate::compression::Result;
use crate::error::Error;
use log::trace;

/// Words occupied by the header.
pub const HEADER_WORDS: usize = 4;

/// Upper bound on the compressed length of a `num_words` input.
///
/// An all-MISS page needs the header, the tags and every word verbatim.
/// A PARTIAL word costs at most one word of index and low bits combined,
/// plus one word of rounding for each of the two packed areas.
pub fn max_compressed_words(num_words: usize, word_bits: u32) -> usize {
    HEADER_WORDS + packed_len(num_words, Tag::BITS, word_bits) + num_words + 2
}

/// The four header fields, as word offsets from the start of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    /// Words in the uncompressed page
    pub num_words: usize,
    /// Start of the dictionary-index area; the full-word area ends here
    pub index_start: usize,
    /// Start of the low-bits area
    pub low_start: usize,
    /// End of the low-bits area, which is the compressed length
    pub low_end: usize,
}

impl Header {
    /// Reads the header fields. Fails if the buffer is shorter than a header
    /// or a field does not fit in `usize`.
    pub fn read<W: Word>(src: &[W]) -> Result<Header> {
        if src.len() < HEADER_WORDS {
            return Err(Error::malformed(format!(
                "{} words is shorter than the {}-word header",
                src.len(),
                HEADER_WORDS
            )));
        }
        let field = |i: usize| {
            src[i]
                .to_count()
                .ok_or_else(|| Error::malformed(format!("header word {} is out of range", i)))
        };
        Ok(Header {
            num_words: field(0)?,
            index_start: field(1)?,
            low_start: field(2)?,
            low_end: field(3)?,
        })
    }

    /// Writes the header into the first four words of `dest`.
    pub fn write<W: Word>(&self, dest: &mut [W]) -> Result<()> {
        if dest.len() < HEADER_WORDS {
            return Err(Error::BufferTooSmall {
                needed: HEADER_WORDS,
                available: dest.len(),
            });
        }
        let fields = [self.num_words, self.index_start, self.low_start, self.low_end];
        for (slot, value) in dest.iter_mut().zip(fields) {
            *slot = W::from_count(value).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "header value {} does not fit a {}-bit word",
                    value,
                    W::BITS
                ))
            })?;
        }
        Ok(())
    }
}

/// Size in words of each area for a stream set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaSizes {
    /// Packed 2-bit tags
    pub tags: usize,
    /// Verbatim MISS words
    pub full_words: usize,
    /// Packed dictionary indices
    pub indices: usize,
    /// Packed low-bit fields
    pub low_bits: usize,
}

impl AreaSizes {
    /// Sizes of the areas `streams` packs into at the given field widths.
    pub fn of<W: Word>(streams: &ModelStreams<W>, index_bits: u32, low_bits: u32) -> Self {
        AreaSizes {
            tags: packed_len(streams.tags.len(), Tag::BITS, W::BITS),
            full_words: streams.full_words.len(),
            indices: packed_len(streams.dict_indices.len(), index_bits, W::BITS),
            low_bits: packed_len(streams.low_bits.len(), low_bits, W::BITS),
        }
    }

    /// Total compressed length, header included.
    pub fn total(&self) -> usize {
        HEADER_WORDS + self.tags + self.full_words + self.indices + self.low_bits
    }
}

/// Writes `streams` into `dest` and returns the compressed length in words.
///
/// Nothing is written unless `dest` can hold the whole result.
pub fn encode<W: Word>(
    streams: &ModelStreams<W>,
    index_bits: u32,
    low_bits: u32,
    dest: &mut [W],
) -> Result<usize> {
    let sizes = AreaSizes::of(streams, index_bits, low_bits);
    let needed = sizes.total();
    if dest.len() < needed {
        return Err(Error::BufferTooSmall {
            needed,
            available: dest.len(),
        });
    }

    let tags_start = HEADER_WORDS;
    let full_start = tags_start + sizes.tags;
    let header = Header {
        num_words: streams.tags.len(),
        index_start: full_start + sizes.full_words,
        low_start: full_start + sizes.full_words + sizes.indices,
        low_end: needed,
    };
    trace!("encoding header {:?} ({:?})", header, sizes);
    header.write(dest)?;

    let tag_fields: Vec<u16> = streams.tags.iter().map(|t| t.bits()).collect();
    pack_into(&tag_fields, Tag::BITS, &mut dest[tags_start..full_start])?;
    dest[full_start..header.index_start].copy_from_slice(&streams.full_words);
    pack_into(
        &streams.dict_indices,
        index_bits,
        &mut dest[header.index_start..header.low_start],
    )?;
    pack_into(
        &streams.low_bits,
        low_bits,
        &mut dest[header.low_start..header.low_end],
    )?;
    Ok(needed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::modeler::TagCounts;

    fn streams(tags: Vec<Tag>, indices: Vec<u16>, lows: Vec<u16>, full: Vec<u64>) -> ModelStreams<u64> {
        ModelStreams {
            counts: TagCounts::from_tags(tags.iter().copied()),
            tags,
            dict_indices: indices,
            low_bits: lows,
            full_words: full,
        }
    }

    #[test]
    fn test_header_round_trip() {
        let header = Header {
            num_words: 512,
            index_start: 30,
            low_start: 40,
            low_end: 55,
        };
        let mut buf = [0u32; 4];
        header.write(&mut buf).unwrap();
        assert_eq!(buf, [512, 30, 40, 55]);
        assert_eq!(Header::read(&buf).unwrap(), header);
    }

    #[test]
    fn test_short_header_rejected() {
        assert!(matches!(
            Header::read(&[1u64, 2, 3]),
            Err(Error::MalformedInput(_))
        ));
        let mut buf = [0u64; 2];
        assert_eq!(
            Header::default().write(&mut buf),
            Err(Error::BufferTooSmall {
                needed: 4,
                available: 2
            })
        );
    }

    #[test]
    fn test_layout_of_mixed_streams() {
        let s = streams(
            vec![Tag::Miss, Tag::Partial, Tag::Zero, Tag::Exact],
            vec![3, 3],
            vec![0x3ff],
            vec![0xabcd_0000],
        );
        let mut dest = vec![0u64; 16];
        let len = encode(&s, 4, 10, &mut dest).unwrap();
        // header + 1 tag word + 1 full word + 1 index word + 1 low-bits word
        assert_eq!(len, 8);
        assert_eq!(&dest[..4], &[4, 6, 7, 8]);
        assert_eq!(dest[4], 0b11_00_01_10);
        assert_eq!(dest[5], 0xabcd_0000);
        assert_eq!(dest[6], 0x33);
        assert_eq!(dest[7], 0x3ff);
    }

    #[test]
    fn test_empty_areas_have_equal_offsets() {
        let s = streams(vec![Tag::Zero; 64], vec![], vec![], vec![]);
        let mut dest = vec![0u64; 8];
        let len = encode(&s, 4, 10, &mut dest).unwrap();
        assert_eq!(len, 6);
        assert_eq!(&dest[..6], &[64, 6, 6, 6, 0, 0]);
    }

    #[test]
    fn test_worst_case_bound() {
        assert_eq!(max_compressed_words(512, 64), 4 + 16 + 512 + 2);
        assert_eq!(max_compressed_words(1024, 32), 4 + 64 + 1024 + 2);
        assert_eq!(max_compressed_words(0, 64), 6);
        // Every word a PARTIAL at 16-bit indices and low bits, 32-bit words.
        let n = 9;
        let s = ModelStreams::<u32> {
            tags: vec![Tag::Partial; n],
            dict_indices: vec![0xffff; n],
            low_bits: vec![0xffff; n],
            full_words: vec![],
            counts: TagCounts::default(),
        };
        let sizes = AreaSizes::of(&s, 16, 16);
        assert!(sizes.total() <= max_compressed_words(n, 32));
    }

    #[test]
    fn test_destination_too_small() {
        let s = streams(vec![Tag::Miss; 2], vec![], vec![], vec![7, 9]);
        let mut dest = vec![0u64; 6];
        assert_eq!(
            encode(&s, 4, 10, &mut dest),
            Err(Error::BufferTooSmall {
                needed: 7,
                available: 6
            })
        );
        assert!(dest.iter().all(|&w| w == 0));
    }
}
