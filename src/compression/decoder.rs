//! Reconstruction of a page from its compressed form.
//!
//! The decoder owns a fresh dictionary of the encoder's organization and
//! replays, word by word and in the same traversal order, every update the
//! modeler made. No dictionary state is stored in the compressed buffer.

use crate::compression::bit_packer::{packed_len, unpack};
use crate::compression::config::WordSplit;
use crate::compression::dictionary::Dictionary;
use crate::compression::encoder::{Header, HEADER_WORDS};
use crate::compression::modeler::{traversal_order, Tag, TagCounts};
use crate::compression::word::Word;
use crate::compression::Result;
use crate::error::Error;
use log::trace;

/// A compressed buffer whose header and areas have been checked against each
/// other, with every packed area unpacked.
#[derive(Debug, Clone)]
pub struct DecodedStreams<'a, W: Word> {
    pub header: Header,
    pub tags: Vec<Tag>,
    pub counts: TagCounts,
    pub full_words: &'a [W],
    pub dict_indices: Vec<u16>,
    pub low_bits: Vec<u16>,
}

/// Validates the layout of `src` and unpacks its areas.
///
/// Rejects buffers whose offsets are out of order or out of bounds, and
/// buffers whose area sizes disagree with the counts implied by the tags.
/// Words past the low-bits area are ignored.
pub fn parse<W: Word>(src: &[W], index_bits: u32, low_bits: u32) -> Result<DecodedStreams<'_, W>> {
    let header = Header::read(src)?;
    trace!("decoding header {:?} from {} words", header, src.len());

    let num_words = header.num_words;
    let tags_end = packed_len(num_words, Tag::BITS, W::BITS)
        .checked_add(HEADER_WORDS)
        .filter(|&end| end <= src.len())
        .ok_or_else(|| {
            Error::malformed(format!(
                "{} tags do not fit in a {}-word buffer",
                num_words,
                src.len()
            ))
        })?;
    if !(tags_end <= header.index_start
        && header.index_start <= header.low_start
        && header.low_start <= header.low_end
        && header.low_end <= src.len())
    {
        return Err(Error::malformed(format!(
            "area offsets {}, {}, {} out of order or past {} words",
            header.index_start,
            header.low_start,
            header.low_end,
            src.len()
        )));
    }

    let mut tag_fields = unpack(&src[HEADER_WORDS..tags_end], Tag::BITS)?;
    tag_fields.truncate(num_words);
    let tags: Vec<Tag> = tag_fields.into_iter().map(Tag::from_bits).collect();
    let counts = TagCounts::from_tags(tags.iter().copied());

    check_area("full-word", header.index_start - tags_end, counts.miss)?;
    check_area(
        "dictionary-index",
        header.low_start - header.index_start,
        packed_len(counts.indexed(), index_bits, W::BITS),
    )?;
    check_area(
        "low-bits",
        header.low_end - header.low_start,
        packed_len(counts.partial, low_bits, W::BITS),
    )?;

    let mut dict_indices = unpack(&src[header.index_start..header.low_start], index_bits)?;
    dict_indices.truncate(counts.indexed());
    let mut lows = unpack(&src[header.low_start..header.low_end], low_bits)?;
    lows.truncate(counts.partial);

    Ok(DecodedStreams {
        header,
        tags,
        counts,
        full_words: &src[tags_end..header.index_start],
        dict_indices,
        low_bits: lows,
    })
}

fn check_area(name: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(Error::malformed(format!(
            "{} area is {} words, tags imply {}",
            name, actual, expected
        )));
    }
    Ok(())
}

/// Rebuilds the page from parsed streams into `dest`, which must hold at
/// least `num_words` words. Returns the number of words written.
///
/// `dict` must be freshly built with the encoder's configuration.
pub fn replay<W: Word>(
    streams: &DecodedStreams<'_, W>,
    dict: &mut dyn Dictionary<W>,
    split: &WordSplit<W>,
    stride: usize,
    dest: &mut [W],
) -> Result<usize> {
    let num_words = streams.header.num_words;
    if dest.len() < num_words {
        return Err(Error::BufferTooSmall {
            needed: num_words,
            available: dest.len(),
        });
    }

    let capacity = dict.capacity();
    let mut tags = streams.tags.iter();
    let mut full = streams.full_words.iter();
    let mut indices = streams.dict_indices.iter();
    let mut lows = streams.low_bits.iter();
    let mut next_index = || -> Result<usize> {
        let index = indices
            .next()
            .map(|&i| i as usize)
            .ok_or_else(|| Error::malformed("dictionary-index area exhausted"))?;
        if index >= capacity {
            return Err(Error::malformed(format!(
                "dictionary index {} past capacity {}",
                index, capacity
            )));
        }
        Ok(index)
    };

    for position in traversal_order(num_words, stride) {
        let tag = tags
            .next()
            .ok_or_else(|| Error::malformed("tags area exhausted"))?;
        dest[position] = match tag {
            Tag::Zero => W::zero(),
            Tag::Exact => {
                let index = next_index()?;
                dict.promote(index);
                dict.value(index)
            }
            Tag::Partial => {
                let index = next_index()?;
                let low = lows
                    .next()
                    .ok_or_else(|| Error::malformed("low-bits area exhausted"))?;
                let word = split.splice(dict.value(index), *low);
                dict.set_value(index, word);
                dict.promote(index);
                word
            }
            Tag::Miss => {
                let word = *full
                    .next()
                    .ok_or_else(|| Error::malformed("full-word area exhausted"))?;
                let index = dict.lookup(word).index;
                dict.set_value(index, word);
                dict.promote(index);
                word
            }
        };
    }
    Ok(num_words)
}
