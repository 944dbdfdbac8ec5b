//! Packing of small k-bit values into machine words.
//!
//! Every area of the compressed format except the full-word area is a run of
//! small fields: 2-bit tags, dictionary indices and low-bit patterns. They
//! are packed `reps = W::BITS / k` to a word, value `i` of a group landing
//! at bit offset `i * k`. When `k` does not divide the word width the top
//! bits of each word are left unused; with 10-bit values in 64-bit words, six
//! values fill 60 bits and 4 are wasted.
//!
//! Unpacked values are carried as `u16`, wide enough for any `k` in `1..=16`.

use crate::compression::word::Word;
use crate::compression::Result;
use crate::error::Error;

/// Widest field the packer supports.
pub const MAX_BITS_PER_VALUE: u32 = 16;

fn check_width<W: Word>(bits_per_value: u32) -> Result<()> {
    if bits_per_value == 0 || bits_per_value > MAX_BITS_PER_VALUE || bits_per_value > W::BITS {
        return Err(Error::config(format!(
            "cannot pack {}-bit values into {}-bit words",
            bits_per_value,
            W::BITS
        )));
    }
    Ok(())
}

/// Number of `bits_per_value`-wide values that fit in one word.
#[inline]
pub fn values_per_word(bits_per_value: u32, word_bits: u32) -> usize {
    (word_bits / bits_per_value) as usize
}

/// Number of words needed to pack `count` values.
#[inline]
pub fn packed_len(count: usize, bits_per_value: u32, word_bits: u32) -> usize {
    count.div_ceil(values_per_word(bits_per_value, word_bits))
}

/// Mask selecting the low `bits_per_value` bits of a word.
#[inline]
pub fn value_mask<W: Word>(bits_per_value: u32) -> W {
    (W::one() << bits_per_value as usize) - W::one()
}

/// Packs `values` into words, `W::BITS / bits_per_value` values per word.
///
/// A trailing group shorter than a full word is packed as if it were
/// zero-padded. Values wider than `bits_per_value` would bleed into their
/// neighbours; callers only hand in fields that already fit.
///
/// # Example
///
/// ```
/// use wkpage::compression::bit_packer::{pack, unpack};
///
/// let tags: Vec<u16> = vec![0, 1, 2, 3, 3, 2, 1, 0];
/// let packed: Vec<u32> = pack(&tags, 2).unwrap();
/// assert_eq!(packed.len(), 1);
/// assert_eq!(&unpack(&packed, 2).unwrap()[..8], &tags[..]);
/// ```
pub fn pack<W: Word>(values: &[u16], bits_per_value: u32) -> Result<Vec<W>> {
    check_width::<W>(bits_per_value)?;
    let mut dest = vec![W::zero(); packed_len(values.len(), bits_per_value, W::BITS)];
    pack_words(values, bits_per_value, &mut dest);
    Ok(dest)
}

/// Packs `values` into the front of `dest`, returning the number of words
/// written.
pub fn pack_into<W: Word>(values: &[u16], bits_per_value: u32, dest: &mut [W]) -> Result<usize> {
    check_width::<W>(bits_per_value)?;
    let needed = packed_len(values.len(), bits_per_value, W::BITS);
    if dest.len() < needed {
        return Err(Error::BufferTooSmall {
            needed,
            available: dest.len(),
        });
    }
    pack_words(values, bits_per_value, &mut dest[..needed]);
    Ok(needed)
}

fn pack_words<W: Word>(values: &[u16], bits_per_value: u32, dest: &mut [W]) {
    let reps = values_per_word(bits_per_value, W::BITS);
    for (slot, group) in dest.iter_mut().zip(values.chunks(reps)) {
        let mut packed = W::zero();
        for (i, &value) in group.iter().enumerate() {
            packed = packed | (W::from_field(value) << (i * bits_per_value as usize));
        }
        *slot = packed;
    }
}

/// Unpacks every field of `words`, yielding `words.len() * reps` values.
///
/// Fields that were zero padding on the packing side come back as zeros;
/// callers that know the real count truncate.
pub fn unpack<W: Word>(words: &[W], bits_per_value: u32) -> Result<Vec<u16>> {
    check_width::<W>(bits_per_value)?;
    let reps = values_per_word(bits_per_value, W::BITS);
    let mask = value_mask::<W>(bits_per_value);
    let mut values = Vec::with_capacity(words.len() * reps);
    for &word in words {
        for i in 0..reps {
            values.push(((word >> (i * bits_per_value as usize)) & mask).to_field());
        }
    }
    Ok(values)
}
