//! Machine words the codec operates on.
//!
//! A codec instance works on a single word width for its whole lifetime, so
//! the width is a type parameter rather than a runtime switch. `u32` and `u64`
//! are the only implementors.

use crate::compression::Result;
use crate::error::Error;
use num_traits::{PrimInt, Unsigned};
use std::fmt::{Debug, LowerHex};
use std::hash::Hash;

/// A fixed-width unsigned machine word.
pub trait Word: PrimInt + Unsigned + Hash + Debug + LowerHex + Send + Sync + 'static {
    /// Width of the word in bits.
    const BITS: u32;
    /// Width of the word in bytes.
    const BYTES: usize;

    /// Widens a packed field value into a word.
    fn from_field(value: u16) -> Self;

    /// Keeps only the low 16 bits of the word.
    fn to_field(self) -> u16;

    /// Zero-extends the word to 64 bits.
    fn widen(self) -> u64;

    /// Converts a count or offset into a word, if it fits.
    fn from_count(value: usize) -> Option<Self>;

    /// Converts a header field back into a count or offset, if it fits.
    fn to_count(self) -> Option<usize>;

    /// Appends the little-endian encoding of the word.
    fn write_le(self, out: &mut Vec<u8>);

    /// Reads a word from exactly `Self::BYTES` little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_word {
    ($ty:ty) => {
        impl Word for $ty {
            const BITS: u32 = <$ty>::BITS;
            const BYTES: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn from_field(value: u16) -> Self {
                value as $ty
            }

            #[inline]
            fn to_field(self) -> u16 {
                self as u16
            }

            #[inline]
            fn widen(self) -> u64 {
                self as u64
            }

            #[inline]
            fn from_count(value: usize) -> Option<Self> {
                <$ty>::try_from(value).ok()
            }

            #[inline]
            fn to_count(self) -> Option<usize> {
                usize::try_from(self).ok()
            }

            #[inline]
            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                <$ty>::from_le_bytes(raw)
            }
        }
    };
}

impl_word!(u32);
impl_word!(u64);

/// Serializes words into little-endian bytes.
pub fn words_to_bytes<W: Word>(words: &[W]) -> Vec<u8> {
    let mut out = Vec::with_capacity(words.len() * W::BYTES);
    for &word in words {
        word.write_le(&mut out);
    }
    out
}

/// Parses little-endian bytes into words.
///
/// Fails with `MalformedInput` when the length is not a whole number of words.
pub fn bytes_to_words<W: Word>(bytes: &[u8]) -> Result<Vec<W>> {
    if bytes.len() % W::BYTES != 0 {
        return Err(Error::malformed(format!(
            "{} bytes is not a whole number of {}-bit words",
            bytes.len(),
            W::BITS
        )));
    }
    Ok(bytes.chunks_exact(W::BYTES).map(W::read_le).collect())
}
