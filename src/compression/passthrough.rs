//! The "store" baseline: a word count followed by the page verbatim.

use crate::compression::word::Word;
use crate::compression::{PageCompression, Result};
use crate::error::Error;
use std::marker::PhantomData;

/// Copies pages through unchanged behind a one-word length header.
///
/// Useful as the reference point WK ratios are reported against, and as a
/// sanity check for drivers written against [`PageCompression`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough<W: Word> {
    _word: PhantomData<W>,
}

impl<W: Word> Passthrough<W> {
    /// Creates the baseline codec.
    pub fn new() -> Self {
        Passthrough { _word: PhantomData }
    }
}

impl<W: Word> PageCompression<W> for Passthrough<W> {
    fn compress_page(&self, page: &[W]) -> Result<Vec<W>> {
        let header = W::from_count(page.len()).ok_or_else(|| {
            Error::InvalidInput(format!(
                "{} words cannot be counted in a {}-bit header",
                page.len(),
                W::BITS
            ))
        })?;
        let mut out = Vec::with_capacity(page.len() + 1);
        out.push(header);
        out.extend_from_slice(page);
        Ok(out)
    }

    fn decompress_page(&self, src: &[W]) -> Result<Vec<W>> {
        let (&header, body) = src
            .split_first()
            .ok_or_else(|| Error::malformed("empty buffer has no length header"))?;
        let len = header
            .to_count()
            .filter(|&len| len <= body.len())
            .ok_or_else(|| {
                Error::malformed(format!(
                    "length {:#x} exceeds the {} words present",
                    header,
                    body.len()
                ))
            })?;
        Ok(body[..len].to_vec())
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}
