//! Page-parallel compression of multi-page regions.
//!
//! Pages share nothing, so a region is split into pages and each page is
//! handed to the rayon pool with its own dictionary. Results come back in
//! page order.

use crate::compression::word::Word;
use crate::compression::{PageCompression, Result};
use crate::error::Error;
use log::debug;
use rayon::prelude::*;

/// Compresses every `words_per_page`-word page of `region` in parallel.
///
/// Fails with `InvalidInput` unless the region is a whole number of pages.
pub fn compress_pages<W, C>(codec: &C, region: &[W], words_per_page: usize) -> Result<Vec<Vec<W>>>
where
    W: Word,
    C: PageCompression<W> + ?Sized,
{
    if words_per_page == 0 || region.len() % words_per_page != 0 {
        return Err(Error::InvalidInput(format!(
            "{} words is not a whole number of {}-word pages",
            region.len(),
            words_per_page
        )));
    }
    let pages: Vec<Vec<W>> = region
        .par_chunks(words_per_page)
        .map(|page| codec.compress_page(page))
        .collect::<Result<_>>()?;
    debug!(
        "{}: compressed {} pages to {} words",
        codec.name(),
        pages.len(),
        pages.iter().map(Vec::len).sum::<usize>()
    );
    Ok(pages)
}

/// Decompresses `pages` in parallel and concatenates them in order.
pub fn decompress_pages<W, C>(codec: &C, pages: &[Vec<W>]) -> Result<Vec<W>>
where
    W: Word,
    C: PageCompression<W> + ?Sized,
{
    let decoded: Vec<Vec<W>> = pages
        .par_iter()
        .map(|page| codec.decompress_page(page))
        .collect::<Result<_>>()?;
    Ok(decoded.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::{CodecConfig, Passthrough, WkCodec};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn region(pages: usize) -> Vec<u64> {
        let mut rng = StdRng::seed_from_u64(99);
        (0..pages * 512)
            .map(|i| match i % 5 {
                0 | 1 => 0,
                2 => 0x5600_0000 + rng.gen_range(0..4096u64),
                _ => rng.gen_range(0..1 << 40),
            })
            .collect()
    }

    #[test]
    fn test_matches_sequential() {
        let codec = WkCodec::<u64>::new(CodecConfig::default()).unwrap();
        let data = region(16);
        let parallel = compress_pages(&codec, &data, 512).unwrap();
        let sequential: Vec<Vec<u64>> = data
            .chunks(512)
            .map(|page| codec.compress_words(page).unwrap())
            .collect();
        assert_eq!(parallel, sequential);
        assert_eq!(decompress_pages(&codec, &parallel).unwrap(), data);
    }

    #[test]
    fn test_trait_objects() {
        let codec: Box<dyn PageCompression<u64>> = Box::new(Passthrough::<u64>::new());
        let data = region(3);
        let pages = compress_pages(codec.as_ref(), &data, 512).unwrap();
        assert!(pages.iter().all(|p| p.len() == 513));
        assert_eq!(decompress_pages(codec.as_ref(), &pages).unwrap(), data);
    }

    #[test]
    fn test_partial_page_rejected() {
        let codec = WkCodec::<u64>::new(CodecConfig::default()).unwrap();
        let data = region(2);
        assert!(matches!(
            compress_pages(&codec, &data[..700], 512),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            compress_pages(&codec, &data, 0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_corrupt_page_fails_the_batch() {
        let codec = WkCodec::<u64>::new(CodecConfig::default()).unwrap();
        let mut pages = compress_pages(&codec, &region(4), 512).unwrap();
        pages[2].truncate(3);
        assert!(matches!(
            decompress_pages(&codec, &pages),
            Err(Error::MalformedInput(_))
        ));
    }
}
