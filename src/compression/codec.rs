//! The WK page codec.

use crate::compression::config::{CodecConfig, WordSplit};
use crate::compression::decoder::{parse, replay};
use crate::compression::dictionary;
use crate::compression::encoder::{self, encode};
use crate::compression::modeler::{model, TagCounts};
use crate::compression::word::{bytes_to_words, words_to_bytes, Word};
use crate::compression::{PageCompression, Result};
use crate::error::Error;
use log::{debug, trace};

/// What compressing one page produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressionStats {
    /// Words in the input page
    pub input_words: usize,
    /// Words in the compressed output, header included
    pub output_words: usize,
    /// Per-tag word counts
    pub counts: TagCounts,
}

impl CompressionStats {
    /// Compressed size over original size. An empty page reports 0.
    pub fn ratio(&self) -> f64 {
        if self.input_words == 0 {
            return 0.0;
        }
        self.output_words as f64 / self.input_words as f64
    }
}

/// A configured WK compressor and decompressor for `W`-sized words.
///
/// The codec holds no per-page state: each call builds its own dictionary,
/// so one instance can be shared across threads.
///
/// # Example
///
/// ```
/// use wkpage::compression::{CodecConfig, WkCodec};
///
/// let codec = WkCodec::<u64>::new(CodecConfig::default()).unwrap();
/// let mut page = vec![0u64; codec.words_per_page()];
/// page[7] = 0x7fff_dead_b000;
/// page[8] = 0x7fff_dead_b010;
///
/// let packed = codec.compress_words(&page).unwrap();
/// assert!(packed.len() < 32);
/// assert_eq!(codec.decompress_words(&packed).unwrap(), page);
/// ```
#[derive(Debug, Clone)]
pub struct WkCodec<W: Word> {
    config: CodecConfig,
    split: WordSplit<W>,
    index_bits: u32,
}

impl<W: Word> WkCodec<W> {
    /// Validates `config` and builds a codec for it.
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate::<W>()?;
        let index_bits = config.index_bits();
        debug!(
            "wk codec: {}-bit words, {} low bits, {} dictionary {}x{} ({} index bits), stride {}",
            W::BITS,
            config.low_bits,
            config.organization,
            config.num_sets,
            config.set_size,
            index_bits,
            config.stride
        );
        Ok(WkCodec {
            split: WordSplit::new(config.low_bits),
            index_bits,
            config,
        })
    }

    /// The validated configuration this codec was built with.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Bits per packed dictionary index.
    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Words in a page of the configured size.
    pub fn words_per_page(&self) -> usize {
        self.config.words_per_page()
    }

    /// Upper bound on the compressed length of a `num_words` input.
    pub fn max_compressed_words(&self, num_words: usize) -> usize {
        encoder::max_compressed_words(num_words, W::BITS)
    }

    /// Compresses a page given as little-endian bytes.
    pub fn compress(&self, page: &[u8]) -> Result<Vec<u8>> {
        let words = bytes_to_words::<W>(page)?;
        Ok(words_to_bytes(&self.compress_words(&words)?))
    }

    /// Compresses a page into a freshly allocated buffer.
    pub fn compress_words(&self, page: &[W]) -> Result<Vec<W>> {
        self.compress_with_stats(page).map(|(out, _)| out)
    }

    /// Compresses a page and reports how its words were classified.
    pub fn compress_with_stats(&self, page: &[W]) -> Result<(Vec<W>, CompressionStats)> {
        let mut dest = vec![W::zero(); self.max_compressed_words(page.len())];
        let stats = self.compress_page_into(page, &mut dest)?;
        dest.truncate(stats.output_words);
        Ok((dest, stats))
    }

    /// Compresses a page into `dest`, returning the compressed length.
    ///
    /// `dest` must hold [`max_compressed_words`](Self::max_compressed_words)
    /// words for the page length, whatever the page actually compresses to.
    pub fn compress_into(&self, page: &[W], dest: &mut [W]) -> Result<usize> {
        self.compress_page_into(page, dest).map(|stats| stats.output_words)
    }

    fn compress_page_into(&self, page: &[W], dest: &mut [W]) -> Result<CompressionStats> {
        let needed = self.max_compressed_words(page.len());
        if dest.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                available: dest.len(),
            });
        }
        if W::from_count(page.len()).is_none() {
            return Err(Error::InvalidInput(format!(
                "a {}-word page cannot be described by a {}-bit header",
                page.len(),
                W::BITS
            )));
        }

        let mut dict = dictionary::build::<W>(&self.config);
        let streams = model(page, dict.as_mut(), &self.split, self.config.stride);
        trace!(
            "modeled {} words: {} indices at {} bits, {} low fields at {} bits",
            page.len(),
            streams.dict_indices.len(),
            self.index_bits,
            streams.low_bits.len(),
            self.split.low_bits()
        );
        let output_words = encode(&streams, self.index_bits, self.split.low_bits(), dest)?;

        let stats = CompressionStats {
            input_words: page.len(),
            output_words,
            counts: streams.counts,
        };
        debug!(
            "compressed {} words to {} (zero {}, exact {}, partial {}, miss {})",
            stats.input_words,
            stats.output_words,
            stats.counts.zero,
            stats.counts.exact,
            stats.counts.partial,
            stats.counts.miss
        );
        Ok(stats)
    }

    /// Decompresses little-endian bytes back into page bytes.
    pub fn decompress(&self, src: &[u8]) -> Result<Vec<u8>> {
        let words = bytes_to_words::<W>(src)?;
        Ok(words_to_bytes(&self.decompress_words(&words)?))
    }

    /// Decompresses into a freshly allocated page of exactly `num_words`
    /// words.
    pub fn decompress_words(&self, src: &[W]) -> Result<Vec<W>> {
        let streams = parse(src, self.index_bits, self.split.low_bits())?;
        let mut dest = vec![W::zero(); streams.header.num_words];
        let mut dict = dictionary::build::<W>(&self.config);
        replay(&streams, dict.as_mut(), &self.split, self.config.stride, &mut dest)?;
        Ok(dest)
    }

    /// Decompresses into `dest`, returning the number of words written.
    pub fn decompress_into(&self, src: &[W], dest: &mut [W]) -> Result<usize> {
        let streams = parse(src, self.index_bits, self.split.low_bits())?;
        let mut dict = dictionary::build::<W>(&self.config);
        let written = replay(&streams, dict.as_mut(), &self.split, self.config.stride, dest)?;
        debug!("decompressed {} words to {}", src.len(), written);
        Ok(written)
    }
}

impl<W: Word> PageCompression<W> for WkCodec<W> {
    fn compress_page(&self, page: &[W]) -> Result<Vec<W>> {
        self.compress_words(page)
    }

    fn decompress_page(&self, src: &[W]) -> Result<Vec<W>> {
        self.decompress_words(src)
    }

    fn name(&self) -> &'static str {
        "wk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::config::DictionaryOrganization;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn every_organization() -> Vec<CodecConfig> {
        vec![
            CodecConfig::default().with_dictionary(DictionaryOrganization::DirectMapped, 1, 16),
            CodecConfig::default().with_dictionary(
                DictionaryOrganization::FullyAssociativeLinear,
                16,
                1,
            ),
            CodecConfig::default().with_dictionary(
                DictionaryOrganization::FullyAssociativeHashed,
                16,
                1,
            ),
            CodecConfig::default(),
        ]
    }

    /// A page shaped like a heap: pointers into a few regions, small
    /// integers, zeros and the odd random word.
    fn heap_page(rng: &mut StdRng, words: usize) -> Vec<u64> {
        let bases = [0x5555_5555_0000u64, 0x7fff_f7a0_0000, 0x7fff_ffff_e000];
        (0..words)
            .map(|_| match rng.gen_range(0..10) {
                0..=2 => 0,
                3..=5 => bases[rng.gen_range(0..bases.len())] + rng.gen_range(0..0x4000u64) * 8,
                6 | 7 => rng.gen_range(0..256),
                _ => rng.gen(),
            })
            .collect()
    }

    #[test]
    fn test_all_zero_page() {
        for config in every_organization() {
            let codec = WkCodec::<u64>::new(config).unwrap();
            let (packed, stats) = codec.compress_with_stats(&[0u64; 512]).unwrap();
            assert_eq!(packed.len(), 20);
            assert_eq!(&packed[..4], &[512, 20, 20, 20]);
            assert_eq!(stats.counts.zero, 512);
            assert_eq!(codec.decompress_words(&packed).unwrap(), vec![0u64; 512]);
        }
    }

    #[test]
    fn test_repeated_word_page() {
        let value = 0x0123_4567_89ab_cdefu64;
        for config in every_organization() {
            let codec = WkCodec::<u64>::new(config).unwrap();
            let (packed, stats) = codec.compress_with_stats(&[value; 512]).unwrap();
            assert_eq!(stats.counts.miss, 1);
            assert_eq!(stats.counts.exact, 511);
            // 511 four-bit indices, 16 to a word.
            assert_eq!(packed.len(), 4 + 16 + 1 + 32);
            assert_eq!(codec.decompress_words(&packed).unwrap(), vec![value; 512]);
        }
    }

    #[test]
    fn test_shared_high_bits_page() {
        let codec = WkCodec::<u64>::new(CodecConfig::default()).unwrap();
        let mut page = vec![0u64; 512];
        page[0] = 0xffff_0000_0000_0123;
        page[1] = 0xffff_0000_0000_0321;
        let (packed, stats) = codec.compress_with_stats(&page).unwrap();
        assert_eq!(stats.counts.miss, 1);
        assert_eq!(stats.counts.partial, 1);
        assert_eq!(stats.counts.zero, 510);
        assert_eq!(codec.decompress_words(&packed).unwrap(), page);
    }

    #[test]
    fn test_distinct_high_bits_page_stays_within_bound() {
        for config in every_organization() {
            let codec = WkCodec::<u64>::new(config).unwrap();
            let page: Vec<u64> = (1..=512u64).map(|i| i << 32).collect();
            let (packed, stats) = codec.compress_with_stats(&page).unwrap();
            assert_eq!(stats.counts.miss, 512);
            assert_eq!(packed.len(), 4 + 16 + 512);
            assert!(packed.len() <= codec.max_compressed_words(512));
            assert!(packed.len() * 8 <= 2 * 4096);
            assert_eq!(codec.decompress_words(&packed).unwrap(), page);
        }
    }

    #[test]
    fn test_random_pages_round_trip() {
        let mut rng = StdRng::seed_from_u64(7);
        for config in every_organization() {
            for stride in [1, 2, 5] {
                let codec = WkCodec::<u64>::new(config.clone().with_stride(stride)).unwrap();
                for _ in 0..8 {
                    let page = heap_page(&mut rng, 512);
                    let packed = codec.compress_words(&page).unwrap();
                    assert!(packed.len() <= codec.max_compressed_words(page.len()));
                    assert_eq!(codec.decompress_words(&packed).unwrap(), page);
                }
            }
        }
    }

    #[test]
    fn test_fully_random_pages_round_trip() {
        let mut rng = StdRng::seed_from_u64(11);
        let codec = WkCodec::<u64>::new(CodecConfig::default().with_low_bits(16)).unwrap();
        for _ in 0..4 {
            let page: Vec<u64> = (0..512).map(|_| rng.gen()).collect();
            let packed = codec.compress_words(&page).unwrap();
            assert!(packed.len() * 8 <= 2 * 4096);
            assert_eq!(codec.decompress_words(&packed).unwrap(), page);
        }
    }

    #[test]
    fn test_32_bit_pages_round_trip() {
        let mut rng = StdRng::seed_from_u64(3);
        for config in every_organization() {
            let config = CodecConfig {
                word_width: 32,
                ..config
            };
            let codec = WkCodec::<u32>::new(config).unwrap();
            assert_eq!(codec.words_per_page(), 1024);
            let page: Vec<u32> = (0..1024)
                .map(|i| match i % 3 {
                    0 => 0,
                    1 => 0x0804_8000 + rng.gen_range(0..0x1000u32),
                    _ => rng.gen(),
                })
                .collect();
            let packed = codec.compress_words(&page).unwrap();
            assert!(packed.len() * 4 <= 2 * 4096);
            assert_eq!(codec.decompress_words(&packed).unwrap(), page);
        }
    }

    #[test]
    fn test_hashed_and_linear_scan_agree() {
        let mut rng = StdRng::seed_from_u64(19);
        let linear = WkCodec::<u64>::new(CodecConfig::default().with_geometry(64, 1, false)).unwrap();
        let hashed = WkCodec::<u64>::new(CodecConfig::default().with_geometry(64, 1, true)).unwrap();
        for _ in 0..8 {
            let page = heap_page(&mut rng, 512);
            assert_eq!(
                linear.compress_words(&page).unwrap(),
                hashed.compress_words(&page).unwrap()
            );
        }
    }

    #[test]
    fn test_byte_form_round_trip() {
        let mut rng = StdRng::seed_from_u64(5);
        let codec = WkCodec::<u64>::new(CodecConfig::default()).unwrap();
        let page = words_to_bytes(&heap_page(&mut rng, 512));
        let packed = codec.compress(&page).unwrap();
        assert!(packed.len() <= 2 * page.len());
        assert_eq!(codec.decompress(&packed).unwrap(), page);
        assert!(matches!(
            codec.decompress(&packed[..packed.len() - 3]),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn test_caller_buffers() {
        let codec = WkCodec::<u64>::new(CodecConfig::default()).unwrap();
        let page = vec![0x42u64; 512];

        let mut small = vec![0u64; 100];
        assert_eq!(
            codec.compress_into(&page, &mut small),
            Err(Error::BufferTooSmall {
                needed: 534,
                available: 100
            })
        );

        let mut dest = vec![0u64; codec.max_compressed_words(512)];
        let len = codec.compress_into(&page, &mut dest).unwrap();
        let mut out = vec![0u64; 256];
        assert_eq!(
            codec.decompress_into(&dest[..len], &mut out),
            Err(Error::BufferTooSmall {
                needed: 512,
                available: 256
            })
        );
        let mut out = vec![0u64; 600];
        assert_eq!(codec.decompress_into(&dest[..len], &mut out).unwrap(), 512);
        assert_eq!(&out[..512], &page[..]);
    }

    #[test]
    fn test_short_and_empty_pages() {
        let codec = WkCodec::<u64>::new(CodecConfig::default()).unwrap();
        let empty = codec.compress_words(&[]).unwrap();
        assert_eq!(empty, vec![0, 4, 4, 4]);
        assert!(codec.decompress_words(&empty).unwrap().is_empty());

        let page = [9u64, 0, 0xabc_0000_0000];
        let packed = codec.compress_words(&page).unwrap();
        assert_eq!(codec.decompress_words(&packed).unwrap(), page);
    }

    #[test]
    fn test_malformed_headers() {
        let codec = WkCodec::<u64>::new(CodecConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(23);
        let packed = codec.compress_words(&heap_page(&mut rng, 512)).unwrap();

        let mut bad = packed.clone();
        bad[2] = bad[1] - 1;
        assert!(matches!(codec.decompress_words(&bad), Err(Error::MalformedInput(_))));

        let mut bad = packed.clone();
        bad[3] = 1 << 40;
        assert!(matches!(codec.decompress_words(&bad), Err(Error::MalformedInput(_))));

        let mut bad = packed.clone();
        bad[1] = 5;
        assert!(matches!(codec.decompress_words(&bad), Err(Error::MalformedInput(_))));

        assert!(matches!(
            codec.decompress_words(&packed[..packed.len() - 1]),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn test_invalid_configurations() {
        assert!(matches!(
            WkCodec::<u32>::new(CodecConfig::default()),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            WkCodec::<u64>::new(CodecConfig::default().with_stride(0)),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            WkCodec::<u64>::new(CodecConfig::default().with_geometry(3, 5, false)),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            WkCodec::<u64>::new(CodecConfig::default().with_page_bytes(8)),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_stats_ratio() {
        let stats = CompressionStats {
            input_words: 512,
            output_words: 128,
            counts: TagCounts::default(),
        };
        assert_eq!(stats.ratio(), 0.25);
        assert_eq!(CompressionStats::default().ratio(), 0.0);
    }

    #[test]
    fn test_codec_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WkCodec<u32>>();
        assert_send_sync::<WkCodec<u64>>();
    }
}
