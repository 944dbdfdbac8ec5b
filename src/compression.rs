//! Page compression.
//!
//! This module implements the WK family of page compressors: a word is
//! compared against a small dictionary of recently seen words and recorded as
//! a 2-bit tag plus whatever the decoder cannot infer (a dictionary index,
//! the low bits of a near match, or the whole word).
//!
//! - [`bit_packer`]: k-bit field packing shared by every packed area
//! - [`dictionary`]: the four dictionary organizations
//! - [`modeler`], [`encoder`], [`decoder`]: the compression pipeline
//! - [`codec`]: the configured, reusable [`WkCodec`]
//! - [`passthrough`]: an uncompressed baseline with the same interface
//!
//! # Examples
//!
//! ```rust
//! use wkpage::compression::{CodecConfig, PageCompression, Passthrough, WkCodec};
//!
//! let page: Vec<u64> = (0..512).map(|i| if i % 2 == 0 { 0 } else { i }).collect();
//! let codecs: Vec<Box<dyn PageCompression<u64>>> = vec![
//!     Box::new(WkCodec::<u64>::new(CodecConfig::default()).unwrap()),
//!     Box::new(Passthrough::<u64>::new()),
//! ];
//! for codec in &codecs {
//!     let packed = codec.compress_page(&page).unwrap();
//!     assert_eq!(codec.decompress_page(&packed).unwrap(), page);
//! }
//! ```

pub use crate::error::Result;

/// Trait for page compressors
pub trait PageCompression<W: Word>: Send + Sync {
    /// Compress one page of words
    fn compress_page(&self, page: &[W]) -> Result<Vec<W>>;

    /// Decompress a buffer produced by `compress_page`
    fn decompress_page(&self, src: &[W]) -> Result<Vec<W>>;

    /// Short name used in reports
    fn name(&self) -> &'static str;
}

#[cfg(feature = "parallel")]
pub mod batch;
pub mod bit_packer;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod dictionary;
pub mod encoder;
pub mod modeler;
pub mod passthrough;
pub mod word;

pub use codec::{CompressionStats, WkCodec};
pub use config::{CodecConfig, DictionaryOrganization, WordSplit};
pub use dictionary::Dictionary;
pub use modeler::{Tag, TagCounts};
pub use passthrough::Passthrough;
pub use word::Word;
