pub mod compression;
pub mod error;
pub mod hashing;

pub use compression::{CodecConfig, DictionaryOrganization, PageCompression, WkCodec};
pub use error::{Error, Result};
