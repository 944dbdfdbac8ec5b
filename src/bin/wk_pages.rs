//! Compresses a file page by page and reports the sizes.
//!
//! Run with: `cargo run --release --bin wk_pages -- --help`
//!
//! Every whole page is compressed with the WK codec and with the passthrough
//! baseline, decompressed again and compared. A trailing partial page is
//! skipped. Set `RUST_LOG=wkpage=debug` for per-page tag counts.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use wkpage::compression::word::bytes_to_words;
use wkpage::compression::{
    CodecConfig, DictionaryOrganization, PageCompression, Passthrough, WkCodec,
};

#[derive(Debug, Error)]
enum DriverError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Codec(#[from] wkpage::Error),

    #[error("{codec} round trip changed page {page}")]
    RoundTrip { codec: &'static str, page: usize },
}

/// WK page compression driver
#[derive(Parser, Debug)]
#[command(name = "wk_pages", about = "Compress a file page by page with the WK codec")]
struct Args {
    /// File to compress
    file: PathBuf,

    /// Dictionary organization
    #[arg(long, short, default_value_t = DictionaryOrganization::SetAssociative)]
    organization: DictionaryOrganization,

    /// Entries per dictionary set (defaults to the organization's usual geometry)
    #[arg(long)]
    set_size: Option<usize>,

    /// Number of dictionary sets (defaults to the organization's usual geometry)
    #[arg(long)]
    num_sets: Option<usize>,

    /// Low bits recorded on a partial match
    #[arg(long, default_value_t = 10)]
    low_bits: u32,

    /// Word traversal stride
    #[arg(long, default_value_t = 1)]
    stride: usize,

    /// Page size in bytes
    #[arg(long, default_value_t = 4096)]
    page_bytes: usize,
}

impl Args {
    fn config(&self) -> CodecConfig {
        let (set_size, num_sets) = match self.organization {
            DictionaryOrganization::DirectMapped => (1, 16),
            DictionaryOrganization::SetAssociative => (4, 4),
            DictionaryOrganization::FullyAssociativeLinear
            | DictionaryOrganization::FullyAssociativeHashed => (16, 1),
        };
        CodecConfig::default()
            .with_dictionary(
                self.organization,
                self.set_size.unwrap_or(set_size),
                self.num_sets.unwrap_or(num_sets),
            )
            .with_low_bits(self.low_bits)
            .with_stride(self.stride)
            .with_page_bytes(self.page_bytes)
    }
}

fn init_logging() {
    // Also installs the `log` bridge, so the codec's records reach the subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn round_trip(
    codec: &dyn PageCompression<u64>,
    page: &[u64],
    n: usize,
) -> Result<usize, DriverError> {
    let packed = codec.compress_page(page)?;
    if codec.decompress_page(&packed)? != page {
        return Err(DriverError::RoundTrip {
            codec: codec.name(),
            page: n,
        });
    }
    Ok(packed.len())
}

fn read_pages(path: &Path, page_bytes: usize) -> Result<Vec<u64>, DriverError> {
    let bytes = std::fs::read(path).map_err(|source| DriverError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let whole = bytes.len() - bytes.len() % page_bytes;
    Ok(bytes_to_words::<u64>(&bytes[..whole])?)
}

fn run(args: &Args) -> Result<(), DriverError> {
    let wk = WkCodec::<u64>::new(args.config())?;
    let store = Passthrough::<u64>::new();
    let page_bytes = wk.config().page_bytes;
    let words = read_pages(&args.file, page_bytes)?;

    let mut total_wk = 0;
    let mut total_store = 0;
    let mut pages = 0;
    for (n, page) in words.chunks(wk.words_per_page()).enumerate() {
        let wk_words = round_trip(&wk, page, n)?;
        let store_words = round_trip(&store, page, n)?;
        println!(
            "page {}: compressed {} bytes to {} bytes ({} stored)",
            n,
            page_bytes,
            wk_words * 8,
            store_words * 8
        );
        total_wk += wk_words * 8;
        total_store += store_words * 8;
        pages += 1;
    }

    let input = pages * page_bytes;
    println!(
        "{} pages, {} bytes: {} compressed {} bytes ({:.3}), passthrough {} bytes",
        pages,
        input,
        args.organization,
        total_wk,
        if input == 0 { 0.0 } else { total_wk as f64 / input as f64 },
        total_store
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    /// Flips one word on the way back out.
    struct Corrupting;

    impl PageCompression<u64> for Corrupting {
        fn compress_page(&self, page: &[u64]) -> wkpage::Result<Vec<u64>> {
            Ok(page.to_vec())
        }

        fn decompress_page(&self, src: &[u64]) -> wkpage::Result<Vec<u64>> {
            let mut out = src.to_vec();
            if let Some(first) = out.first_mut() {
                *first ^= 1;
            }
            Ok(out)
        }

        fn name(&self) -> &'static str {
            "corrupting"
        }
    }

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_codec_defaults() {
        let args = Args::parse_from(["wk_pages", "core.bin"]);
        assert_eq!(args.file, PathBuf::from("core.bin"));
        assert_eq!(args.config(), CodecConfig::default());
    }

    #[test]
    fn test_organization_and_overrides() {
        let args = Args::parse_from([
            "wk_pages",
            "core.bin",
            "--organization",
            "fully-associative-hashed",
            "--set-size",
            "64",
            "--low-bits",
            "12",
            "--stride",
            "2",
        ]);
        let config = args.config();
        assert_eq!(config.organization, DictionaryOrganization::FullyAssociativeHashed);
        assert_eq!((config.set_size, config.num_sets), (64, 1));
        assert_eq!(config.low_bits, 12);
        assert_eq!(config.stride, 2);
        assert!(WkCodec::<u64>::new(config).is_ok());
    }

    #[test]
    fn test_unknown_organization_rejected() {
        assert!(Args::try_parse_from(["wk_pages", "f", "-o", "lru"]).is_err());
        assert!(Args::try_parse_from(["wk_pages"]).is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let args = Args::parse_from(["wk_pages", "/nonexistent/wk_pages/input"]);
        let err = run(&args).unwrap_err();
        assert!(matches!(err, DriverError::Io { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_bad_config_is_codec_error() {
        let args = Args::parse_from(["wk_pages", "f", "--stride", "0"]);
        assert!(matches!(
            run(&args),
            Err(DriverError::Codec(wkpage::Error::InvalidConfiguration(_)))
        ));
    }

    #[test]
    fn test_round_trip_mismatch_is_reported() {
        let page = vec![7u64; 512];
        let err = round_trip(&Corrupting, &page, 3).unwrap_err();
        assert!(matches!(
            err,
            DriverError::RoundTrip {
                codec: "corrupting",
                page: 3
            }
        ));
        assert_eq!(round_trip(&Passthrough::<u64>::new(), &page, 0).unwrap(), 513);
    }
}
