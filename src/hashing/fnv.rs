//! # FNV-1a hashing of word patterns
//!
//! The dictionaries select sets by hashing the high bits of a word, and the
//! hashed fully-associative dictionary keys its index map by the same high
//! bits. Both use 64-bit FNV-1a: cheap, deterministic across runs and
//! platforms (the compressor and decompressor must pick the same set), and
//! good enough at spreading the low-entropy patterns found in pointer-heavy
//! pages.
//!
//! **Note**: FNV is not cryptographically secure, and the dictionaries never
//! see adversarial key sets large enough for that to matter.

use std::hash::{BuildHasher, Hasher};

/// Offset basis and prime for 64-bit FNV-1a.
const FNV64_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV64_PRIME: u64 = 0x100000001b3;

/// Hasher implementing 64-bit FNV-1a.
#[derive(Debug, Clone, Copy)]
pub struct FnvHasher {
    state: u64,
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self {
            state: FNV64_OFFSET_BASIS,
        }
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            // FNV-1a: state = state ^ b, then state = state * prime
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(FNV64_PRIME);
        }
    }
}

/// `BuildHasher` producing [`FnvHasher`]s, for `HashMap`s keyed by word
/// patterns.
#[derive(Debug, Clone, Copy, Default)]
pub struct FnvBuildHasher;

impl BuildHasher for FnvBuildHasher {
    type Hasher = FnvHasher;

    fn build_hasher(&self) -> Self::Hasher {
        FnvHasher::default()
    }
}

/// Returns the 64-bit FNV-1a hash of a pattern's little-endian bytes.
#[inline]
pub fn fnv64a_pattern(pattern: u64) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(&pattern.to_le_bytes());
    hasher.finish()
}

/// Maps a pattern onto one of `buckets` buckets.
///
/// The all-zero pattern always lands in bucket 0, so small values (whose high
/// bits are zero) share a predictable home.
#[inline]
pub fn bucket_for(pattern: u64, buckets: usize) -> usize {
    if pattern == 0 || buckets <= 1 {
        return 0;
    }
    (fnv64a_pattern(pattern) % buckets as u64) as usize
}
