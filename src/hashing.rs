//! Hash functions used by the dictionary organizations.

pub mod fnv;
pub use fnv::{bucket_for, fnv64a_pattern, FnvBuildHasher, FnvHasher};
