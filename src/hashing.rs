//! This module provides a deterministic `HashMap`. The hashing data structures in
//! the standard library are randomly seeded per process, which is not what a reproducible
//! simulation wants.
//!
//! The `hash_str` free function is used to derive per-stream seed offsets in
//! `crate::random`, so it must be stable across runs and platforms.

use xxhash_rust::xxh3::xxh3_64;

pub use rustc_hash::{FxBuildHasher, FxHashMap as HashMap};

/// A convenience method to compute a stable 64-bit hash of a `&str`.
#[must_use]
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}
