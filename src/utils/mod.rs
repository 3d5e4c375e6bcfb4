//! Utility functions and helpers.
//!
//! - [`hash`]: SHA-256 checksums of files and buffers
//! - [`compress`]: reproducible tar.gz creation and extraction
//! - [`paths`]: path containment and resolution helpers

/// SHA-256 hashing
pub mod hash;
/// Tarball creation and extraction (gzip)
pub mod compress;
/// Path manipulation and resolution utilities
pub mod paths;

pub use hash::{FileDigest, hash_bytes, hash_file};
pub use paths::{base_name, make_absolute};
