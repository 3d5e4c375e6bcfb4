//! Error types for the file registry.
//!
//! Library code returns [`RegistryError`] through the crate-wide [`Result`]
//! alias. The command layer converts into [`anyhow::Error`] at the CLI
//! boundary with the `?` operator.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors raised while building, reconciling or packaging a file registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A path does not lie strictly below the source root it was given.
    #[error("{} is not located under source root {}", path.display(), root.display())]
    PathEscapesRoot {
        /// Offending path.
        path: PathBuf,
        /// Source root the path was checked against.
        root: PathBuf,
    },

    /// The content on disk does not hash to the recorded checksum.
    #[error("checksum for {} does not match: expected {expected}, found {actual}", path.display())]
    ChecksumMismatch {
        /// File whose content was hashed.
        path: PathBuf,
        /// Checksum recorded in the manifest.
        expected: String,
        /// Checksum computed from disk.
        actual: String,
    },

    /// No file with matching name and checksum exists under any source root.
    #[error("input file {name} not found in source roots [{}]", join_paths(roots))]
    NotFound {
        /// Base name that was searched for.
        name: String,
        /// Roots that were searched, in order.
        roots: Vec<PathBuf>,
    },

    /// Several equally valid candidates were found; the first one is used.
    ///
    /// Never returned from an operation, only rendered into a warning.
    #[error("found multiple candidates for {name}, using the first: {}", join_paths(candidates))]
    AmbiguousMatch {
        /// Name that was searched for.
        name: String,
        /// All candidates in search order.
        candidates: Vec<PathBuf>,
    },

    /// A required archive is absent from every search directory.
    #[error("archive {name} not found in search directories [{}]", join_paths(search_dirs))]
    ArchiveMissing {
        /// Archive file name.
        name: String,
        /// Directories that were searched.
        search_dirs: Vec<PathBuf>,
    },

    /// The manifest does not have the expected structure.
    #[error("malformed manifest: {0}")]
    ManifestMalformed(String),

    /// The manifest could not be serialized.
    #[error("failed to encode manifest: {0}")]
    ManifestEncode(#[from] serde_yaml::Error),

    /// A rewrite pattern failed to compile.
    #[error("invalid rewrite pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Filesystem access failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl RegistryError {
    /// Wraps an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Converts a directory walk failure, keeping the path when walkdir knows it.
    pub(crate) fn walk(root: &Path, err: walkdir::Error) -> Self {
        let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        Self::Io { path, source }
    }
}

/// Comma separated display form of `paths`
fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
