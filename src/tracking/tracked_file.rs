//! A single input file, identified by content.

use crate::error::{RegistryError, Result};
use crate::tracking::manifest::ManifestEntry;
use crate::utils::hash::hash_file;
use crate::utils::paths::strict_relative;
use std::ffi::OsStr;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Identity used for equality and hashing of a [`TrackedFile`].
///
/// Files carrying a checksum are identified by it; files whose metadata is
/// still pending fall back to their absolute location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileIdentity<'a> {
    /// Content identity
    ByChecksum(&'a str),
    /// Location identity
    ByPath(PathBuf),
}

/// Immutable record of one input file relative to the source root it was
/// found under.
///
/// Two files compare equal when both carry a checksum and the checksums
/// agree, wherever they live. When either side has no checksum the absolute
/// paths are compared instead.
#[derive(Debug, Clone)]
pub struct TrackedFile {
    /// Path below `source_root`, never empty and never escaping it
    relative_path: PathBuf,
    /// Directory the file was located under
    source_root: PathBuf,
    /// Lowercase hex SHA-256 of the content
    checksum: Option<String>,
    /// Content length in bytes
    size: Option<u64>,
}

impl TrackedFile {
    /// Create a tracked file for `path` below `source_root`
    ///
    /// A relative `path` is interpreted against `source_root`. With
    /// `compute_metadata` the file is hashed and its size recorded;
    /// otherwise both stay pending.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PathEscapesRoot`] if `path` is not a strict
    /// descendant of `source_root`, or an I/O error if hashing fails.
    pub fn new(path: &Path, source_root: &Path, compute_metadata: bool) -> Result<Self> {
        let full_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            source_root.join(path)
        };
        let relative_path =
            strict_relative(&full_path, source_root).ok_or_else(|| RegistryError::PathEscapesRoot {
                path: full_path.clone(),
                root: source_root.to_path_buf(),
            })?;

        let (checksum, size) = if compute_metadata {
            let digest = hash_file(&full_path)?;
            (Some(digest.checksum), Some(digest.size))
        } else {
            (None, None)
        };

        Ok(Self {
            relative_path,
            source_root: source_root.to_path_buf(),
            checksum,
            size,
        })
    }

    /// Rebuild a tracked file from a manifest record
    ///
    /// With `verify_checksum` the file is re-hashed and must match the
    /// recorded checksum; otherwise the recorded checksum and size are
    /// trusted as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `entry.fullpath` is not below `source_root` ([`RegistryError::PathEscapesRoot`])
    /// - `relative_path` disagrees with `entry.fullpath` ([`RegistryError::ManifestMalformed`])
    /// - verification is requested and the content differs ([`RegistryError::ChecksumMismatch`])
    pub fn from_manifest_entry(
        relative_path: &Path,
        entry: &ManifestEntry,
        source_root: &Path,
        verify_checksum: bool,
    ) -> Result<Self> {
        let mut file = Self::new(&entry.fullpath, source_root, verify_checksum)?;
        if file.relative_path != relative_path {
            return Err(RegistryError::ManifestMalformed(format!(
                "key {} does not match fullpath {}",
                relative_path.display(),
                entry.fullpath.display()
            )));
        }

        if verify_checksum {
            if entry.sha256sum != file.checksum {
                return Err(RegistryError::ChecksumMismatch {
                    path: entry.fullpath.clone(),
                    expected: entry.sha256sum.clone().unwrap_or_default(),
                    actual: file.checksum.unwrap_or_default(),
                });
            }
        } else {
            file.checksum.clone_from(&entry.sha256sum);
            file.size = entry.size;
        }
        Ok(file)
    }

    /// Manifest record for this file, keyed by its relative path
    #[must_use]
    pub fn to_manifest_entry(&self) -> (PathBuf, ManifestEntry) {
        (
            self.relative_path.clone(),
            ManifestEntry {
                fullpath: self.full_path(),
                sha256sum: self.checksum.clone(),
                size: self.size,
            },
        )
    }

    /// Identity tag used by `Eq` and `Hash`
    #[must_use]
    pub fn identity(&self) -> FileIdentity<'_> {
        match &self.checksum {
            Some(checksum) => FileIdentity::ByChecksum(checksum),
            None => FileIdentity::ByPath(self.full_path()),
        }
    }

    /// Absolute location: `source_root` joined with `relative_path`
    #[must_use]
    pub fn full_path(&self) -> PathBuf {
        self.source_root.join(&self.relative_path)
    }

    /// Location below the source root
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Root the file is attached to
    #[must_use]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Lowercase hex SHA-256, if computed
    #[must_use]
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    /// Size in bytes, if computed
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        self.size
    }

    /// Base name of the file
    #[must_use]
    pub fn file_name(&self) -> &OsStr {
        // strict_relative guarantees a final normal component
        self.relative_path.file_name().unwrap_or_default()
    }

    /// Whether any directory above the file is named `marker`
    #[must_use]
    pub fn is_below_marker(&self, marker: &str) -> bool {
        let full_path = self.full_path();
        full_path
            .parent()
            .is_some_and(|parent| parent.components().any(|c| c.as_os_str() == marker))
    }
}

impl PartialEq for TrackedFile {
    fn eq(&self, other: &Self) -> bool {
        match (&self.checksum, &other.checksum) {
            (Some(a), Some(b)) => a == b,
            _ => self.full_path() == other.full_path(),
        }
    }
}

impl Eq for TrackedFile {}

impl Hash for TrackedFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}
