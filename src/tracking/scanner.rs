//! Recursive name search over source roots and archive search directories.
//!
//! Both rebasing and archive import need the same primitive: "every file
//! called `name` below these directories, in an order that does not depend on
//! the filesystem". The scanner walks each directory with entries sorted by
//! file name and yields matches directory by directory, in the order the
//! directories were given.

use crate::error::{RegistryError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Scanner for locating files by base name
pub struct NameScanner {
    /// Whether to follow symbolic links while walking
    follow_symlinks: bool,
}

impl NameScanner {
    /// Create a new scanner
    #[must_use]
    pub const fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }

    /// All files named `name` below `dir`, in sorted traversal order
    ///
    /// A missing directory yields no matches rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory entry cannot be read.
    pub fn find_in(&self, dir: &Path, name: &OsStr) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "search directory does not exist");
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in WalkDir::new(dir)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| RegistryError::walk(dir, e))?;
            if entry.file_name() == name && !entry.file_type().is_dir() {
                matches.push(entry.into_path());
            }
        }
        Ok(matches)
    }

    /// All files named `name` below any of `dirs`, grouped by directory in
    /// the given order
    ///
    /// # Errors
    ///
    /// Returns an error if a directory entry cannot be read.
    pub fn find_all(&self, dirs: &[PathBuf], name: &OsStr) -> Result<Vec<PathBuf>> {
        let mut matches = Vec::new();
        for dir in dirs {
            matches.extend(self.find_in(dir, name)?);
        }
        Ok(matches)
    }
}

impl Default for NameScanner {
    fn default() -> Self {
        Self::new(true)
    }
}
