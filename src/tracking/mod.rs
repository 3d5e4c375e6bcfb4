//! Content-addressed tracking of experiment input files.
//!
//! - [`TrackedFile`]: one file, identified by its SHA-256 checksum
//! - [`FileRegistry`]: the set of files an experiment needs, plus the
//!   ordered source roots they are attached to
//! - [`Manifest`]: the YAML form of a registry
//! - [`NameScanner`]: deterministic name search used by rebasing and import
//!
//! # Usage
//!
//! ```no_run
//! use runpack::tracking::FileRegistry;
//! use std::path::{Path, PathBuf};
//!
//! # fn main() -> runpack::error::Result<()> {
//! let mut registry = FileRegistry::new("hz9n", vec![PathBuf::from("/scratch/hz9n")]);
//! registry.add_files(&[Path::new("/tmp/ICMGGhz9nINIT")], true)?;
//! registry.save_manifest(Path::new("/tmp/hz9n.yml"))?;
//! # Ok(())
//! # }
//! ```

/// YAML manifest document
pub mod manifest;
/// The file registry and rebasing
pub mod registry;
/// Name based file search
pub mod scanner;
/// A single tracked file
pub mod tracked_file;

pub use manifest::{Manifest, ManifestEntry, ManifestRoot};
pub use registry::{FileRegistry, ImportOptions, rebase};
pub use scanner::NameScanner;
pub use tracked_file::{FileIdentity, TrackedFile};
