#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # Runpack - input file registry for simulation runs
//!
//! Runpack records exactly which input files a simulation experiment
//! depends on, identifies them by SHA-256 content hash rather than by
//! location, and moves that set between machines and directory layouts.
//!
//! ## Features
//!
//! - **Content identity**: files are matched by checksum, so a relocated copy
//!   is recognised as the same input
//! - **Prioritised search roots**: files are re-attached to the first root
//!   holding a verified copy
//! - **YAML manifests**: a registry round-trips through a human readable file
//! - **Reproducible archives**: one tarball per source root plus an optional
//!   archive of shared static data
//! - **Placement planning**: regex rewrite rules map input paths onto a run
//!   directory layout
//!
//! ## Architecture
//!
//! - [`tracking`]: tracked files, the registry, manifests and name search
//! - [`rewrite`]: path rewrite rules
//! - [`placement`]: destination planning from rewrite rules
//! - [`config`]: TOML configuration
//! - [`commands`]: CLI command implementations
//! - [`output`]: user-facing messages
//! - [`utils`]: hashing, archives and path helpers
//!
//! ## Example Usage
//!
//! ```no_run
//! use runpack::tracking::{FileRegistry, ImportOptions};
//! use std::path::{Path, PathBuf};
//!
//! # fn main() -> runpack::error::Result<()> {
//! let mut registry = FileRegistry::new("hz9n", vec![PathBuf::from("/scratch/hz9n")]);
//! registry.add_files(&[Path::new("/scratch/hz9n/ICMGGhz9nINIT")], true)?;
//! registry.save_manifest(Path::new("hz9n.yml"))?;
//! registry.export_archives(Path::new("archives"), true)?;
//!
//! let restored = FileRegistry::import_archives(
//!     Path::new("hz9n.yml"),
//!     &[PathBuf::from("archives")],
//!     Path::new("/tmp/hz9n"),
//!     &ImportOptions {
//!         include_static: true,
//!         verify_checksum: true,
//!         ..ImportOptions::default()
//!     },
//! )?;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Configuration loading, validation and defaults.
pub mod config;

/// Error type shared by the library.
pub mod error;

/// User-facing output helpers.
pub mod output;

/// Destination planning for tracked files.
pub mod placement;

/// Regex based path rewrite rules.
pub mod rewrite;

/// Tracked files, registries and manifests.
pub mod tracking;

/// Hashing, archive and path helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the runpack binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/runpack/config.toml";

/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "RUNPACK_CONFIG_PATH";

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "RUNPACK_LOG";

/// Directory name marking shared static input data.
pub const STATIC_DATA_DIR: &str = "ifsdata";

/// Archive base name for files whose source root has no final segment.
pub const FALLBACK_ARCHIVE_BASE: &str = "other";

/// Gzip level used for archives unless configured otherwise.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Central context for all runpack commands.
///
/// Holds the configuration file location and the loaded settings.
///
/// # Examples
///
/// ```no_run
/// use runpack::RunpackContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Default location, honouring RUNPACK_CONFIG_PATH
/// let ctx = RunpackContext::new()?;
///
/// // Explicit location (for testing)
/// let ctx = RunpackContext::new_explicit("/tmp/runpack/config.toml".into())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RunpackContext {
    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl RunpackContext {
    /// Creates a new `RunpackContext` by loading the configuration from the
    /// default path or `RUNPACK_CONFIG_PATH`.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or if the
    /// configuration file cannot be read, created or validated.
    pub fn new() -> Result<Self> {
        let config_path = if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            PathBuf::from(path)
        } else {
            let home = dirs::home_dir().context("Could not find home directory")?;
            home.join(DEFAULT_CONFIG_PATH)
        };
        Self::new_explicit(config_path)
    }

    /// Creates a new `RunpackContext` from an explicit configuration path.
    /// A missing file is created with defaults.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or created.
    pub fn new_explicit(config_path: PathBuf) -> Result<Self> {
        let config = config::Config::load(&config_path).with_context(|| {
            format!("Failed to load configuration: {}", config_path.display())
        })?;
        Ok(Self {
            config_path,
            config,
        })
    }

    /// Source roots to use when the command line names none.
    #[must_use]
    pub fn default_roots(&self) -> Vec<PathBuf> {
        self.config.search.roots.clone()
    }

    /// Apply the configured static marker and compression level to a registry.
    #[must_use]
    pub fn configure(&self, registry: tracking::FileRegistry) -> tracking::FileRegistry {
        registry
            .with_static_marker(self.config.registry.static_marker.clone())
            .with_compression_level(self.config.archive.compression_level)
    }
}
