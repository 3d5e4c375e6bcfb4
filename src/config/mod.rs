//! User configuration for runpack.
//!
//! Stored as TOML, by default at `~/.config/runpack/config.toml`:
//!
//! ```toml
//! [search]
//! roots = ["/scratch/inputs", "/perm/shared"]
//!
//! [registry]
//! static_marker = "ifsdata"
//!
//! [archive]
//! compression_level = 6
//!
//! [log]
//! level = "warn"
//!
//! [[rewrite]]
//! kind = "dir"
//! pattern = "rtables"
//! replacement = "rtables${child}"
//! mode = "exact"
//! ```

use crate::rewrite::{NameMatch, PathRewriteRule};
use crate::{DEFAULT_COMPRESSION_LEVEL, STATIC_DATA_DIR};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Runpack settings, one TOML table per concern
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub archive: ArchiveConfig,

    #[serde(default)]
    pub log: LogConfig,

    /// Ordered rewrite rules used to place files in a run directory
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rewrite: Vec<RewriteRuleConfig>,
}

/// `[search]`: where new registries look for files
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SearchConfig {
    /// Default source roots for new registries, in priority order
    #[serde(default)]
    pub roots: Vec<PathBuf>,
}

/// `[registry]`: static data recognition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Directory name marking shared static input data
    #[serde(default = "default_static_marker")]
    pub static_marker: String,
}

/// `[archive]`: export settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveConfig {
    /// Gzip level, 0 (store) to 9 (best)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

/// `[log]`: logging defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Default `tracing` filter when `RUNPACK_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Which path segment a rewrite rule anchors on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Match against the final path segment
    File,
    /// Match against a directory segment
    Dir,
}

/// One `[[rewrite]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewriteRuleConfig {
    /// Segment the pattern anchors on
    pub kind: RuleKind,
    /// Regex fragment for the segment name
    pub pattern: String,
    /// Template using `${group}` references
    pub replacement: String,
    /// How the fragment must align with the segment name
    #[serde(default)]
    pub mode: NameMatch,
}

impl RewriteRuleConfig {
    /// Compile into a [`PathRewriteRule`]
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern does not compile.
    pub fn compile(&self) -> Result<PathRewriteRule> {
        let rule = match self.kind {
            RuleKind::File => {
                PathRewriteRule::from_filename(&self.pattern, self.replacement.clone(), self.mode)
            }
            RuleKind::Dir => {
                PathRewriteRule::from_dirname(&self.pattern, self.replacement.clone(), self.mode)
            }
        };
        rule.with_context(|| format!("Invalid rewrite pattern: {}", self.pattern))
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            static_marker: default_static_marker(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a file, writing defaults if it is missing
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot read or parse the configuration file
    /// - The configuration fails [`Config::validate`]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Check value ranges and rule patterns
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.archive.compression_level > 9 {
            anyhow::bail!(
                "Compression level must be between 0 and 9, got {}",
                self.archive.compression_level
            );
        }
        if self.registry.static_marker.is_empty() || self.registry.static_marker.contains('/') {
            anyhow::bail!(
                "Static marker must be a single directory name, got '{}'",
                self.registry.static_marker
            );
        }
        self.rules()?;
        Ok(())
    }

    /// Compile the configured rewrite rules, preserving order
    ///
    /// # Errors
    ///
    /// Returns an error if any pattern does not compile.
    pub fn rules(&self) -> Result<Vec<PathRewriteRule>> {
        self.rewrite.iter().map(RewriteRuleConfig::compile).collect()
    }
}

/// Default config location below the home directory
#[must_use]
pub fn default_config_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    home.join(crate::DEFAULT_CONFIG_PATH)
}

/// Serde default for `registry.static_marker`
fn default_static_marker() -> String {
    STATIC_DATA_DIR.to_string()
}

/// Serde default for `archive.compression_level`
const fn default_compression_level() -> u32 {
    DEFAULT_COMPRESSION_LEVEL
}

/// Serde default for `log.level`
fn default_log_level() -> String {
    "warn".to_string()
}
