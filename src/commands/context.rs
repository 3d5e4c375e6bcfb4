use anyhow::{Context, Result};
use std::path::Path;

use crate::RunpackContext;
use crate::rewrite::PathRewriteRule;
use crate::tracking::FileRegistry;

/// Trait providing common operations for command modules
pub trait CommandContext {
    /// Loads the registry stored in `manifest`, applying configured settings
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or, with `verify`,
    /// if a file no longer matches its checksum
    fn load_registry(&self, manifest: &Path, verify: bool) -> Result<FileRegistry>;

    /// Writes `registry` to `manifest`
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be written
    fn save_registry(&self, registry: &FileRegistry, manifest: &Path) -> Result<()>;

    /// Compiles the configured rewrite rules
    ///
    /// # Errors
    ///
    /// Returns an error if a rule pattern is invalid
    fn rewrite_rules(&self) -> Result<Vec<PathRewriteRule>>;
}

impl CommandContext for RunpackContext {
    fn load_registry(&self, manifest: &Path, verify: bool) -> Result<FileRegistry> {
        let registry = FileRegistry::load_manifest(manifest, verify)
            .with_context(|| format!("Failed to load manifest: {}", manifest.display()))?;
        Ok(self.configure(registry))
    }

    fn save_registry(&self, registry: &FileRegistry, manifest: &Path) -> Result<()> {
        registry
            .save_manifest(manifest)
            .with_context(|| format!("Failed to write manifest: {}", manifest.display()))
    }

    fn rewrite_rules(&self) -> Result<Vec<PathRewriteRule>> {
        self.config.rules()
    }
}
