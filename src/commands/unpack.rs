use crate::RunpackContext;
use crate::output;
use crate::tracking::{FileRegistry, ImportOptions};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Execute unpack command - restore tracked files from archives
///
/// # Errors
///
/// Returns an error if:
/// - The manifest cannot be loaded
/// - A required archive is not found below `search_dirs`
/// - Extraction fails
/// - Verification is enabled and a restored file is missing or corrupted
pub fn execute(
    ctx: &RunpackContext,
    manifest: &Path,
    search_dirs: &[PathBuf],
    output_dir: &Path,
    options: &ImportOptions,
) -> Result<()> {
    let options = ImportOptions {
        static_marker: Some(ctx.config.registry.static_marker.clone()),
        ..options.clone()
    };
    let registry = FileRegistry::import_archives(manifest, search_dirs, output_dir, &options)
        .with_context(|| format!("Failed to restore files from {}", manifest.display()))?;

    for root in registry.source_roots() {
        output::action("restored", &root.display().to_string());
    }
    output::success(&format!(
        "Restored {} file(s) for experiment {}",
        registry.len(),
        registry.experiment_id()
    ));
    Ok(())
}
