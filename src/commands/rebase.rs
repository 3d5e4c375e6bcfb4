use super::context::CommandContext;
use crate::RunpackContext;
use crate::output;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Execute rebase command - attach tracked files to new source roots
///
/// Every experiment-specific file (and every static file with
/// `include_static`) must have a checksum-verified copy below `roots`.
/// Nothing is written unless all files are found.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or written, or a file
/// has no verified copy below the new roots.
pub fn execute(
    ctx: &RunpackContext,
    manifest: &Path,
    roots: &[PathBuf],
    include_static: bool,
    update_files: bool,
) -> Result<()> {
    let mut registry = ctx.load_registry(manifest, false)?;
    let before: Vec<PathBuf> = registry.sorted_files().iter().map(|f| f.full_path()).collect();

    registry
        .update_source_roots(roots.to_vec(), update_files, include_static)
        .context("Failed to rebase manifest onto new source roots")?;

    let mut moved = 0;
    for file in registry.sorted_files() {
        let path = file.full_path();
        if !before.contains(&path) {
            moved += 1;
            output::action("relocated", &path.display().to_string());
        }
    }

    ctx.save_registry(&registry, manifest)?;
    output::success(&format!(
        "Rebased {} onto {} root(s), {moved} file(s) relocated",
        manifest.display(),
        roots.len()
    ));
    Ok(())
}
