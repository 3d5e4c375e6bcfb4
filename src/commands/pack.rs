use super::context::CommandContext;
use crate::RunpackContext;
use crate::output;
use anyhow::{Context, Result};
use std::path::Path;

/// Execute pack command - write one archive per source root
///
/// The manifest is copied next to the archives so the output directory is
/// self-contained.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or an archive cannot
/// be written.
pub fn execute(ctx: &RunpackContext, manifest: &Path, output_dir: &Path, include_static: bool) -> Result<()> {
    let registry = ctx.load_registry(manifest, false)?;
    if registry.is_empty() {
        output::warning("Manifest tracks no files, nothing to pack");
        return Ok(());
    }

    let archives = registry
        .export_archives(output_dir, include_static)
        .with_context(|| format!("Failed to write archives to {}", output_dir.display()))?;
    for archive in &archives {
        output::action("packed", &archive.display().to_string());
    }

    if let Some(name) = manifest.file_name() {
        let copy = output_dir.join(name);
        ctx.save_registry(&registry, &copy)?;
        output::verbose(&format!("wrote {}", copy.display()));
    }

    output::success(&format!(
        "Wrote {} archive(s) to {}",
        archives.len(),
        output_dir.display()
    ));
    Ok(())
}
