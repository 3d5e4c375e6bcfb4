use super::context::CommandContext;
use crate::RunpackContext;
use crate::output;
use crate::tracking::FileRegistry;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Execute add command - track files in a manifest
///
/// An existing manifest is extended; otherwise a new one is created for
/// `experiment`. Explicit `roots` replace the registry's source roots before
/// the files are added, without moving files already tracked.
///
/// # Errors
///
/// Returns an error if:
/// - The manifest is new and no experiment id was given
/// - A path does not exist
/// - A file has no verified copy under the source roots
/// - The manifest cannot be written
pub fn execute(
    ctx: &RunpackContext,
    manifest: &Path,
    experiment: Option<&str>,
    roots: &[PathBuf],
    paths: &[PathBuf],
    compute_metadata: bool,
) -> Result<()> {
    let mut registry = if manifest.exists() {
        let mut registry = ctx.load_registry(manifest, false)?;
        if let Some(experiment) = experiment
            && experiment != registry.experiment_id()
        {
            anyhow::bail!(
                "Manifest {} belongs to experiment '{}', not '{experiment}'",
                manifest.display(),
                registry.experiment_id()
            );
        }
        if !roots.is_empty() {
            registry.update_source_roots(roots.to_vec(), false, false)?;
        }
        registry
    } else {
        let experiment = experiment.context("An experiment id is required for a new manifest")?;
        let roots = if roots.is_empty() {
            ctx.default_roots()
        } else {
            roots.to_vec()
        };
        ctx.configure(FileRegistry::new(experiment, roots))
    };

    if compute_metadata {
        for path in paths {
            if !path.is_file() {
                anyhow::bail!("Path is not a file: {}", path.display());
            }
        }
    }

    let before = registry.len();
    registry.add_files(paths, compute_metadata)?;
    let added = registry.len() - before;

    for file in registry.sorted_files() {
        output::verbose(&format!(
            "  {} {}",
            output::short_checksum(file.checksum()),
            file.full_path().display()
        ));
    }

    ctx.save_registry(&registry, manifest)?;
    output::success(&format!(
        "Tracked {added} new file(s) in {} ({} total)",
        manifest.display(),
        registry.len()
    ));
    Ok(())
}
