use super::context::CommandContext;
use crate::RunpackContext;
use crate::output;
use anyhow::Result;
use colored::Colorize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Execute show command - list the files recorded in a manifest
///
/// Files are grouped by source root in priority order. Static files are
/// marked.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or, with `verify`, a
/// file fails checksum verification.
pub fn execute(ctx: &RunpackContext, manifest: &Path, verify: bool) -> Result<()> {
    let registry = ctx.load_registry(manifest, verify)?;

    let static_paths: HashSet<PathBuf> = registry
        .static_files()
        .iter()
        .map(|f| f.full_path())
        .collect();

    println!("{} {}", "experiment".yellow(), registry.experiment_id());
    let document = registry.to_manifest();
    for root in &document.roots {
        println!("{}", root.source_root.display().to_string().bold());
        if root.files.is_empty() {
            println!("  {}", "(no files)".dimmed());
        }
        for (relative, entry) in &root.files {
            let marker = if static_paths.contains(&entry.fullpath) {
                " (static)".cyan().to_string()
            } else {
                String::new()
            };
            let size = entry.size.map_or_else(|| "-".to_string(), |s| s.to_string());
            println!(
                "  {}  {size:>12}  {}{marker}",
                output::short_checksum(entry.sha256sum.as_deref()).dimmed(),
                relative.display()
            );
        }
    }

    output::info(&format!(
        "{} file(s), {} static",
        registry.len(),
        registry.static_files().len()
    ));
    if verify {
        output::success("All checksums verified");
    }
    Ok(())
}
