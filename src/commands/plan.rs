use super::context::CommandContext;
use crate::RunpackContext;
use crate::output;
use crate::placement;
use anyhow::Result;
use std::path::Path;

/// Execute plan command - print the run directory destination of each file
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or a configured rewrite
/// rule is invalid.
pub fn execute(ctx: &RunpackContext, manifest: &Path, rundir: Option<&Path>) -> Result<()> {
    let registry = ctx.load_registry(manifest, false)?;
    let rules = ctx.rewrite_rules()?;
    let placements = placement::plan(&registry, &rules);

    for entry in &placements {
        let destination = rundir.map_or_else(
            || entry.destination.clone(),
            |dir| dir.join(&entry.destination),
        );
        output::mapping(&entry.source, &destination);
    }

    for duplicate in placement::collisions(&placements) {
        output::warning(&format!(
            "Several files are placed at {}",
            duplicate.display()
        ));
    }
    Ok(())
}
