//! Destination planning for tracked files inside a run directory.
//!
//! Each file's absolute path is passed through an ordered list of rewrite
//! rules. The first rule that changes the path decides the destination; a
//! file no rule changes lands at its base name. Copying or linking the file
//! is left to the caller.

use crate::rewrite::PathRewriteRule;
use crate::tracking::FileRegistry;
use std::path::{Path, PathBuf};

/// One planned file placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Absolute location of the tracked file
    pub source: PathBuf,
    /// Destination relative to the run directory
    pub destination: PathBuf,
}

/// Destination of `path` under `rules`
#[must_use]
pub fn destination_for(path: &Path, rules: &[PathRewriteRule]) -> PathBuf {
    let source = path.to_string_lossy();
    for rule in rules {
        let rewritten = rule.apply(&source);
        if rewritten != source {
            return PathBuf::from(rewritten.into_owned());
        }
    }
    path.file_name().map_or_else(|| path.to_path_buf(), PathBuf::from)
}

/// Plan the placement of every file in `registry`, ordered by source path
#[must_use]
pub fn plan(registry: &FileRegistry, rules: &[PathRewriteRule]) -> Vec<Placement> {
    registry
        .sorted_files()
        .into_iter()
        .map(|file| {
            let source = file.full_path();
            let destination = destination_for(&source, rules);
            Placement {
                source,
                destination,
            }
        })
        .collect()
}

/// Destinations claimed by more than one source
#[must_use]
pub fn collisions(placements: &[Placement]) -> Vec<&Path> {
    let mut destinations: Vec<&Path> = placements.iter().map(|p| p.destination.as_path()).collect();
    destinations.sort_unstable();
    let mut duplicates: Vec<&Path> = destinations
        .windows(2)
        .filter(|pair| pair[0] == pair[1])
        .map(|pair| pair[0])
        .collect();
    duplicates.dedup();
    duplicates
}
