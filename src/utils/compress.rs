use crate::error::{RegistryError, Result};
use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// File name suffix of every archive produced by [`create_archive`].
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Archive file name for a given base name (`<base>.tar.gz`).
#[must_use]
pub fn archive_name(base: &str) -> String {
    format!("{base}{ARCHIVE_SUFFIX}")
}

/// Create a gzip compressed tarball of `files`, interpreted relative to `base_dir`
///
/// Entries are written in sorted order with deterministic headers, so the
/// same inputs always produce the same archive bytes. Symbolic links are
/// followed and their target content is archived.
///
/// # Errors
///
/// Returns an error if:
/// - The output file cannot be created
/// - Any input file cannot be read
/// - Finalizing the gzip stream fails
pub fn create_archive(
    output_path: &Path,
    base_dir: &Path,
    files: &[PathBuf],
    level: u32,
) -> Result<u64> {
    let output = File::create(output_path).map_err(|e| RegistryError::io(output_path, e))?;
    let gz = GzBuilder::new()
        .mtime(0)
        .write(BufWriter::new(output), Compression::new(level));
    let mut tar = tar::Builder::new(gz);
    tar.mode(tar::HeaderMode::Deterministic);
    tar.follow_symlinks(true);

    let mut sorted: Vec<&PathBuf> = files.iter().collect();
    sorted.sort();
    sorted.dedup();

    for relative in &sorted {
        let source = base_dir.join(relative);
        tar.append_path_with_name(&source, relative)
            .map_err(|e| RegistryError::io(&source, e))?;
    }

    let gz = tar
        .into_inner()
        .map_err(|e| RegistryError::io(output_path, e))?;
    gz.finish().map_err(|e| RegistryError::io(output_path, e))?;

    tracing::info!(
        archive = %output_path.display(),
        entries = sorted.len(),
        "created archive"
    );
    Ok(sorted.len() as u64)
}

/// Extract a gzip compressed tarball into `output_dir`
///
/// The destination does not need to be empty: existing files are
/// overwritten. `output_dir` is created when missing.
///
/// # Errors
///
/// Returns an error if:
/// - The archive cannot be opened or is not a valid tar.gz
/// - The output directory cannot be created
/// - An entry cannot be written
pub fn extract_archive(archive_path: &Path, output_dir: &Path) -> Result<()> {
    super::paths::ensure_dir(output_dir)?;

    let input = File::open(archive_path).map_err(|e| RegistryError::io(archive_path, e))?;
    let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(input)));
    archive.set_overwrite(true);
    archive
        .unpack(output_dir)
        .map_err(|e| RegistryError::io(archive_path, e))?;

    tracing::info!(
        archive = %archive_path.display(),
        destination = %output_dir.display(),
        "extracted archive"
    );
    Ok(())
}
