//! Registry of the input files an experiment depends on.
//!
//! A [`FileRegistry`] owns a set of [`TrackedFile`] values together with an
//! ordered list of source roots. Files are attached to the roots by
//! *rebasing*: searching the roots for a file of the same name whose content
//! hashes to the same checksum. The first root in configured order wins, so
//! the root list doubles as a priority list.
//!
//! The registry round-trips through a YAML [`Manifest`] and can be packaged
//! as one tarball per source root, then restored on another machine under a
//! different directory layout.

use crate::error::{RegistryError, Result};
use crate::tracking::manifest::{Manifest, ManifestRoot};
use crate::tracking::scanner::NameScanner;
use crate::tracking::tracked_file::TrackedFile;
use crate::utils::compress::{archive_name, create_archive, extract_archive};
use crate::utils::hash::hash_file;
use crate::utils::paths::{base_name, common_ancestor, ensure_dir, make_absolute};
use crate::{DEFAULT_COMPRESSION_LEVEL, FALLBACK_ARCHIVE_BASE, STATIC_DATA_DIR};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{Level, span};

/// Options for [`FileRegistry::import_archives`]
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Also restore the shared static archive
    pub include_static: bool,
    /// Destination for static files (default: the output directory)
    pub static_dir: Option<PathBuf>,
    /// Fail on any missing file or checksum mismatch after extraction
    pub verify_checksum: bool,
    /// Static marker directory name (default: [`STATIC_DATA_DIR`])
    pub static_marker: Option<String>,
}

/// Set of tracked input files for one experiment
#[derive(Debug, Clone)]
pub struct FileRegistry {
    /// Experiment the files belong to
    experiment_id: String,
    /// Search roots in priority order
    source_roots: Vec<PathBuf>,
    /// Tracked files, unique by [`TrackedFile`] identity
    files: HashSet<TrackedFile>,
    /// Directory name marking shared static data
    static_marker: String,
    /// Gzip level used when exporting archives
    compression_level: u32,
}

impl FileRegistry {
    /// Create an empty registry searching `source_roots` in order
    #[must_use]
    pub fn new(experiment_id: impl Into<String>, source_roots: Vec<PathBuf>) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            source_roots,
            files: HashSet::new(),
            static_marker: STATIC_DATA_DIR.to_string(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    /// Use a different directory name to recognise shared static data
    #[must_use]
    pub fn with_static_marker(mut self, marker: impl Into<String>) -> Self {
        self.static_marker = marker.into();
        self
    }

    /// Use a different gzip level for exported archives
    #[must_use]
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Experiment the registry belongs to
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Source roots in priority order
    #[must_use]
    pub fn source_roots(&self) -> &[PathBuf] {
        &self.source_roots
    }

    /// Directory name marking static data
    #[must_use]
    pub fn static_marker(&self) -> &str {
        &self.static_marker
    }

    /// All tracked files
    #[must_use]
    pub const fn files(&self) -> &HashSet<TrackedFile> {
        &self.files
    }

    /// All tracked files ordered by absolute path
    #[must_use]
    pub fn sorted_files(&self) -> Vec<&TrackedFile> {
        let mut files: Vec<&TrackedFile> = self.files.iter().collect();
        files.sort_by_key(|f| f.full_path());
        files
    }

    /// Files located below the static marker directory
    #[must_use]
    pub fn static_files(&self) -> Vec<&TrackedFile> {
        self.sorted_files()
            .into_iter()
            .filter(|f| f.is_below_marker(&self.static_marker))
            .collect()
    }

    /// Experiment-specific files (everything not static)
    #[must_use]
    pub fn specific_files(&self) -> Vec<&TrackedFile> {
        self.sorted_files()
            .into_iter()
            .filter(|f| !f.is_below_marker(&self.static_marker))
            .collect()
    }

    /// Number of tracked files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file is tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Register files by path and attach them to the source roots
    ///
    /// Relative paths are resolved against the current directory. With
    /// `compute_metadata` every file is hashed and must be found below one of
    /// the source roots; without it unmatched files are kept where they are
    /// and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be hashed, or, when
    /// `compute_metadata` is set, if no source root holds a matching copy.
    pub fn add_files<P: AsRef<Path>>(&mut self, paths: &[P], compute_metadata: bool) -> Result<()> {
        for path in paths {
            let absolute = make_absolute(path.as_ref())?;
            let candidate = TrackedFile::new(&absolute, Path::new("/"), compute_metadata)?;
            let rebased = rebase(&candidate, &self.source_roots, compute_metadata)?;
            tracing::debug!(file = %rebased.full_path().display(), "tracking file");
            self.files.insert(rebased);
        }
        Ok(())
    }

    /// Register already constructed files and attach them to the source roots
    ///
    /// # Errors
    ///
    /// Returns an error if a candidate cannot be hashed, or, when
    /// `verify_checksum` is set, if no source root holds a matching copy.
    pub fn add_tracked_files<I>(&mut self, files: I, verify_checksum: bool) -> Result<()>
    where
        I: IntoIterator<Item = TrackedFile>,
    {
        for file in files {
            let rebased = rebase(&file, &self.source_roots, verify_checksum)?;
            self.files.insert(rebased);
        }
        Ok(())
    }

    /// Replace the source roots and, optionally, re-attach tracked files
    ///
    /// With `update_files` every experiment-specific file (and every static
    /// file too when `include_static` is set) is rebased against
    /// `new_roots` with checksum verification. The update is all-or-nothing:
    /// on error neither the roots nor the files change.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ChecksumMismatch`] if a file's only copies
    /// below the new roots have other content, [`RegistryError::NotFound`]
    /// if no copy exists at all, or an I/O error from hashing.
    pub fn update_source_roots(
        &mut self,
        new_roots: Vec<PathBuf>,
        update_files: bool,
        include_static: bool,
    ) -> Result<()> {
        if update_files {
            let files = self.rebased_files(&new_roots, include_static, true)?;
            self.files = files;
        }
        self.source_roots = new_roots;
        Ok(())
    }

    /// Rebase the selected members against `roots` into a fresh set
    fn rebased_files(
        &self,
        roots: &[PathBuf],
        include_static: bool,
        verify: bool,
    ) -> Result<HashSet<TrackedFile>> {
        let mut updated = HashSet::with_capacity(self.files.len());
        for file in self.sorted_files() {
            if !include_static && file.is_below_marker(&self.static_marker) {
                updated.insert(file.clone());
            } else {
                updated.insert(rebase(file, roots, verify)?);
            }
        }
        Ok(updated)
    }

    /// Snapshot the registry as a manifest
    ///
    /// Configured roots are listed first, in order, even when they hold no
    /// files; roots that only appear on files follow in sorted order. Files
    /// are sorted by relative path within each root.
    #[must_use]
    pub fn to_manifest(&self) -> Manifest {
        let mut grouped: BTreeMap<&Path, Vec<&TrackedFile>> = BTreeMap::new();
        for file in &self.files {
            grouped.entry(file.source_root()).or_default().push(file);
        }

        let mut roots: Vec<ManifestRoot> = Vec::new();
        let mut emit = |root: &Path, files: Vec<&TrackedFile>| {
            let mut entries: Vec<_> = files.iter().map(|f| f.to_manifest_entry()).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            roots.push(ManifestRoot {
                source_root: root.to_path_buf(),
                files: entries,
            });
        };

        for root in &self.source_roots {
            let files = grouped.remove(root.as_path()).unwrap_or_default();
            emit(root, files);
        }
        for (root, files) in grouped {
            emit(root, files);
        }

        Manifest {
            experiment_id: self.experiment_id.clone(),
            roots,
        }
    }

    /// Rebuild a registry from a manifest
    ///
    /// Source roots are taken from the manifest in document order.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is inconsistent, or, with
    /// `verify_checksum`, if a file on disk no longer matches its checksum.
    pub fn from_manifest(manifest: &Manifest, verify_checksum: bool) -> Result<Self> {
        let source_roots: Vec<PathBuf> = manifest
            .roots
            .iter()
            .map(|r| r.source_root.clone())
            .collect();
        let mut registry = Self::new(manifest.experiment_id.clone(), source_roots);

        for root in &manifest.roots {
            for (relative, entry) in &root.files {
                let file = TrackedFile::from_manifest_entry(
                    relative,
                    entry,
                    &root.source_root,
                    verify_checksum,
                )?;
                registry.files.insert(file);
            }
        }
        Ok(registry)
    }

    /// Write the registry's manifest to `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be written.
    pub fn save_manifest(&self, path: &Path) -> Result<()> {
        self.to_manifest().save(path)
    }

    /// Load a registry from the manifest at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or decoded.
    pub fn load_manifest(path: &Path, verify_checksum: bool) -> Result<Self> {
        Self::from_manifest(&Manifest::load(path)?, verify_checksum)
    }

    /// Package the tracked files as gzip compressed tarballs in `output_dir`
    ///
    /// Experiment-specific files produce one `<root name>.tar.gz` per source
    /// root, with entries relative to that root. Roots sharing a base name
    /// write the same archive; the later root wins and a warning is logged.
    /// With `include_static`, the static files are packed into
    /// `<marker>.tar.gz` relative to their common source root. Returns the
    /// paths of the archives written, each once.
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory or an archive cannot be
    /// written, or a tracked file cannot be read.
    pub fn export_archives(&self, output_dir: &Path, include_static: bool) -> Result<Vec<PathBuf>> {
        let span = span!(Level::DEBUG, "export_archives", experiment = %self.experiment_id);
        let _guard = span.enter();
        ensure_dir(output_dir)?;

        let mut groups: BTreeMap<&Path, Vec<PathBuf>> = BTreeMap::new();
        for file in self.specific_files() {
            groups
                .entry(file.source_root())
                .or_default()
                .push(file.relative_path().to_path_buf());
        }

        let mut written = Vec::new();
        let mut packed: HashMap<String, &Path> = HashMap::new();
        for (root, files) in &groups {
            let base = base_name(root).unwrap_or_else(|| FALLBACK_ARCHIVE_BASE.to_string());
            let archive = output_dir.join(archive_name(&base));
            create_archive(&archive, root, files, self.compression_level)?;
            if let Some(previous) = packed.insert(base, root) {
                tracing::warn!(
                    archive = %archive.display(),
                    overwritten = %previous.display(),
                    root = %root.display(),
                    "source roots share a base name, archive overwritten"
                );
            } else {
                written.push(archive);
            }
        }

        if include_static {
            let static_files = self.static_files();
            if let Some(base_dir) = common_ancestor(static_files.iter().map(|f| f.source_root())) {
                let files: Vec<PathBuf> = static_files
                    .iter()
                    .filter_map(|f| f.full_path().strip_prefix(&base_dir).ok().map(Path::to_path_buf))
                    .collect();
                let archive = output_dir.join(archive_name(&self.static_marker));
                create_archive(&archive, &base_dir, &files, self.compression_level)?;
                written.push(archive);
            } else {
                tracing::info!("no static files to package");
            }
        }

        Ok(written)
    }

    /// Restore a registry from its manifest and the archives written by
    /// [`FileRegistry::export_archives`]
    ///
    /// Archives are searched recursively below `search_dirs` (in order) and
    /// extracted into `output_dir`. Afterwards the restored files are rebased
    /// against `[output_dir, static_dir]`. Static files take part when
    /// `include_static` is set or a `static_dir` is given, so shared data
    /// already installed there is picked up without an archive. The updated
    /// manifest is written next to the extracted files, under the original
    /// manifest's file name.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The manifest cannot be read or is malformed
    /// - A required archive is absent ([`RegistryError::ArchiveMissing`])
    /// - Extraction fails
    /// - Verification is enabled and a file is missing or corrupted
    pub fn import_archives(
        manifest_path: &Path,
        search_dirs: &[PathBuf],
        output_dir: &Path,
        options: &ImportOptions,
    ) -> Result<Self> {
        let span = span!(Level::DEBUG, "import_archives", manifest = %manifest_path.display());
        let _guard = span.enter();

        let manifest_path = make_absolute(manifest_path)?;
        let mut registry = Self::load_manifest(&manifest_path, false)?;
        if let Some(marker) = &options.static_marker {
            registry.static_marker.clone_from(marker);
        }
        let search_dirs = search_dirs
            .iter()
            .map(|d| make_absolute(d))
            .collect::<Result<Vec<_>>>()?;
        let output_dir = make_absolute(output_dir)?;
        let static_dir = match &options.static_dir {
            Some(dir) => make_absolute(dir)?,
            None => output_dir.clone(),
        };

        let scanner = NameScanner::default();
        let names: BTreeSet<String> = registry
            .specific_files()
            .iter()
            .map(|f| base_name(f.source_root()).unwrap_or_else(|| FALLBACK_ARCHIVE_BASE.to_string()))
            .collect();

        let mut archives = Vec::with_capacity(names.len());
        for name in &names {
            archives.push(locate_archive(&scanner, search_dirs.as_slice(), &archive_name(name))?);
        }
        let static_archive = if options.include_static {
            Some(locate_archive(
                &scanner,
                &search_dirs,
                &archive_name(&registry.static_marker),
            )?)
        } else {
            None
        };

        if !archives.is_empty() {
            ensure_dir(&output_dir)?;
            for archive in &archives {
                extract_archive(archive, &output_dir)?;
            }
        }
        if let Some(archive) = &static_archive {
            ensure_dir(&static_dir)?;
            extract_archive(archive, &static_dir)?;
        }

        let mut roots = vec![output_dir.clone()];
        if static_dir != output_dir {
            roots.push(static_dir.clone());
        }
        // A static directory may already hold the shared data without an archive
        let rebase_static = options.include_static || options.static_dir.is_some();
        if options.verify_checksum {
            registry.update_source_roots(roots, true, rebase_static)?;
        } else {
            registry.files = registry.rebased_files(&roots, rebase_static, false)?;
            registry.source_roots = roots;
        }

        let manifest_name = manifest_path
            .file_name()
            .map_or_else(|| PathBuf::from("manifest.yml"), PathBuf::from);
        if !archives.is_empty() {
            registry.save_manifest(&output_dir.join(&manifest_name))?;
        } else if static_archive.is_some() {
            registry.save_manifest(&static_dir.join(&manifest_name))?;
        }

        Ok(registry)
    }
}

/// Re-attach `candidate` to the first root holding a copy with the same
/// name and checksum
///
/// Roots are searched in order and each root is walked in sorted order, so
/// the result is reproducible. With no roots the candidate is returned
/// unchanged. When nothing matches, `verify` turns the miss into an error:
/// [`RegistryError::ChecksumMismatch`] against the first same-name copy if
/// one exists, [`RegistryError::NotFound`] otherwise. Without `verify` a
/// warning is logged and the candidate is kept.
///
/// # Errors
///
/// Returns an error if a directory cannot be walked, a match cannot be
/// hashed, or `verify` is set and no match exists.
pub fn rebase(candidate: &TrackedFile, roots: &[PathBuf], verify: bool) -> Result<TrackedFile> {
    if roots.is_empty() {
        return Ok(candidate.clone());
    }

    let name = candidate.file_name();
    let span = span!(Level::DEBUG, "rebase", file = %name.to_string_lossy());
    let _guard = span.enter();

    let scanner = NameScanner::default();
    // First same-name copy with other content, with its checksum
    let mut mismatch: Option<(PathBuf, String)> = None;
    if let Some(expected) = candidate.checksum() {
        for root in roots {
            for path in scanner.find_in(root, name)? {
                let size_differs = candidate
                    .size()
                    .is_some_and(|size| std::fs::metadata(&path).is_ok_and(|m| m.len() != size));
                if size_differs {
                    if mismatch.is_none() {
                        let digest = hash_file(&path)?;
                        mismatch = Some((path, digest.checksum));
                    }
                    continue;
                }
                let found = TrackedFile::new(&path, root, true)?;
                if found.checksum() == Some(expected) {
                    tracing::debug!(root = %root.display(), "rebased file");
                    return Ok(found);
                }
                if mismatch.is_none()
                    && let Some(actual) = found.checksum()
                {
                    mismatch = Some((path, actual.to_string()));
                }
            }
        }
    }

    let name = name.to_string_lossy().into_owned();
    if verify {
        return Err(match (mismatch, candidate.checksum()) {
            (Some((path, actual)), Some(expected)) => RegistryError::ChecksumMismatch {
                path,
                expected: expected.to_string(),
                actual,
            },
            _ => RegistryError::NotFound {
                name,
                roots: roots.to_vec(),
            },
        });
    }
    tracing::warn!(file = %name, "input file not found in source roots, keeping original location");
    Ok(candidate.clone())
}

/// Find `name` below `search_dirs`, preferring the first hit
fn locate_archive(scanner: &NameScanner, search_dirs: &[PathBuf], name: &str) -> Result<PathBuf> {
    let mut candidates = scanner.find_all(search_dirs, name.as_ref())?;
    if candidates.len() > 1 {
        let warning = RegistryError::AmbiguousMatch {
            name: name.to_string(),
            candidates: candidates.clone(),
        };
        tracing::warn!("{warning}");
    }
    if candidates.is_empty() {
        return Err(RegistryError::ArchiveMissing {
            name: name.to_string(),
            search_dirs: search_dirs.to_vec(),
        });
    }
    Ok(candidates.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hash::hash_bytes;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, content: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_add_without_roots_keeps_location() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.grib");
        write(&path, b"grib");

        let mut registry = FileRegistry::new("exp", Vec::new());
        registry.add_files(&[&path], true).unwrap();

        let file = registry.files().iter().next().unwrap();
        assert_eq!(file.source_root(), Path::new("/"));
        assert_eq!(file.full_path(), path);
        assert_eq!(file.checksum(), Some(hash_bytes(b"grib").as_str()));
    }

    #[test]
    fn test_add_rebases_to_first_root() {
        let origin = TempDir::new().unwrap();
        let root_a = TempDir::new().unwrap();
        let root_b = TempDir::new().unwrap();
        let original = origin.path().join("data.grib");
        write(&original, b"identical");
        write(&root_a.path().join("deep/data.grib"), b"identical");
        write(&root_b.path().join("data.grib"), b"identical");

        let roots = vec![root_a.path().to_path_buf(), root_b.path().to_path_buf()];
        let mut registry = FileRegistry::new("exp", roots);
        registry.add_files(&[&original], true).unwrap();

        let file = registry.files().iter().next().unwrap();
        assert_eq!(file.source_root(), root_a.path());
        assert_eq!(file.relative_path(), Path::new("deep/data.grib"));
    }

    #[test]
    fn test_rebase_skips_name_match_with_other_content() {
        let origin = TempDir::new().unwrap();
        let root_a = TempDir::new().unwrap();
        let root_b = TempDir::new().unwrap();
        let original = origin.path().join("data.grib");
        write(&original, b"wanted");
        write(&root_a.path().join("data.grib"), b"unwanted");
        write(&root_a.path().join("x/data.grib"), b"wanteD");
        write(&root_b.path().join("data.grib"), b"wanted");

        let candidate = TrackedFile::new(&original, Path::new("/"), true).unwrap();
        let roots = vec![root_a.path().to_path_buf(), root_b.path().to_path_buf()];
        let rebased = rebase(&candidate, &roots, true).unwrap();
        assert_eq!(rebased.source_root(), root_b.path());
    }

    #[test]
    fn test_add_unmatched_with_verification_fails() {
        let origin = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let original = origin.path().join("missing.nc");
        write(&original, b"only here");

        let mut registry = FileRegistry::new("exp", vec![root.path().to_path_buf()]);
        let err = registry.add_files(&[&original], true).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { ref name, .. } if name == "missing.nc"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_pending_metadata_keeps_original() {
        let root = TempDir::new().unwrap();
        write(&root.path().join("file.nc"), b"content");

        let mut registry = FileRegistry::new("exp", vec![root.path().to_path_buf()]);
        registry
            .add_files(&[Path::new("/somewhere/else/file.nc")], false)
            .unwrap();

        let file = registry.files().iter().next().unwrap();
        assert_eq!(file.full_path(), PathBuf::from("/somewhere/else/file.nc"));
        assert_eq!(file.checksum(), None);
    }

    #[test]
    fn test_add_tracked_files_rebases_candidates() {
        let origin = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let original = origin.path().join("in/namelist");
        write(&original, b"&NAMPAR0 /");
        write(&root.path().join("namelist"), b"&NAMPAR0 /");

        let candidate = TrackedFile::new(&original, origin.path(), true).unwrap();
        let mut registry = FileRegistry::new("exp", vec![root.path().to_path_buf()]);
        registry.add_tracked_files([candidate], true).unwrap();

        let file = registry.files().iter().next().unwrap();
        assert_eq!(file.source_root(), root.path());
        assert_eq!(file.relative_path(), Path::new("namelist"));
    }

    #[test]
    fn test_duplicate_content_is_single_member() {
        let root = TempDir::new().unwrap();
        let a = root.path().join("a/copy.bin");
        let b = root.path().join("b/copy.bin");
        write(&a, b"same");
        write(&b, b"same");

        let mut registry = FileRegistry::new("exp", vec![root.path().to_path_buf()]);
        registry.add_files(&[&a, &b], true).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_partition_by_static_marker() {
        let root = TempDir::new().unwrap();
        let specific = root.path().join("hz9n/ICMGGhz9nINIT");
        let shared = root.path().join("ifsdata/rtables/rtable80");
        write(&specific, b"init");
        write(&shared, b"rtable");

        let mut registry = FileRegistry::new("hz9n", vec![root.path().to_path_buf()]);
        registry.add_files(&[&specific, &shared], true).unwrap();

        assert_eq!(registry.specific_files().len(), 1);
        assert_eq!(registry.static_files().len(), 1);
        assert_eq!(registry.static_files()[0].file_name(), "rtable80");

        let custom = registry.clone().with_static_marker("hz9n");
        assert_eq!(custom.static_files()[0].file_name(), "ICMGGhz9nINIT");
    }

    #[test]
    fn test_update_source_roots_moves_files() {
        let old_root = TempDir::new().unwrap();
        let new_root = TempDir::new().unwrap();
        let path = old_root.path().join("exp/data.grib");
        write(&path, b"payload");
        write(&new_root.path().join("moved/data.grib"), b"payload");

        let mut registry = FileRegistry::new("exp", vec![old_root.path().to_path_buf()]);
        registry.add_files(&[&path], true).unwrap();

        registry
            .update_source_roots(vec![new_root.path().to_path_buf()], true, false)
            .unwrap();

        assert_eq!(registry.source_roots(), [new_root.path().to_path_buf()]);
        let file = registry.files().iter().next().unwrap();
        assert_eq!(file.full_path(), new_root.path().join("moved/data.grib"));
    }

    #[test]
    fn test_update_source_roots_missing_file_is_atomic() {
        let old_root = TempDir::new().unwrap();
        let new_root = TempDir::new().unwrap();
        let kept = old_root.path().join("kept.grib");
        let lost = old_root.path().join("lost.grib");
        write(&kept, b"kept");
        write(&lost, b"lost");
        write(&new_root.path().join("kept.grib"), b"kept");

        let mut registry = FileRegistry::new("exp", vec![old_root.path().to_path_buf()]);
        registry.add_files(&[&kept, &lost], true).unwrap();
        let before = registry.to_manifest();

        let err = registry
            .update_source_roots(vec![new_root.path().to_path_buf()], true, false)
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { ref name, .. } if name == "lost.grib"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.to_manifest(), before);
    }

    #[test]
    fn test_update_source_roots_leaves_static_files() {
        let old_root = TempDir::new().unwrap();
        let new_root = TempDir::new().unwrap();
        let shared = old_root.path().join("ifsdata/climate.v020");
        write(&shared, b"climate");

        let mut registry = FileRegistry::new("exp", vec![old_root.path().to_path_buf()]);
        registry.add_files(&[&shared], true).unwrap();

        registry
            .update_source_roots(vec![new_root.path().to_path_buf()], true, false)
            .unwrap();
        assert_eq!(registry.static_files()[0].full_path(), shared);

        let err = registry
            .update_source_roots(vec![new_root.path().to_path_buf()], true, true)
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn test_update_source_roots_without_files() {
        let mut registry = FileRegistry::new("exp", vec![PathBuf::from("/a")]);
        registry
            .add_files(&[Path::new("/a/x")], false)
            .unwrap();
        registry
            .update_source_roots(vec![PathBuf::from("/b")], false, false)
            .unwrap();
        assert_eq!(registry.source_roots(), [PathBuf::from("/b")]);
        assert_eq!(
            registry.files().iter().next().unwrap().full_path(),
            PathBuf::from("/a/x")
        );
    }

    #[test]
    fn test_manifest_lists_empty_configured_roots() {
        let registry = FileRegistry::new("exp", vec![PathBuf::from("/one"), PathBuf::from("/two")]);
        let manifest = registry.to_manifest();
        assert_eq!(manifest.roots.len(), 2);
        assert!(manifest.roots.iter().all(|r| r.files.is_empty()));

        let decoded = FileRegistry::from_manifest(&manifest, false).unwrap();
        assert_eq!(decoded.source_roots(), registry.source_roots());
    }

    #[test]
    fn test_locate_archive_prefers_first_candidate() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write(&first.path().join("z/exp.tar.gz"), b"1");
        write(&second.path().join("exp.tar.gz"), b"2");

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let found = locate_archive(&NameScanner::default(), &dirs, "exp.tar.gz").unwrap();
        assert_eq!(found, first.path().join("z/exp.tar.gz"));

        let err = locate_archive(&NameScanner::default(), &dirs, "absent.tar.gz").unwrap_err();
        assert!(matches!(err, RegistryError::ArchiveMissing { .. }));
    }

    #[test]
    fn test_rebase_reports_changed_copy_as_mismatch() {
        let origin = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let original = origin.path().join("data.grib");
        write(&original, b"payload");
        write(&root.path().join("data.grib"), b"paYload");

        let candidate = TrackedFile::new(&original, Path::new("/"), true).unwrap();
        let err = rebase(&candidate, &[root.path().to_path_buf()], true).unwrap_err();
        match err {
            RegistryError::ChecksumMismatch {
                path,
                expected,
                actual,
            } => {
                assert_eq!(path, root.path().join("data.grib"));
                assert_eq!(expected, hash_bytes(b"payload"));
                assert_eq!(actual, hash_bytes(b"paYload"));
            }
            other => panic!("expected checksum mismatch, got {other:?}"),
        }

        // Unverified rebase still keeps the original
        let kept = rebase(&candidate, &[root.path().to_path_buf()], false).unwrap();
        assert_eq!(kept.full_path(), original);
    }

    #[test]
    fn test_rebase_reports_resized_copy_as_mismatch() {
        let origin = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let original = origin.path().join("data.grib");
        write(&original, b"payload");
        write(&root.path().join("a/data.grib"), b"payload, truncated later");
        write(&root.path().join("b/data.grib"), b"other");

        let candidate = TrackedFile::new(&original, Path::new("/"), true).unwrap();
        let err = rebase(&candidate, &[root.path().to_path_buf()], true).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::ChecksumMismatch { ref path, .. } if *path == root.path().join("a/data.grib")
        ));
    }

    #[test]
    fn test_export_duplicate_root_names_listed_once() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let root_a = first.path().join("exp");
        let root_b = second.path().join("exp");
        write(&root_a.join("a.grib"), b"a");
        write(&root_b.join("b.grib"), b"b");

        let mut registry = FileRegistry::new("exp", vec![root_a.clone()]);
        registry.add_files(&[root_a.join("a.grib")], true).unwrap();
        registry.source_roots = vec![root_b.clone()];
        registry.add_files(&[root_b.join("b.grib")], true).unwrap();
        registry.source_roots = vec![root_a, root_b];

        let archives = registry.export_archives(out.path(), false).unwrap();
        assert_eq!(archives, vec![out.path().join("exp.tar.gz")]);
    }
}
