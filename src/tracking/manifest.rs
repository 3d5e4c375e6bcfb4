//! Manifest describing the input files of one experiment.
//!
//! The manifest is a YAML document with exactly one top-level key, the
//! experiment id:
//!
//! ```yaml
//! hz9n:
//!   /scratch/hz9n:
//!     ICMGGhz9nINIT:
//!       fullpath: /scratch/hz9n/ICMGGhz9nINIT
//!       sha256sum: 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08
//!       size: 4
//!   /scratch/ifsdata:
//!     climate/rtable:
//!       fullpath: /scratch/ifsdata/climate/rtable
//! ```
//!
//! Source roots and files keep document order, which is also the search
//! priority of the roots once the manifest is loaded into a
//! [`crate::tracking::FileRegistry`].

use crate::error::{RegistryError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Metadata recorded for a single tracked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Absolute path of the file when the manifest was written
    pub fullpath: PathBuf,
    /// SHA-256 checksum, lowercase hex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256sum: Option<String>,
    /// File size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Files recorded below one source root
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestRoot {
    /// Absolute source root
    pub source_root: PathBuf,
    /// `(relative path, entry)` pairs in document order
    pub files: Vec<(PathBuf, ManifestEntry)>,
}

/// Decoded manifest document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Experiment the files belong to
    pub experiment_id: String,
    /// Source roots in priority order
    pub roots: Vec<ManifestRoot>,
}

impl Manifest {
    /// Render the manifest as YAML, preserving root and file order
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        let mut roots = Mapping::new();
        for root in &self.roots {
            let mut files = Mapping::new();
            for (relative, entry) in &root.files {
                files.insert(path_key(relative), serde_yaml::to_value(entry)?);
            }
            roots.insert(path_key(&root.source_root), Value::Mapping(files));
        }

        let mut document = Mapping::new();
        document.insert(
            Value::String(self.experiment_id.clone()),
            Value::Mapping(roots),
        );
        Ok(serde_yaml::to_string(&document)?)
    }

    /// Parse a manifest document
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ManifestMalformed`] if the text is not YAML,
    /// the top level does not hold exactly one experiment, or any nested
    /// level has the wrong shape.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(text)
            .map_err(|e| RegistryError::ManifestMalformed(e.to_string()))?;
        let document = expect_mapping(document, "manifest document")?;
        let (experiment_id, roots_value) = decode_single_entry::<Value>(document)?;
        let roots_mapping = expect_mapping(roots_value, "source root table")?;

        let mut roots = Vec::with_capacity(roots_mapping.len());
        for (root_key, files_value) in roots_mapping {
            let source_root = PathBuf::from(expect_string(root_key, "source root")?);
            let files_mapping = match files_value {
                // A root without files serializes as an empty mapping, but a
                // hand-edited `root:` with no value is accepted as well.
                Value::Null => Mapping::new(),
                other => expect_mapping(other, "file table")?,
            };

            let mut files = Vec::with_capacity(files_mapping.len());
            for (file_key, entry_value) in files_mapping {
                let relative = PathBuf::from(expect_string(file_key, "relative path")?);
                let entry: ManifestEntry = serde_yaml::from_value(entry_value).map_err(|e| {
                    RegistryError::ManifestMalformed(format!(
                        "entry {}: {e}",
                        relative.display()
                    ))
                })?;
                files.push((relative, entry));
            }
            roots.push(ManifestRoot { source_root, files });
        }

        Ok(Self {
            experiment_id,
            roots,
        })
    }

    /// Write the manifest to `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be serialized or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            crate::utils::paths::ensure_dir(parent)?;
        }
        std::fs::write(path, self.to_yaml()?).map_err(|e| RegistryError::io(path, e))?;
        tracing::debug!(manifest = %path.display(), "wrote manifest");
        Ok(())
    }

    /// Read a manifest from `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
        Self::from_yaml(&text)
    }

    /// Total number of file entries across all roots
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.roots.iter().map(|r| r.files.len()).sum()
    }
}

/// Decode a mapping that must contain exactly one key
///
/// # Errors
///
/// Returns [`RegistryError::ManifestMalformed`] if the mapping holds zero or
/// several keys, the key is not a string, or the value does not decode as `T`.
pub fn decode_single_entry<T: DeserializeOwned>(mapping: Mapping) -> Result<(String, T)> {
    if mapping.len() != 1 {
        return Err(RegistryError::ManifestMalformed(format!(
            "expected exactly one top-level entry, found {}",
            mapping.len()
        )));
    }

    let Some((key, value)) = mapping.into_iter().next() else {
        return Err(RegistryError::ManifestMalformed(
            "expected exactly one top-level entry, found 0".to_string(),
        ));
    };
    let key = expect_string(key, "entry key")?;
    let value = serde_yaml::from_value(value)
        .map_err(|e| RegistryError::ManifestMalformed(format!("entry {key}: {e}")))?;
    Ok((key, value))
}

/// YAML key for a path
fn path_key(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}

/// Unwrap a mapping or report what was found instead
fn expect_mapping(value: Value, what: &str) -> Result<Mapping> {
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        other => Err(RegistryError::ManifestMalformed(format!(
            "{what} must be a mapping, found {}",
            value_kind(&other)
        ))),
    }
}

/// Unwrap a scalar as a string
fn expect_string(value: Value, what: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        // Experiment ids and file names may look numeric to YAML.
        Value::Number(n) => Ok(n.to_string()),
        other => Err(RegistryError::ManifestMalformed(format!(
            "{what} must be a string, found {}",
            value_kind(&other)
        ))),
    }
}

/// Name of a YAML value kind for error messages
const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
