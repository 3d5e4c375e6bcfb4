use crate::error::{RegistryError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Makes a path absolute, resolving relative paths from current directory
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().map_err(|e| RegistryError::io(path, e))?;
        Ok(current_dir.join(path))
    }
}

/// Creates a directory (and its parents) unless it already exists
///
/// # Errors
///
/// Returns an error if the directory cannot be created
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path).map_err(|e| RegistryError::io(path, e))?;
    }
    Ok(())
}

/// Strips `root` from `path` and checks that the remainder is a strict,
/// non-escaping descendant.
///
/// Returns `None` when `path` is not below `root`, equals `root`, or the
/// remainder contains `..`, `.` or root components.
#[must_use]
pub fn strict_relative(path: &Path, root: &Path) -> Option<PathBuf> {
    let relative = path.strip_prefix(root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| relative.to_path_buf())
}

/// Longest common ancestor of a set of absolute directories
///
/// Returns `None` for an empty input.
#[must_use]
pub fn common_ancestor<'a, I>(paths: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut iter = paths.into_iter();
    let mut common: Vec<Component<'a>> = iter.next()?.components().collect();

    for path in iter {
        let shared = common
            .iter()
            .zip(path.components())
            .take_while(|(a, b)| *a == b)
            .count();
        common.truncate(shared);
    }

    Some(common.iter().collect())
}

/// Final path segment as a string, if there is one
#[must_use]
pub fn base_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
