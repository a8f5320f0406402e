//! Absolute-path normalization used for every path the selector stores or compares.

use std::path::{Component, Path, PathBuf};

use proto::SkillError;

/// Makes `path` absolute against the current directory and normalizes it lexically.
///
/// Symlinks are not resolved and the path does not need to exist.
pub fn absolute(path: &Path) -> Result<PathBuf, SkillError> {
    if path.is_absolute() {
        return Ok(normalize(path));
    }
    let cwd = std::env::current_dir().map_err(|e| SkillError::Unresolvable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(normalize(&cwd.join(path)))
}

/// Joins `rel` onto `base` and normalizes the result.
///
/// An absolute `rel` replaces `base` entirely.
pub fn join_normalized(base: &Path, rel: &Path) -> PathBuf {
    normalize(&base.join(rel))
}

/// Drops `.` components and folds `..` into its parent, never climbing above the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if popped {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(name) => out.push(name),
        }
    }
    out
}
