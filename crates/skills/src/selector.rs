//! Import resolution: which skill directories and files are in scope.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use proto::{Selection, SkillError};
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::paths;
use crate::reader::{ConfigReader, YamlConfigReader};

/// Set of imported skill paths anchored at the root config's directory.
///
/// An empty selector imports everything: [`SkillSelector::is_imported`]
/// accepts any path, while [`SkillSelector::merge`] treats it as the identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSelector {
    imports: BTreeSet<PathBuf>,
    base_directory: Option<PathBuf>,
}

impl SkillSelector {
    /// Creates a selector from already-resolved imports.
    pub fn new(
        imports: impl IntoIterator<Item = PathBuf>,
        base_directory: Option<PathBuf>,
    ) -> Self {
        Self {
            imports: imports
                .into_iter()
                .map(|p| absolute_or_normalized(&p))
                .collect(),
            base_directory,
        }
    }

    /// Creates a selector with no imports and no base directory.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolves the root config and every extra skill path with YAML config files.
    pub fn load<I, P>(config: impl AsRef<Path>, skill_paths: I) -> Result<Self, SkillError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::load_with(&YamlConfigReader::default(), config, skill_paths)
    }

    /// Resolves the root config and every extra skill path using `reader`.
    ///
    /// Imports are always relative to the root config's directory. A root
    /// config without imports selects that whole directory.
    pub fn load_with<R, I, P>(
        reader: &R,
        config: impl AsRef<Path>,
        skill_paths: I,
    ) -> Result<Self, SkillError>
    where
        R: ConfigReader + ?Sized,
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let config = paths::absolute(config.as_ref())?;
        let base_directory = config
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.clone());

        let mut selector = Self::from_file(reader, &config, &base_directory)?;
        selector.base_directory = Some(base_directory.clone());

        if selector.is_empty() {
            debug!(
                base = %base_directory.display(),
                "Root config declares no imports, importing everything beneath it"
            );
            selector.add_import(&base_directory);
        }

        for path in skill_paths {
            let other = Self::resolve_path(reader, path.as_ref(), &base_directory)?;
            selector = selector.merge(other);
        }

        debug!(imports = ?selector.imports, "Selected skills");
        Ok(selector)
    }

    /// Resolves one skill path, which may be a config file or a directory of them.
    ///
    /// A path that does not exist yields an empty selector.
    pub fn resolve_path<R>(
        reader: &R,
        path: &Path,
        base_directory: &Path,
    ) -> Result<Self, SkillError>
    where
        R: ConfigReader + ?Sized,
    {
        if path.is_file() {
            Self::from_file(reader, path, base_directory)
        } else if path.is_dir() {
            Self::from_directory(reader, path, base_directory)
        } else {
            debug!(path = %path.display(), "No imports found, importing everything");
            Ok(Self::empty())
        }
    }

    /// Reads the imports declared by a single config file.
    ///
    /// Files that are not config files, or whose content is not a mapping,
    /// declare nothing.
    pub fn from_file<R>(
        reader: &R,
        path: &Path,
        base_directory: &Path,
    ) -> Result<Self, SkillError>
    where
        R: ConfigReader + ?Sized,
    {
        if !reader.is_config_file(path) {
            return Ok(Self::empty());
        }

        match reader.read_document(path)? {
            Some(Value::Mapping(dict)) => Ok(Self::from_dict(&dict, base_directory)),
            Some(_) => {
                debug!(path = %path.display(), "Config file is not a mapping, ignoring");
                Ok(Self::empty())
            }
            None => Ok(Self::empty()),
        }
    }

    /// Builds a selector from the `imports` key of a parsed config document.
    pub fn from_dict(dict: &Mapping, base_directory: &Path) -> Self {
        let entries: Vec<&str> = match dict.get("imports") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(single)) => vec![single.as_str()],
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(|item| {
                    let entry = item.as_str();
                    if entry.is_none() {
                        warn!(entry = ?item, "Skipping non-string import entry");
                    }
                    entry
                })
                .collect(),
            Some(other) => {
                warn!(imports = ?other, "`imports` must be a list of paths, ignoring");
                Vec::new()
            }
        };

        let imports = entries
            .into_iter()
            .map(|entry| paths::join_normalized(base_directory, Path::new(entry)))
            .collect();

        Self {
            imports,
            base_directory: Some(base_directory.to_path_buf()),
        }
    }

    /// Walks `path` and merges every config file that is imported so far.
    ///
    /// The walk starts unrestricted, so the first config file visited is
    /// always read; its imports then decide which later files count.
    /// Directories are visited top-down, files before subdirectories, in
    /// sorted order.
    pub fn from_directory<R>(
        reader: &R,
        path: &Path,
        base_directory: &Path,
    ) -> Result<Self, SkillError>
    where
        R: ConfigReader + ?Sized,
    {
        let mut importer = Self::empty();

        let walker = WalkDir::new(path)
            .follow_links(false)
            .sort_by(files_before_directories);

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %path.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let file = entry.path();
            if file.is_dir() {
                continue;
            }

            if reader.is_config_file(file) && importer.is_imported(file) {
                let other = Self::from_file(reader, file, base_directory)?;
                debug!(
                    path = %file.display(),
                    imports = other.imports.len(),
                    "Merging skill config"
                );
                importer.merge_from(other);
            }
        }

        Ok(importer)
    }

    /// Unions `other` into this selector, keeping this selector's base directory.
    pub fn merge(mut self, other: Self) -> Self {
        self.merge_from(other);
        self
    }

    /// In-place form of [`SkillSelector::merge`].
    pub fn merge_from(&mut self, other: Self) {
        self.imports.extend(other.imports);
    }

    /// Returns `true` when no import is declared.
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Returns `true` when `path` falls within the selected skills.
    ///
    /// Import matching is a plain substring test on the absolute path, so
    /// `/p/skills/a` also matches `/p/skills/ab`.
    pub fn is_imported(&self, path: impl AsRef<Path>) -> bool {
        if self.is_empty() {
            return true;
        }

        let path = path.as_ref();
        let absolute_path = absolute_or_normalized(path);

        if let Some(base) = &self.base_directory {
            if &absolute_path == base {
                return true;
            }
            // Files directly inside the base directory are always in scope.
            if absolute_path.is_file() && absolute_path.parent() == Some(base.as_path()) {
                return true;
            }
        }

        let haystack = absolute_path.to_string_lossy();
        self.imports
            .iter()
            .any(|import| haystack.contains(import.to_string_lossy().as_ref()))
    }

    /// Adds an import, normalized to an absolute path.
    pub fn add_import(&mut self, path: impl AsRef<Path>) {
        self.imports.insert(absolute_or_normalized(path.as_ref()));
    }

    /// Iterates over imported paths in sorted order.
    pub fn imports(&self) -> impl Iterator<Item = &Path> {
        self.imports.iter().map(PathBuf::as_path)
    }

    /// Directory of the root config, if this selector came from one.
    pub fn base_directory(&self) -> Option<&Path> {
        self.base_directory.as_deref()
    }

    /// Keeps the candidates that are imported, preserving their order.
    pub fn filter_imported<I, P>(&self, candidates: I) -> Vec<P>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        candidates
            .into_iter()
            .filter(|candidate| self.is_imported(candidate))
            .collect()
    }

    /// Snapshot for reporting.
    pub fn selection(&self) -> Selection {
        Selection {
            base_directory: self
                .base_directory
                .as_ref()
                .map(|p| p.display().to_string()),
            imports: self.imports.iter().map(|p| p.display().to_string()).collect(),
            unrestricted: self.is_empty(),
        }
    }
}

fn absolute_or_normalized(path: &Path) -> PathBuf {
    paths::absolute(path).unwrap_or_else(|_| paths::normalize(path))
}

fn files_before_directories(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}
