//! Recognizing and reading skill config files.

use std::io::ErrorKind;
use std::path::Path;

use proto::SkillError;
use tracing::debug;

/// File names recognized as skill config files by default.
pub const DEFAULT_CONFIG_FILE_NAMES: &[&str] = &["config.yml", "config.yaml"];

/// Decides which files are config files and parses them.
pub trait ConfigReader {
    /// Returns `true` when `path` names a config file.
    fn is_config_file(&self, path: &Path) -> bool;

    /// Reads and parses the document at `path`.
    ///
    /// `Ok(None)` means the file is missing or malformed; callers treat that
    /// as "no imports declared". Only unexpected I/O failures are errors.
    fn read_document(&self, path: &Path) -> Result<Option<serde_yaml::Value>, SkillError>;
}

/// Reads YAML config files recognized by file name.
#[derive(Debug, Clone)]
pub struct YamlConfigReader {
    file_names: Vec<String>,
}

impl YamlConfigReader {
    /// Creates a reader recognizing the given file names.
    pub fn new<I, S>(file_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            file_names: file_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the recognized file names.
    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }
}

impl Default for YamlConfigReader {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE_NAMES.iter().copied())
    }
}

impl ConfigReader for YamlConfigReader {
    fn is_config_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.file_names.iter().any(|known| known == name)
    }

    fn read_document(&self, path: &Path) -> Result<Option<serde_yaml::Value>, SkillError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                debug!(path = %path.display(), "Config file is not valid UTF-8");
                return Ok(None);
            }
            Err(source) => {
                return Err(SkillError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        match serde_yaml::from_str::<serde_yaml::Value>(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Ignoring malformed config file");
                Ok(None)
            }
        }
    }
}
