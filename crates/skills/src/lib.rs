//! Skill import resolution.
//!
//! A root config file declares which skill directories it imports; extra
//! skill paths fold in their own declarations. The resulting
//! [`SkillSelector`] answers whether any given path is in scope.

pub mod paths;
pub mod reader;
pub mod selector;

/// Config file recognition and parsing.
pub use reader::{ConfigReader, DEFAULT_CONFIG_FILE_NAMES, YamlConfigReader};
/// Resolved skill imports.
pub use selector::SkillSelector;
