use proto::ConfigError;
use serde::{Deserialize, Serialize};
use skills::{DEFAULT_CONFIG_FILE_NAMES, YamlConfigReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings file name looked up in the current directory.
const LOCAL_SETTINGS_FILE: &str = "skillscope.toml";

/// Top-level settings loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Import resolution inputs.
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Inputs for skill import resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Root config file; its directory anchors every import.
    #[serde(default = "default_root")]
    pub root: String,
    /// Additional skill files or directories to fold in.
    #[serde(default)]
    pub skills: Vec<String>,
    /// File names recognized as skill config files.
    #[serde(default = "default_config_file_names")]
    pub config_file_names: Vec<String>,
}

fn default_root() -> String {
    "config.yml".to_string()
}

fn default_config_file_names() -> Vec<String> {
    DEFAULT_CONFIG_FILE_NAMES
        .iter()
        .map(|name| name.to_string())
        .collect()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            skills: Vec::new(),
            config_file_names: default_config_file_names(),
        }
    }
}

impl ResolverConfig {
    /// Root config path.
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }

    /// Additional skill paths.
    pub fn skill_paths(&self) -> Vec<PathBuf> {
        self.skills.iter().map(PathBuf::from).collect()
    }

    /// Reader recognizing the configured file names.
    pub fn config_reader(&self) -> YamlConfigReader {
        YamlConfigReader::new(self.config_file_names.iter().cloned())
    }
}

impl Settings {
    /// Loads settings from explicit path, fallback locations, and env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings_path = path.map(|p| p.to_path_buf()).or_else(|| {
            // Look in current dir, then home dir
            let cwd = std::env::current_dir().ok()?.join(LOCAL_SETTINGS_FILE);
            if cwd.exists() {
                return Some(cwd);
            }
            let home = std::env::var("HOME").ok()?;
            let home_settings = PathBuf::from(home).join(".skillscope").join("config.toml");
            if home_settings.exists() {
                return Some(home_settings);
            }
            None
        });
        debug!(path = ?settings_path, "Settings file resolved");

        let mut settings = if let Some(path) = settings_path {
            let content = std::fs::read_to_string(&path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(|e| ConfigError::Toml(e.to_string()))?
        } else {
            Settings::default()
        };

        if let Ok(root) = std::env::var("SKILLSCOPE_ROOT") {
            settings.resolver.root = root;
        }
        if let Some(skills) = std::env::var_os("SKILLSCOPE_SKILLS") {
            settings.resolver.skills = std::env::split_paths(&skills)
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_string_lossy().to_string())
                .collect();
        }
        if let Ok(names) = std::env::var("SKILLSCOPE_CONFIG_FILE_NAMES") {
            settings.resolver.config_file_names = names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }

        settings.validate()?;

        debug!(
            root = %settings.resolver.root,
            skills = ?settings.resolver.skills,
            config_file_names = ?settings.resolver.config_file_names,
            "Settings loaded"
        );
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.resolver.root.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "resolver.root".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.resolver.config_file_names.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "resolver.config_file_names".to_string(),
                reason: "at least one file name is required".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{set_env_var, with_scoped_env};

    const ENV_KEYS: [&str; 4] = [
        "SKILLSCOPE_ROOT",
        "SKILLSCOPE_SKILLS",
        "SKILLSCOPE_CONFIG_FILE_NAMES",
        "HOME",
    ];

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, content).expect("write settings");
    }

    #[test]
    fn default_settings_have_expected_values() {
        let settings = Settings::default();
        assert_eq!(settings.resolver.root, "config.yml");
        assert!(settings.resolver.skills.is_empty());
        assert_eq!(
            settings.resolver.config_file_names,
            vec!["config.yml".to_string(), "config.yaml".to_string()]
        );
    }

    #[test]
    fn load_reads_explicit_file_path() {
        with_scoped_env(&ENV_KEYS, || {
            let tmp = tempfile::tempdir().expect("tempdir");
            let settings_path = tmp.path().join("skillscope.toml");
            write_file(
                &settings_path,
                r#"
[resolver]
root = "project/config.yml"
skills = ["project/skills/a", "project/skills/b"]
config_file_names = ["skill.yml"]
"#,
            );

            let settings = Settings::load(Some(&settings_path)).expect("settings should parse");
            assert_eq!(settings.resolver.root_path(), PathBuf::from("project/config.yml"));
            assert_eq!(
                settings.resolver.skill_paths(),
                vec![
                    PathBuf::from("project/skills/a"),
                    PathBuf::from("project/skills/b"),
                ]
            );
            let reader = settings.resolver.config_reader();
            assert_eq!(reader.file_names(), ["skill.yml".to_string()]);
        });
    }

    #[test]
    fn load_fills_missing_fields_with_defaults() {
        with_scoped_env(&ENV_KEYS, || {
            let tmp = tempfile::tempdir().expect("tempdir");
            let settings_path = tmp.path().join("skillscope.toml");
            write_file(&settings_path, "[resolver]\nskills = [\"extra\"]\n");

            let settings = Settings::load(Some(&settings_path)).expect("settings should parse");
            assert_eq!(settings.resolver.root, "config.yml");
            assert_eq!(settings.resolver.skills, vec!["extra".to_string()]);
            assert_eq!(settings.resolver.config_file_names.len(), 2);
        });
    }

    #[test]
    fn load_returns_toml_error_for_invalid_content() {
        with_scoped_env(&ENV_KEYS, || {
            let tmp = tempfile::tempdir().expect("tempdir");
            let settings_path = tmp.path().join("skillscope.toml");
            write_file(&settings_path, "[resolver\nroot = \"broken\"");
            let err = Settings::load(Some(&settings_path)).expect_err("invalid toml must fail");
            assert!(err.to_string().contains("TOML parse error"));
        });
    }

    #[test]
    fn load_rejects_empty_config_file_names() {
        with_scoped_env(&ENV_KEYS, || {
            let tmp = tempfile::tempdir().expect("tempdir");
            let settings_path = tmp.path().join("skillscope.toml");
            write_file(&settings_path, "[resolver]\nconfig_file_names = []\n");
            let err = Settings::load(Some(&settings_path)).expect_err("empty names must fail");
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
            assert!(err.to_string().contains("resolver.config_file_names"));
        });
    }

    #[test]
    fn load_falls_back_to_home_settings() {
        with_scoped_env(&ENV_KEYS, || {
            let tmp = tempfile::tempdir().expect("tempdir");
            set_env_var("HOME", tmp.path().to_string_lossy().as_ref());
            write_file(
                &tmp.path().join(".skillscope").join("config.toml"),
                "[resolver]\nroot = \"/srv/bot/config.yml\"\n",
            );

            let settings = Settings::load(None).expect("settings load");
            assert_eq!(settings.resolver.root, "/srv/bot/config.yml");
        });
    }

    #[test]
    fn load_applies_env_overrides() {
        with_scoped_env(&ENV_KEYS, || {
            let joined = std::env::join_paths(["/srv/skills/a", "/srv/skills/b"])
                .expect("join paths");
            set_env_var("SKILLSCOPE_ROOT", "/srv/bot/config.yml");
            set_env_var("SKILLSCOPE_SKILLS", joined.to_string_lossy().as_ref());
            set_env_var("SKILLSCOPE_CONFIG_FILE_NAMES", "config.yml, skill.yaml,");

            let tmp = tempfile::tempdir().expect("tempdir");
            let settings_path = tmp.path().join("skillscope.toml");
            write_file(&settings_path, "[resolver]\nroot = \"from-file.yml\"\n");

            let settings = Settings::load(Some(&settings_path)).expect("settings load");
            assert_eq!(settings.resolver.root, "/srv/bot/config.yml");
            assert_eq!(
                settings.resolver.skills,
                vec!["/srv/skills/a".to_string(), "/srv/skills/b".to_string()]
            );
            assert_eq!(
                settings.resolver.config_file_names,
                vec!["config.yml".to_string(), "skill.yaml".to_string()]
            );
        });
    }
}
