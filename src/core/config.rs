//! Configuration management with layered hierarchy
//!
//! Sources, lowest priority first: built-in defaults, the global user file
//! (`~/.config/botes/config.yaml`), the project file (`.botes/config.yaml`),
//! then `BOTES_*` environment variables. Config is read once per command and
//! never changes afterwards.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::color::{ColorHex, ColorMode, ColorResolver};
use crate::core::project::Project;
use crate::core::store::StoreBackend;

/// Botes configuration with layered hierarchy
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreBackend>,

    /// How colors are assigned to new cans
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_mode: Option<ColorMode>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,

    /// Extra code -> color entries on top of the built-in table
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub colors: BTreeMap<String, ColorHex>,
}

/// A config source that exists but cannot be used
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("invalid config file {path}: {message}")]
    #[diagnostic(help("fix or remove the file; `botes config path` shows where it lives"))]
    InvalidFile { path: PathBuf, message: String },

    #[error("invalid {var}: {message}")]
    #[diagnostic(help("unset {var} or set it to a supported value"))]
    InvalidEnv { var: &'static str, message: String },
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// Missing files are skipped. A file or environment override that is
    /// present but invalid is an error, never a silent fallback to defaults.
    pub fn load(project: Option<&Project>) -> Result<Self, ConfigError> {
        Self::load_with(project, |key| std::env::var(key).ok())
    }

    fn load_with(
        project: Option<&Project>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&path)? {
                config.merge(global);
            }
        }

        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path())? {
                config.merge(project_config);
            }
        }

        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Read one config file; a missing file contributes nothing
    pub fn read_file(path: &Path) -> Result<Option<Config>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        match crate::yaml::parse_yaml_file::<Config>(path) {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "invalid config file");
                Err(ConfigError::InvalidFile {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "botes")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.store.is_some() {
            self.store = other.store;
        }
        if other.color_mode.is_some() {
            self.color_mode = other.color_mode;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        self.colors.extend(other.colors);
    }

    /// Override from `BOTES_STORE` / `BOTES_COLOR_MODE`
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(value) = lookup("BOTES_STORE") {
            let store = value.parse::<StoreBackend>().map_err(|e| ConfigError::InvalidEnv {
                var: "BOTES_STORE",
                message: e.to_string(),
            })?;
            self.store = Some(store);
        }
        if let Some(value) = lookup("BOTES_COLOR_MODE") {
            let mode = value.parse::<ColorMode>().map_err(|e| ConfigError::InvalidEnv {
                var: "BOTES_COLOR_MODE",
                message: e.to_string(),
            })?;
            self.color_mode = Some(mode);
        }
        Ok(())
    }

    pub fn store_backend(&self) -> StoreBackend {
        self.store.unwrap_or_default()
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode.unwrap_or_default()
    }

    /// Color table: built-ins extended by configured entries
    pub fn resolver(&self) -> ColorResolver {
        ColorResolver::builtin().with_entries(self.colors.iter().map(|(k, v)| (k, *v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parse(yaml: &str) -> Config {
        serde_yml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store_backend(), StoreBackend::Yaml);
        assert_eq!(config.color_mode(), ColorMode::Code);
        assert_eq!(config.resolver().len(), 4);
    }

    #[test]
    fn test_parse_all_keys() {
        let config = parse(
            "store: sqlite\ncolor_mode: picker\ndefault_format: json\ncolors:\n  rojo fuego: '#D62828'\n",
        );
        assert_eq!(config.store_backend(), StoreBackend::Sqlite);
        assert_eq!(config.color_mode(), ColorMode::Picker);
        assert_eq!(config.default_format.as_deref(), Some("json"));
        assert_eq!(config.resolver().resolve("ROJO FUEGO").to_string(), "#D62828");
    }

    #[test]
    fn test_merge_later_layer_wins() {
        let mut config = parse("store: sqlite\ncolors:\n  A: '#111111'\n  B: '#222222'\n");
        config.merge(parse("color_mode: picker\ncolors:\n  B: '#333333'\n"));

        assert_eq!(config.store_backend(), StoreBackend::Sqlite);
        assert_eq!(config.color_mode(), ColorMode::Picker);
        assert_eq!(config.colors.len(), 2);
        assert_eq!(config.resolver().resolve("b").to_string(), "#333333");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = parse("store: yaml\n");
        config
            .apply_env(|key| match key {
                "BOTES_STORE" => Some("sqlite".to_string()),
                "BOTES_COLOR_MODE" => Some("picker".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.store_backend(), StoreBackend::Sqlite);
        assert_eq!(config.color_mode(), ColorMode::Picker);
    }

    #[test]
    fn test_invalid_env_is_an_error() {
        let mut config = parse("store: sqlite\n");
        let err = config
            .apply_env(|key| (key == "BOTES_STORE").then(|| "postgres".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "BOTES_STORE", .. }));

        let err = config
            .apply_env(|key| (key == "BOTES_COLOR_MODE").then(|| "bogus".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "BOTES_COLOR_MODE", .. }));
        assert_eq!(config.store_backend(), StoreBackend::Sqlite);
    }

    #[test]
    fn test_read_file_rejects_invalid() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "colors:\n  A: 'not-a-color'\n").unwrap();
        assert!(matches!(
            Config::read_file(&path),
            Err(ConfigError::InvalidFile { .. })
        ));
        assert!(Config::read_file(&tmp.path().join("missing.yaml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_load_reads_project_config() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(project.config_path(), "colors:\n  azulete: '#1F4E9C'\n").unwrap();

        let config = Config::load_with(Some(&project), |_| None).unwrap();
        assert_eq!(config.resolver().resolve("AZULETE").to_string(), "#1F4E9C");
    }

    #[test]
    fn test_load_fails_on_invalid_project_config() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(project.config_path(), "store: sqlite\ncolors:\n  ROJO: red\n").unwrap();

        let err = Config::load_with(Some(&project), |_| None).unwrap_err();
        assert!(err.to_string().contains("invalid config file"));
    }
}
