//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::store::PAINTS_DIR;

/// Name of the project marker directory
pub const PROJECT_DIR: &str = ".botes";

/// An inventory project: a directory containing `.botes/`
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .botes/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Use an explicit root if given, otherwise discover from the current directory
    pub fn locate(explicit: Option<&Path>) -> Result<Self, ProjectError> {
        match explicit {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::create_layout(root)
    }

    /// Initialize even if .botes/ exists, resetting the config file
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        Self::create_layout(root)
    }

    fn create_layout(root: PathBuf) -> Result<Self, ProjectError> {
        let io = |e: std::io::Error| ProjectError::IoError(e.to_string());

        let botes_dir = root.join(PROJECT_DIR);
        std::fs::create_dir_all(&botes_dir).map_err(io)?;
        std::fs::write(botes_dir.join("config.yaml"), Self::default_config()).map_err(io)?;
        std::fs::create_dir_all(root.join(PAINTS_DIR)).map_err(io)?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r##"# Botes project configuration

# Where paint cans are stored: yaml (one file per can under paints/)
# or sqlite (.botes/paints.db)
# store: yaml

# How a can's color is chosen: code (looked up from the code below)
# or picker (given with --color and stored as is)
# color_mode: code

# Default output format (auto, yaml, tsv, json, csv, md, id, short-id)
# default_format: auto

# Extra code -> color entries, added to the built-in table
# colors:
#   "ROJO FUEGO": "#D62828"
"##
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .botes configuration directory
    pub fn botes_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Path of the project config file
    pub fn config_path(&self) -> PathBuf {
        self.botes_dir().join("config.yaml")
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a botes project (searched from {searched_from:?}). Run 'botes init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("botes project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.botes_dir().is_dir());
        assert!(project.config_path().exists());
        assert!(project.root().join("paints").is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_init_force_resets_config() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(project.config_path(), "store: sqlite\n").unwrap();

        let project = Project::init_force(tmp.path()).unwrap();
        let config = std::fs::read_to_string(project.config_path()).unwrap();
        assert!(config.contains("# store: yaml"));
    }

    #[test]
    fn test_default_config_is_all_comments() {
        let text = Project::default_config();
        assert!(text.ends_with("\"#D62828\"\n"));
        assert!(text
            .lines()
            .all(|line| line.is_empty() || line.starts_with('#')));

        let config: crate::core::Config = serde_yml::from_str(text).unwrap_or_default();
        assert!(config.store.is_none());
        assert!(config.colors.is_empty());
    }

    #[test]
    fn test_project_discover_finds_botes_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_botes_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_locate_with_explicit_path() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();
        let project = Project::locate(Some(tmp.path())).unwrap();
        assert!(project.botes_dir().is_dir());
    }
}
