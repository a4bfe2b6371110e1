//! Persistence for paint can records
//!
//! A [`RecordStore`] is the only shared mutable resource in the toolkit. It
//! offers four operations, with no transactional coordination between them:
//!
//! - `find_all` - every record, in insertion order
//! - `insert` - persist a new record and assign its id
//! - `update` - replace a whole record
//! - `delete` - remove a record
//!
//! Any backend failure is reported as a single opaque
//! [`StoreError::Connection`]. Callers do not retry.

mod memory;
mod sqlite;
mod yaml;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use yaml::YamlStore;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::identity::RecordId;
use crate::core::project::Project;
use crate::entities::{Paint, PaintCan};

/// Directory holding YAML documents, relative to the project root
pub const PAINTS_DIR: &str = "paints";

/// SQLite database file, relative to the project root
pub const SQLITE_FILE: &str = ".botes/paints.db";

/// Storage operations consumed by the CLI
pub trait RecordStore {
    /// Load every record in store iteration order
    fn find_all(&self) -> Result<Vec<PaintCan>, StoreError>;

    /// Persist a new record and return its assigned id
    fn insert(&mut self, paint: Paint) -> Result<RecordId, StoreError>;

    /// Replace the record with the given id
    fn update(&mut self, id: &RecordId, paint: Paint) -> Result<(), StoreError>;

    /// Remove the record with the given id
    fn delete(&mut self, id: &RecordId) -> Result<(), StoreError>;
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// One YAML document per can under `paints/`
    #[default]
    Yaml,
    /// JSON documents in `.botes/paints.db`
    Sqlite,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Yaml => write!(f, "yaml"),
            StoreBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yaml" => Ok(StoreBackend::Yaml),
            "sqlite" => Ok(StoreBackend::Sqlite),
            _ => Err(format!("Unknown store backend: {} (use yaml or sqlite)", s)),
        }
    }
}

/// Store failures
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("connection error: {0}")]
    #[diagnostic(
        code(botes::store::connection),
        help("check that the project directory is readable and the store setting is valid")
    )]
    Connection(String),

    #[error("no paint can with id {0}")]
    #[diagnostic(code(botes::store::not_found))]
    NotFound(RecordId),
}

impl StoreError {
    pub(crate) fn connection(err: impl std::fmt::Display) -> Self {
        StoreError::Connection(err.to_string())
    }
}

/// Open the configured backend for a project
pub fn open_store(
    project: &Project,
    backend: StoreBackend,
) -> Result<Box<dyn RecordStore>, StoreError> {
    tracing::debug!(%backend, root = %project.root().display(), "opening store");
    match backend {
        StoreBackend::Yaml => Ok(Box::new(YamlStore::open(project.root().join(PAINTS_DIR))?)),
        StoreBackend::Sqlite => Ok(Box::new(SqliteStore::open(project.root().join(SQLITE_FILE))?)),
    }
}
