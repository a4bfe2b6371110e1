//! Plain-text backend: one YAML document per paint can

use console::style;
use std::fs;
use std::path::{Path, PathBuf};

use super::{RecordStore, StoreError};
use crate::core::identity::RecordId;
use crate::entities::{Paint, PaintCan};

/// File suffix for paint can documents
pub const DOCUMENT_SUFFIX: &str = ".botes.yaml";

/// Stores each can as `<dir>/BOTE-<ULID>.botes.yaml`
#[derive(Debug)]
pub struct YamlStore {
    dir: PathBuf,
}

impl YamlStore {
    /// Open a document directory, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            StoreError::Connection(format!("cannot open {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for an id
    pub fn document_path(&self, id: &RecordId) -> PathBuf {
        self.dir.join(format!("{}{}", id, DOCUMENT_SUFFIX))
    }

    fn write(&self, can: &PaintCan) -> Result<(), StoreError> {
        let yaml = serde_yml::to_string(can).map_err(StoreError::connection)?;
        fs::write(self.document_path(&can.id), yaml).map_err(StoreError::connection)
    }
}

impl RecordStore for YamlStore {
    fn find_all(&self) -> Result<Vec<PaintCan>, StoreError> {
        let mut cans = Vec::new();

        for entry in walkdir::WalkDir::new(&self.dir).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                // The directory itself is unreadable: nothing can be listed
                Err(e) if e.depth() == 0 => {
                    return Err(StoreError::Connection(format!(
                        "cannot read {}: {}",
                        self.dir.display(),
                        e
                    )));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file()
                || !entry.path().to_string_lossy().ends_with(DOCUMENT_SUFFIX)
            {
                continue;
            }

            match crate::yaml::parse_yaml_file::<PaintCan>(entry.path()) {
                Ok(can) => cans.push(can),
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), error = %e, "skipping unreadable document");
                    eprintln!(
                        "{} Failed to parse {}: {}",
                        style("!").yellow(),
                        entry.path().display(),
                        e
                    );
                }
            }
        }

        // ULID order is creation order
        cans.sort_by_key(|can| can.id);
        tracing::debug!(count = cans.len(), dir = %self.dir.display(), "loaded paint cans");
        Ok(cans)
    }

    fn insert(&mut self, paint: Paint) -> Result<RecordId, StoreError> {
        let can = PaintCan::new(RecordId::new(), paint);
        self.write(&can)?;
        tracing::debug!(id = %can.id, "inserted paint can");
        Ok(can.id)
    }

    fn update(&mut self, id: &RecordId, paint: Paint) -> Result<(), StoreError> {
        if !self.document_path(id).exists() {
            return Err(StoreError::NotFound(*id));
        }
        self.write(&PaintCan::new(*id, paint))?;
        tracing::debug!(%id, "updated paint can");
        Ok(())
    }

    fn delete(&mut self, id: &RecordId) -> Result<(), StoreError> {
        let path = self.document_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(*id));
        }
        fs::remove_file(&path).map_err(StoreError::connection)?;
        tracing::debug!(%id, "deleted paint can");
        Ok(())
    }
}
