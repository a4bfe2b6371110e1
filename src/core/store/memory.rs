//! In-process backend

use super::{RecordStore, StoreError};
use crate::core::identity::RecordId;
use crate::entities::{Paint, PaintCan};

/// Vec-backed store, for tests and embedding
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    cans: Vec<PaintCan>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: &RecordId) -> Result<usize, StoreError> {
        self.cans
            .iter()
            .position(|can| can.id == *id)
            .ok_or(StoreError::NotFound(*id))
    }
}

impl RecordStore for MemoryStore {
    fn find_all(&self) -> Result<Vec<PaintCan>, StoreError> {
        Ok(self.cans.clone())
    }

    fn insert(&mut self, paint: Paint) -> Result<RecordId, StoreError> {
        let id = RecordId::new();
        self.cans.push(PaintCan::new(id, paint));
        Ok(id)
    }

    fn update(&mut self, id: &RecordId, paint: Paint) -> Result<(), StoreError> {
        let idx = self.position(id)?;
        self.cans[idx].paint = paint;
        Ok(())
    }

    fn delete(&mut self, id: &RecordId) -> Result<(), StoreError> {
        let idx = self.position(id)?;
        self.cans.remove(idx);
        Ok(())
    }
}
