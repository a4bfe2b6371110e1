//! SQLite backend: a single table of JSON documents

use rusqlite::{params, Connection};
use std::fs;
use std::path::Path;

use super::{RecordStore, StoreError};
use crate::core::identity::RecordId;
use crate::entities::{Paint, PaintCan};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS paints (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    doc TEXT NOT NULL
);
"#;

/// Paint cans as JSON documents, iterated in insertion order
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::connection)?;
        }
        let conn = Connection::open(path).map_err(|e| {
            StoreError::Connection(format!("cannot open {}: {}", path.display(), e))
        })?;
        Self::with_connection(conn)
    }

    /// Database that lives only as long as the store
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::connection)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(StoreError::connection)?;
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteStore {
    fn find_all(&self) -> Result<Vec<PaintCan>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, doc FROM paints ORDER BY seq")
            .map_err(StoreError::connection)?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(StoreError::connection)?;

        let mut cans = Vec::new();
        for row in rows {
            let (id, doc) = row.map_err(StoreError::connection)?;
            match serde_json::from_str::<PaintCan>(&doc) {
                Ok(can) => cans.push(can),
                Err(e) => tracing::warn!(%id, error = %e, "skipping unreadable document"),
            }
        }

        tracing::debug!(count = cans.len(), "loaded paint cans");
        Ok(cans)
    }

    fn insert(&mut self, paint: Paint) -> Result<RecordId, StoreError> {
        let can = PaintCan::new(RecordId::new(), paint);
        let doc = serde_json::to_string(&can).map_err(StoreError::connection)?;
        self.conn
            .execute(
                "INSERT INTO paints (id, doc) VALUES (?1, ?2)",
                params![can.id.to_string(), doc],
            )
            .map_err(StoreError::connection)?;
        tracing::debug!(id = %can.id, "inserted paint can");
        Ok(can.id)
    }

    fn update(&mut self, id: &RecordId, paint: Paint) -> Result<(), StoreError> {
        let doc = serde_json::to_string(&PaintCan::new(*id, paint)).map_err(StoreError::connection)?;
        let changed = self
            .conn
            .execute(
                "UPDATE paints SET doc = ?2 WHERE id = ?1",
                params![id.to_string(), doc],
            )
            .map_err(StoreError::connection)?;
        if changed == 0 {
            return Err(StoreError::NotFound(*id));
        }
        tracing::debug!(%id, "updated paint can");
        Ok(())
    }

    fn delete(&mut self, id: &RecordId) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM paints WHERE id = ?1", params![id.to_string()])
            .map_err(StoreError::connection)?;
        if changed == 0 {
            return Err(StoreError::NotFound(*id));
        }
        tracing::debug!(%id, "deleted paint can");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::contract;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_then_find_all_keeps_order() {
        contract::insert_then_find_all_keeps_order(&mut store());
    }

    #[test]
    fn test_update_replaces_whole_record() {
        contract::update_replaces_whole_record(&mut store());
    }

    #[test]
    fn test_update_keeps_position() {
        contract::update_keeps_position(&mut store());
    }

    #[test]
    fn test_delete_removes_record() {
        contract::delete_removes_record(&mut store());
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        contract::unknown_ids_are_not_found(&mut store());
    }

    #[test]
    fn test_reopen_file_keeps_records() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".botes/paints.db");

        let id = {
            let mut store = SqliteStore::open(&path).unwrap();
            store.insert(Paint::new("Negro", "NEGRO", Default::default())).unwrap()
        };

        let store = SqliteStore::open(&path).unwrap();
        let all = store.find_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
    }

    #[test]
    fn test_find_all_skips_broken_documents() {
        let mut store = store();
        store.insert(Paint::new("Bueno", "B", Default::default())).unwrap();
        store
            .conn
            .execute(
                "INSERT INTO paints (id, doc) VALUES ('BOTE-broken', '{not json')",
                [],
            )
            .unwrap();

        let all = store.find_all().unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_sparse_documents_use_defaults() {
        let store = store();
        let id = RecordId::new();
        store
            .conn
            .execute(
                "INSERT INTO paints (id, doc) VALUES (?1, ?2)",
                params![id.to_string(), format!(r#"{{"id":"{}","name":"Solo nombre"}}"#, id)],
            )
            .unwrap();

        let all = store.find_all().unwrap();
        assert_eq!(all[0].paint.percent, 0);
        assert!(!all[0].paint.mixed);
        assert_eq!(all[0].paint.code, "");
    }
}
