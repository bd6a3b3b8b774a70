//! SQLite storage implementation
//!
//! One `SqliteStorage` value is one write session running inside a single
//! transaction. `commit` records the run and makes all writes durable;
//! `rollback` (or dropping the session uncommitted, including on panic)
//! leaves the backing store unchanged from its pre-session state.

use crate::model::{Resource, ResourceKind};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
    config_hash: String,
    started_at: DateTime<Utc>,
    open: bool,
}

impl SqliteStorage {
    /// Opens a session against the database at `path`, creating the schema
    /// if needed
    ///
    /// The schema is applied outside the session transaction so that a later
    /// rollback cannot undo it.
    pub fn open(path: &Path, config_hash: &str) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Self::begin(conn, config_hash)
    }

    /// Opens a session against an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Self::begin(conn, "in-memory")
    }

    fn begin(conn: Connection, config_hash: &str) -> StorageResult<Self> {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Self {
            conn,
            config_hash: config_hash.to_string(),
            started_at: Utc::now(),
            open: true,
        })
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(StorageError::SessionClosed)
        }
    }

    fn row_to_resource(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, Option<String>, String, String)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
        ))
    }

    fn decode(
        (kind, key, parent_key, data, discovered_at): (String, String, Option<String>, String, String),
    ) -> StorageResult<Resource> {
        let kind = ResourceKind::from_str(&kind)
            .ok_or_else(|| StorageError::Corrupt(format!("unknown kind '{}'", kind)))?;
        let data = serde_json::from_str(&data)?;
        let discovered_at = DateTime::parse_from_rfc3339(&discovered_at)
            .map_err(|e| StorageError::Corrupt(format!("bad timestamp: {}", e)))?
            .with_timezone(&Utc);
        Ok(Resource {
            kind,
            key,
            parent_key,
            data,
            discovered_at,
        })
    }

    fn select_rows(
        &self,
        kind: Option<ResourceKind>,
    ) -> StorageResult<Vec<Resource>> {
        let mut resources = Vec::new();
        match kind {
            Some(k) => {
                let mut stmt = self.conn.prepare(
                    "SELECT kind, key, parent_key, data, discovered_at FROM resources WHERE kind = ?1",
                )?;
                let rows = stmt.query_map(params![k.as_str()], Self::row_to_resource)?;
                for row in rows {
                    resources.push(Self::decode(row?)?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT kind, key, parent_key, data, discovered_at FROM resources",
                )?;
                let rows = stmt.query_map([], Self::row_to_resource)?;
                for row in rows {
                    resources.push(Self::decode(row?)?);
                }
            }
        }
        Ok(resources)
    }
}

impl Storage for SqliteStorage {
    fn write(&mut self, resource: &Resource) -> StorageResult<()> {
        self.ensure_open()?;
        let data = serde_json::to_string(&resource.data)?;
        self.conn.execute(
            "INSERT INTO resources (kind, key, parent_key, data, discovered_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(kind, key) DO UPDATE SET
                 parent_key = excluded.parent_key,
                 data = excluded.data,
                 discovered_at = excluded.discovered_at",
            params![
                resource.kind.as_str(),
                resource.key,
                resource.parent_key,
                data,
                resource.discovered_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn iterate(
        &self,
        kind: Option<ResourceKind>,
    ) -> StorageResult<Box<dyn Iterator<Item = Resource> + '_>> {
        self.ensure_open()?;
        Ok(Box::new(self.select_rows(kind)?.into_iter()))
    }

    fn count(&self, kind: Option<ResourceKind>) -> StorageResult<u64> {
        self.ensure_open()?;
        let count: i64 = match kind {
            Some(k) => self.conn.query_row(
                "SELECT COUNT(*) FROM resources WHERE kind = ?1",
                params![k.as_str()],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM resources", [], |row| row.get(0))?,
        };
        Ok(count as u64)
    }

    fn kinds(&self) -> StorageResult<BTreeSet<ResourceKind>> {
        self.ensure_open()?;
        let mut stmt = self.conn.prepare("SELECT DISTINCT kind FROM resources")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut kinds = BTreeSet::new();
        for row in rows {
            let s = row?;
            let kind = ResourceKind::from_str(&s)
                .ok_or_else(|| StorageError::Corrupt(format!("unknown kind '{}'", s)))?;
            kinds.insert(kind);
        }
        Ok(kinds)
    }

    fn commit(&mut self) -> StorageResult<()> {
        self.ensure_open()?;
        self.conn.execute(
            "INSERT INTO runs (started_at, finished_at, config_hash) VALUES (?1, ?2, ?3)",
            params![
                self.started_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
                self.config_hash,
            ],
        )?;
        self.conn.execute_batch("COMMIT")?;
        self.open = false;
        Ok(())
    }

    fn rollback(&mut self) -> StorageResult<()> {
        self.ensure_open()?;
        self.conn.execute_batch("ROLLBACK")?;
        self.open = false;
        Ok(())
    }
}

impl Drop for SqliteStorage {
    fn drop(&mut self) {
        if self.open {
            tracing::debug!("Dropping uncommitted storage session, rolling back");
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn project(key: &str) -> Resource {
        Resource::new(
            ResourceKind::Project,
            key,
            Some("organizations/42".to_string()),
            json!({"lifecycleState": "ACTIVE"}),
        )
    }

    #[test]
    fn test_write_and_read_back() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.write(&project("projects/p1")).unwrap();

        let stored: Vec<_> = storage.iterate(Some(ResourceKind::Project)).unwrap().collect();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].key, "projects/p1");
        assert_eq!(stored[0].parent_key.as_deref(), Some("organizations/42"));
        assert_eq!(stored[0].data["lifecycleState"], "ACTIVE");
    }

    #[test]
    fn test_upsert_replaces_payload() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.write(&project("projects/p1")).unwrap();

        let mut updated = project("projects/p1");
        updated.data = json!({"lifecycleState": "DELETE_REQUESTED"});
        storage.write(&updated).unwrap();

        assert_eq!(storage.count(None).unwrap(), 1);
        let stored: Vec<_> = storage.iterate(None).unwrap().collect();
        assert_eq!(stored[0].data["lifecycleState"], "DELETE_REQUESTED");
    }

    #[test]
    fn test_commit_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("inventory.db");

        let mut storage = SqliteStorage::open(&db, "hash-a").unwrap();
        storage.write(&project("projects/p1")).unwrap();
        storage.commit().unwrap();
        drop(storage);

        let reopened = SqliteStorage::open(&db, "hash-b").unwrap();
        assert_eq!(reopened.count(None).unwrap(), 1);
    }

    #[test]
    fn test_rollback_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("inventory.db");

        let mut storage = SqliteStorage::open(&db, "hash").unwrap();
        storage.write(&project("projects/p1")).unwrap();
        storage.rollback().unwrap();
        drop(storage);

        let reopened = SqliteStorage::open(&db, "hash").unwrap();
        assert_eq!(reopened.count(None).unwrap(), 0);
    }

    #[test]
    fn test_drop_without_commit_discards_writes() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("inventory.db");

        {
            let mut storage = SqliteStorage::open(&db, "hash").unwrap();
            storage.write(&project("projects/p1")).unwrap();
            // Session dropped uncommitted
        }

        let reopened = SqliteStorage::open(&db, "hash").unwrap();
        assert_eq!(reopened.count(None).unwrap(), 0);
    }

    #[test]
    fn test_write_after_commit_fails() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.commit().unwrap();
        let result = storage.write(&project("projects/p1"));
        assert!(matches!(result, Err(StorageError::SessionClosed)));
    }

    #[test]
    fn test_kinds_distinct() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.write(&project("projects/p1")).unwrap();
        storage.write(&project("projects/p2")).unwrap();
        storage
            .write(&Resource::new(ResourceKind::Bucket, "buckets/b", None, json!({})))
            .unwrap();

        let kinds = storage.kinds().unwrap();
        assert_eq!(kinds.len(), 2);
    }
}
