//! Local mirror store: the last-known-good snapshot of each resource kind.
//!
//! Backed by one SQLite file holding a key-value table. Each resource kind
//! owns one key whose value is the JSON array of its records; a save
//! replaces the whole snapshot in a single statement.

mod migrations;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::records::Record;
use crate::util::unix_timestamp_millis;

/// Durable key-value store shared by all synchronizers.
#[derive(Clone)]
pub struct MirrorStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl MirrorStore {
    /// Open the store at the given path, creating it if it doesn't exist
    ///
    /// Runs migrations automatically.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&path)?;
        Self::configure(&conn)?;
        migrations::run(&conn)?;
        tracing::debug!("Opened mirror store at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path),
        })
    }

    /// Open an in-memory store (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    fn configure(conn: &Connection) -> Result<()> {
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(())
    }

    /// Filesystem location, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Replace the snapshot of `R`'s kind with `records`.
    pub async fn save<R: Record>(&self, records: &[R]) -> Result<()> {
        self.put_value(R::KIND.storage_key(), records).await?;
        tracing::debug!(
            kind = R::KIND.storage_key(),
            count = records.len(),
            "Saved mirror snapshot"
        );
        Ok(())
    }

    /// Load the snapshot of `R`'s kind, `None` if it was never saved.
    pub async fn load<R: Record>(&self) -> Result<Option<Vec<R>>> {
        self.get_value(R::KIND.storage_key()).await
    }

    /// Drop the snapshot of `R`'s kind.
    pub async fn clear<R: Record>(&self) -> Result<()> {
        self.remove_value(R::KIND.storage_key()).await
    }

    /// Store any serializable value under `key`, replacing what was there.
    pub async fn put_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO mirror (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, raw, unix_timestamp_millis()],
        )?;
        Ok(())
    }

    /// Read the value under `key`, `None` if absent.
    pub async fn get_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw: Option<String> = {
            let conn = self.conn.lock().await;
            conn.query_row(
                "SELECT value FROM mirror WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?
        };

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn remove_value(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM mirror WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Unix ms timestamp of the last write to `key`
    pub async fn updated_at(&self, key: &str) -> Result<Option<i64>> {
        let conn = self.conn.lock().await;
        let updated_at = conn
            .query_row(
                "SELECT updated_at FROM mirror WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Crop, FarmType, RecordId};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn crop(id: i64, name: &str) -> Crop {
        Crop {
            id: RecordId::Server(id),
            name: name.to_string(),
            crop_type: None,
            description: String::new(),
            image: None,
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn load_distinguishes_absent_from_empty() {
        let store = MirrorStore::open_in_memory().unwrap();
        assert_eq!(store.load::<Crop>().await.unwrap(), None);

        store.save::<Crop>(&[]).await.unwrap();
        assert_eq!(store.load::<Crop>().await.unwrap(), Some(Vec::new()));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn save_replaces_whole_snapshot() {
        let store = MirrorStore::open_in_memory().unwrap();
        store
            .save(&[crop(1, "Maize"), crop(2, "Beans")])
            .await
            .unwrap();
        store.save(&[crop(3, "Sorghum")]).await.unwrap();

        assert_eq!(
            store.load::<Crop>().await.unwrap(),
            Some(vec![crop(3, "Sorghum")])
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn kinds_are_stored_independently() {
        let store = MirrorStore::open_in_memory().unwrap();
        store.save(&[crop(1, "Maize")]).await.unwrap();

        assert_eq!(store.load::<FarmType>().await.unwrap(), None);
        store.clear::<Crop>().await.unwrap();
        assert_eq!(store.load::<Crop>().await.unwrap(), None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn snapshot_survives_reopen() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("mirror.db");

        {
            let store = MirrorStore::open(&path).unwrap();
            store.save(&[crop(7, "Maize")]).await.unwrap();
        }

        let reopened = MirrorStore::open(&path).unwrap();
        assert_eq!(
            reopened.load::<Crop>().await.unwrap(),
            Some(vec![crop(7, "Maize")])
        );
        assert!(reopened.updated_at("crops").await.unwrap().is_some());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn corrupt_snapshot_is_an_error_not_absent() {
        let store = MirrorStore::open_in_memory().unwrap();
        {
            let conn = store.conn.lock().await;
            conn.execute(
                "INSERT INTO mirror (key, value, updated_at) VALUES ('crops', 'not json', 0)",
                [],
            )
            .unwrap();
        }

        assert!(store.load::<Crop>().await.is_err());
    }
}
