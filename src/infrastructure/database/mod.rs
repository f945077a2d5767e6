use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::application::errors::StorageError;
use crate::domain::entities::{Id, Suggestion};
use crate::domain::traits::SuggestionStore;

/// SQLite-backed suggestion store. Queries run on the blocking pool.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        init_tables(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Run `f` against the connection off the async reactor
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = lock(&conn);
            let conn = guard.as_ref().ok_or(StorageError::Closed)?;
            f(conn)
        })
        .await
        .map_err(|e| StorageError::Io(std::io::Error::other(e)))?
    }

    pub async fn add_suggestion(&self, suggestion: &Suggestion) -> Result<(), StorageError> {
        let s = suggestion.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO suggestions
                 (id, idx, emoji_name, emoji_url, in_public_queue)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![s.id as i64, s.idx, s.emoji_name, s.emoji_url, s.in_public_queue],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn set_public(&self, id: Id, public: bool) -> Result<bool, StorageError> {
        self.with_conn(move |conn| {
            let rows = conn.execute(
                "UPDATE suggestions SET in_public_queue = ?1 WHERE id = ?2",
                rusqlite::params![public, id as i64],
            )?;
            Ok(rows > 0)
        })
        .await
    }
}

fn lock(conn: &Mutex<Option<Connection>>) -> MutexGuard<'_, Option<Connection>> {
    conn.lock().unwrap_or_else(PoisonError::into_inner)
}

fn init_tables(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS suggestions (
            id INTEGER PRIMARY KEY,
            idx INTEGER NOT NULL,
            emoji_name TEXT NOT NULL,
            emoji_url TEXT NOT NULL,
            in_public_queue INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_suggestions_public ON suggestions(in_public_queue)",
        [],
    )?;

    Ok(())
}

#[async_trait]
impl SuggestionStore for Database {
    async fn get_suggestion_by_id(&self, id: Id) -> Result<Suggestion, StorageError> {
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, idx, emoji_name, emoji_url, in_public_queue
                 FROM suggestions WHERE id = ?1",
                [id as i64],
                |row| {
                    Ok(Suggestion {
                        id: row.get::<_, i64>(0)? as Id,
                        idx: row.get(1)?,
                        emoji_name: row.get(2)?,
                        emoji_url: row.get(3)?,
                        in_public_queue: row.get(4)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| StorageError::NotFound(format!("suggestion {}", id)))
        })
        .await
    }

    async fn close(&self) -> Result<(), StorageError> {
        let conn = Arc::clone(&self.conn);
        let taken = tokio::task::spawn_blocking(move || lock(&conn).take())
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;
        if let Some(conn) = taken {
            conn.close().map_err(|(_, e)| StorageError::Database(e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_suggestion_roundtrip() {
        let db = Database::in_memory().unwrap();
        db.add_suggestion(&Suggestion::new(12, 3, "blobcat", "https://cdn.example/s12.png"))
            .await
            .unwrap();

        let found = db.get_suggestion_by_id(12).await.unwrap();
        assert_eq!(found.idx, 3);
        assert_eq!(found.emoji_name, "blobcat");
        assert!(!found.in_public_queue);

        assert!(db.set_public(12, true).await.unwrap());
        assert!(db.get_suggestion_by_id(12).await.unwrap().in_public_queue);
    }

    #[tokio::test]
    async fn test_missing_suggestion_is_not_found() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(db.get_suggestion_by_id(1).await, Err(StorageError::NotFound(_))));
        assert!(!db.set_public(1, true).await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_database_rejects_queries() {
        let db = Database::in_memory().unwrap();
        db.close().await.unwrap();
        assert!(matches!(db.get_suggestion_by_id(1).await, Err(StorageError::Closed)));
    }
}
