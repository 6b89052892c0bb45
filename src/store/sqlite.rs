use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

use super::{RowStore, Table, merge_fields, row_id};
use crate::errors::StoreError;

/// Local row store: every logical table lives in one SQLite table of JSON
/// payloads keyed by `(table_name, id)`.
#[derive(Clone)]
pub struct SqliteStore {
    inner: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(StoreError::Database)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::Database)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS rows (
                 table_name TEXT NOT NULL,
                 id         TEXT NOT NULL,
                 payload    TEXT NOT NULL,
                 PRIMARY KEY (table_name, id)
             );",
        )
        .map_err(StoreError::Database)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure with the connection on the blocking pool.
    async fn call<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&Connection) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        let conn = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::TaskJoin(e.to_string()))?
    }
}

fn decode(table: Table, payload: &str) -> Result<Value, StoreError> {
    serde_json::from_str(payload).map_err(|source| StoreError::Decode {
        table: table.as_str().to_string(),
        source,
    })
}

#[async_trait]
impl RowStore for SqliteStore {
    async fn select_ordered(
        &self,
        table: Table,
        column: &str,
        descending: bool,
    ) -> Result<Vec<Value>, StoreError> {
        let path = format!("$.{column}");
        // Timestamps sort by instant, not text; anything else by its value.
        let sql = format!(
            "SELECT payload FROM rows WHERE table_name = ?1
             ORDER BY COALESCE(julianday(json_extract(payload, ?2)), json_extract(payload, ?2)) {}",
            if descending { "DESC" } else { "ASC" }
        );
        self.call(move |conn| {
            let mut stmt = conn.prepare(&sql).map_err(StoreError::Database)?;
            let payloads = stmt
                .query_map(params![table.as_str(), path], |row| row.get::<_, String>(0))
                .map_err(StoreError::Database)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(StoreError::Database)?;
            payloads.iter().map(|p| decode(table, p)).collect()
        })
        .await
    }

    async fn insert(&self, table: Table, mut row: Value) -> Result<(), StoreError> {
        let id = match row_id(&row) {
            Some(id) => id,
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                merge_fields(&mut row, &serde_json::json!({ "id": id }));
                id
            }
        };
        self.call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO rows (table_name, id, payload) VALUES (?1, ?2, ?3)",
                params![table.as_str(), id, row.to_string()],
            )
            .map_err(StoreError::Database)?;
            Ok(())
        })
        .await
    }

    async fn update(&self, table: Table, id: &str, fields: Value) -> Result<(), StoreError> {
        let id = id.to_string();
        self.call(move |conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT payload FROM rows WHERE table_name = ?1 AND id = ?2",
                    params![table.as_str(), id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(StoreError::Database)?;
            let Some(payload) = existing else {
                return Ok(());
            };
            let mut row = decode(table, &payload)?;
            merge_fields(&mut row, &fields);
            conn.execute(
                "UPDATE rows SET payload = ?3 WHERE table_name = ?1 AND id = ?2",
                params![table.as_str(), id, row.to_string()],
            )
            .map_err(StoreError::Database)?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, table: Table, id: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        self.call(move |conn| {
            conn.execute(
                "DELETE FROM rows WHERE table_name = ?1 AND id = ?2",
                params![table.as_str(), id],
            )
            .map_err(StoreError::Database)?;
            Ok(())
        })
        .await
    }
}
