//! Row store backends.
//!
//! The dashboard talks to a backend-as-a-service table store through four
//! verbs. Rows are plain JSON objects keyed by an `id` column.
//!
//! | Backend       | Use                                             |
//! |---------------|-------------------------------------------------|
//! | `RestStore`   | PostgREST-style HTTP endpoint (the real remote) |
//! | `SqliteStore` | Local file store for offline use                |
//! | `MemoryStore` | In-process store for tests and dry runs         |

pub mod memory;
pub mod rest;
pub mod sqlite;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::FlowConfig;
use crate::errors::StoreError;

pub use memory::{MemoryStore, StoreCall};
pub use rest::RestStore;
pub use sqlite::SqliteStore;

/// The remote tables the dashboard reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    NewsItems,
    Sources,
    Leads,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewsItems => "news_items",
            Self::Sources => "sources",
            Self::Leads => "leads",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait RowStore: Send + Sync {
    /// All rows of `table` ordered by `column`.
    async fn select_ordered(
        &self,
        table: Table,
        column: &str,
        descending: bool,
    ) -> Result<Vec<Value>, StoreError>;

    async fn insert(&self, table: Table, row: Value) -> Result<(), StoreError>;

    /// Merge `fields` into the row whose `id` matches.
    async fn update(&self, table: Table, id: &str, fields: Value) -> Result<(), StoreError>;

    async fn delete(&self, table: Table, id: &str) -> Result<(), StoreError>;
}

/// Which backend `open_store` builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Rest,
    Sqlite,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rest" => Ok(Self::Rest),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            _ => Err(format!("Invalid store backend: {} (expected rest, sqlite or memory)", s)),
        }
    }
}

/// Build the configured backend.
pub fn open_store(config: &FlowConfig) -> anyhow::Result<Arc<dyn RowStore>> {
    match config.store_backend() {
        StoreBackend::Rest => {
            let url = config.store_url().ok_or_else(|| {
                anyhow::anyhow!("No row store URL configured (set FLOWBOARD_STORE_URL or [store].url)")
            })?;
            let key = config.store_key().unwrap_or_default();
            Ok(Arc::new(RestStore::new(url, key)))
        }
        StoreBackend::Sqlite => {
            let path = config.sqlite_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Ok(Arc::new(SqliteStore::open(&path)?))
        }
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

/// The `id` column as a string, accepting numeric ids.
pub fn row_id(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Shallow-merge the keys of `fields` into `row`.
pub fn merge_fields(row: &mut Value, fields: &Value) {
    if let (Some(target), Some(source)) = (row.as_object_mut(), fields.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Order two rows by one column. Missing and null values sort first, and
/// RFC 3339 strings compare as instants.
pub fn compare_column(a: &Value, b: &Value, column: &str) -> Ordering {
    match (a.get(column), b.get(column)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .unwrap_or_default()
            .partial_cmp(&y.as_f64().unwrap_or_default())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
