use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::{RowStore, Table, compare_column, merge_fields, row_id};
use crate::errors::StoreError;

/// A call observed by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Select(Table),
    Insert(Table, String),
    Update(Table, String, Value),
    Delete(Table, String),
}

/// In-process row store with call recording and failure injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    calls: Mutex<Vec<StoreCall>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `rows` in `table`.
    pub fn with_rows(table: Table, rows: Vec<Value>) -> Self {
        let store = Self::new();
        store.lock_tables().insert(table, rows);
        store
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.lock_tables().get(&table).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Writes recorded so far (everything except selects).
    pub fn writes(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, StoreCall::Select(_)))
            .collect()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock_tables(&self) -> MutexGuard<'_, HashMap<Table, Vec<Value>>> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: StoreCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn check_write(&self, table: Table) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Injected(format!("write to {table} rejected")));
        }
        Ok(())
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn select_ordered(
        &self,
        table: Table,
        column: &str,
        descending: bool,
    ) -> Result<Vec<Value>, StoreError> {
        self.record(StoreCall::Select(table));
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Injected(format!("read from {table} rejected")));
        }
        let mut rows = self.rows(table);
        rows.sort_by(|a, b| {
            let ord = compare_column(a, b, column);
            if descending { ord.reverse() } else { ord }
        });
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<(), StoreError> {
        self.record(StoreCall::Insert(table, row_id(&row).unwrap_or_default()));
        self.check_write(table)?;
        self.lock_tables().entry(table).or_default().push(row);
        Ok(())
    }

    async fn update(&self, table: Table, id: &str, fields: Value) -> Result<(), StoreError> {
        self.record(StoreCall::Update(table, id.to_string(), fields.clone()));
        self.check_write(table)?;
        let mut tables = self.lock_tables();
        if let Some(row) = tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r).as_deref() == Some(id)))
        {
            merge_fields(row, &fields);
        }
        Ok(())
    }

    async fn delete(&self, table: Table, id: &str) -> Result<(), StoreError> {
        self.record(StoreCall::Delete(table, id.to_string()));
        self.check_write(table)?;
        if let Some(rows) = self.lock_tables().get_mut(&table) {
            rows.retain(|r| row_id(r).as_deref() != Some(id));
        }
        Ok(())
    }
}
