use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record that lives in a [`Collection`].
pub trait Record: Clone {
    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Stamp derived fields when the record is added.
    fn on_insert(&mut self, _now: DateTime<Utc>) {}

    /// Refresh derived fields after an update.
    fn on_update(&mut self, _now: DateTime<Utc>) {}
}

pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// An ordered list of records with unique ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T> {
    records: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: Record> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records that already carry ids (seed data, remote rows).
    pub fn from_records(records: Vec<T>) -> Self {
        Self { records }
    }

    /// Assign a fresh id, stamp derived timestamps and append.
    pub fn add(&mut self, mut record: T) -> &T {
        record.set_id(generate_id());
        record.on_insert(Utc::now());
        self.records.push(record);
        let last = self.records.len() - 1;
        &self.records[last]
    }

    /// Append a record that already has an id.
    pub fn push(&mut self, record: T) {
        self.records.push(record);
    }

    /// Apply `change` to the record with `id`. Returns false if there is none.
    pub fn update(&mut self, id: &str, change: impl FnOnce(&mut T)) -> bool {
        match self.records.iter_mut().find(|r| r.id() == id) {
            Some(record) => {
                change(record);
                record.on_update(Utc::now());
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        self.records.len() != before
    }

    /// Flip a boolean field. Returns the new value.
    pub fn toggle(&mut self, id: &str, flag: impl FnOnce(&mut T) -> &mut bool) -> Option<bool> {
        let record = self.records.iter_mut().find(|r| r.id() == id)?;
        let value = flag(record);
        *value = !*value;
        Some(*value)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn replace_all(&mut self, records: Vec<T>) {
        self.records = records;
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
