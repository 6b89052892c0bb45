use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use super::lanes::{BoardStats, Lane, SourceFilter, board_stats, build_lanes};
use super::models::{Item, ItemPatch, ItemStatus, NewItem};
use super::sync::{PendingWrite, RemoteWrite, SyncPolicy, Undo};
use super::zones::resolve_zone;
use crate::errors::BoardError;
use crate::store::{RowStore, Table, row_id};

const ORDER_COLUMN: &str = "published_at";

#[derive(Debug, Default)]
struct BoardState {
    items: Vec<Item>,
    active_drag: Option<String>,
}

/// Owns the board's item collection and keeps the row store in step with it.
///
/// Every mutation is applied locally before it returns; the matching remote
/// write runs on a spawned task, so mutations must be called from within a
/// tokio runtime.
#[derive(Clone)]
pub struct BoardManager {
    store: Arc<dyn RowStore>,
    policy: SyncPolicy,
    state: Arc<Mutex<BoardState>>,
}

impl BoardManager {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self::with_policy(store, SyncPolicy::default())
    }

    pub fn with_policy(store: Arc<dyn RowStore>, policy: SyncPolicy) -> Self {
        Self {
            store,
            policy,
            state: Arc::new(Mutex::new(BoardState::default())),
        }
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    // Board state is plain data, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the collection with the store's rows, newest first.
    ///
    /// On failure the previously loaded collection is left as it was. Rows
    /// that cannot be read as items are skipped with a warning.
    pub async fn load(&self) -> Result<usize, BoardError> {
        let rows = self
            .store
            .select_ordered(Table::NewsItems, ORDER_COLUMN, true)
            .await?;
        let items: Vec<Item> = rows
            .into_iter()
            .filter_map(|row| {
                let id = row_id(&row);
                serde_json::from_value::<Item>(row)
                    .inspect_err(|e| warn!(id = ?id, error = %e, "skipping unreadable board row"))
                    .ok()
            })
            .collect();
        let count = items.len();
        self.lock().items = items;
        info!(count, "board loaded");
        Ok(count)
    }

    pub fn items(&self) -> Vec<Item> {
        self.lock().items.clone()
    }

    pub fn item(&self, id: &str) -> Option<Item> {
        self.lock().items.iter().find(|i| i.id == id).cloned()
    }

    pub fn lanes(&self, filter: SourceFilter, query: &str) -> Vec<Lane> {
        build_lanes(&self.lock().items, filter, query)
    }

    pub fn stats(&self) -> BoardStats {
        board_stats(&self.lock().items)
    }

    /// Move an item to the status its drop zone resolves to.
    ///
    /// Returns `None` (and touches nothing, locally or remotely) when the
    /// zone is unknown or the item is not on the board.
    pub fn move_item(&self, id: &str, zone: &str) -> Option<PendingWrite> {
        let Some(status) = resolve_zone(zone) else {
            debug!(id, zone, "ignoring drop on unknown zone");
            return None;
        };
        self.set_status(id, status)
    }

    fn set_status(&self, id: &str, status: ItemStatus) -> Option<PendingWrite> {
        let undo = {
            let mut state = self.lock();
            let item = state.items.iter_mut().find(|i| i.id == id)?;
            let previous = item.clone();
            item.status = status;
            Undo::Restore {
                applied: item.clone(),
                previous,
            }
        };
        info!(id, status = status.as_str(), "item moved");
        Some(self.persist(
            RemoteWrite::Update {
                id: id.to_string(),
                fields: serde_json::json!({ "status": status.as_str() }),
            },
            undo,
        ))
    }

    /// Merge `patch` into an item.
    pub fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<PendingWrite, BoardError> {
        let undo = {
            let mut state = self.lock();
            let item = state
                .items
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| BoardError::ItemNotFound { id: id.to_string() })?;
            let previous = item.clone();
            patch.apply(item);
            Undo::Restore {
                applied: item.clone(),
                previous,
            }
        };
        info!(id, "item updated");
        Ok(self.persist(
            RemoteWrite::Update {
                id: id.to_string(),
                fields: patch.to_row(),
            },
            undo,
        ))
    }

    /// Add a record with a fresh UUID at the top of the board.
    pub fn add_item(&self, new: NewItem) -> (Item, PendingWrite) {
        let item = new.into_item(uuid::Uuid::new_v4().to_string());
        self.lock().items.insert(0, item.clone());
        info!(id = %item.id, title = %item.title, "item added");
        let row = serde_json::to_value(&item).unwrap_or_default();
        let write = self.persist(RemoteWrite::Insert(row), Undo::Remove { id: item.id.clone() });
        (item, write)
    }

    pub fn delete_item(&self, id: &str) -> Result<PendingWrite, BoardError> {
        let undo = {
            let mut state = self.lock();
            let index = state
                .items
                .iter()
                .position(|i| i.id == id)
                .ok_or_else(|| BoardError::ItemNotFound { id: id.to_string() })?;
            let item = state.items.remove(index);
            Undo::Reinsert { index, item }
        };
        info!(id, "item deleted");
        Ok(self.persist(RemoteWrite::Delete { id: id.to_string() }, undo))
    }

    /// Record the item being dragged. Returns it for overlay display.
    pub fn drag_start(&self, id: &str) -> Option<Item> {
        let mut state = self.lock();
        let item = state.items.iter().find(|i| i.id == id).cloned();
        state.active_drag = item.as_ref().map(|i| i.id.clone());
        item
    }

    pub fn active_drag(&self) -> Option<Item> {
        let state = self.lock();
        let id = state.active_drag.as_deref()?;
        state.items.iter().find(|i| i.id == id).cloned()
    }

    /// Finish a drag. A drop outside any zone only clears the active item.
    pub fn drag_end(&self, id: &str, zone: Option<&str>) -> Option<PendingWrite> {
        self.lock().active_drag = None;
        self.move_item(id, zone?)
    }

    fn persist(&self, write: RemoteWrite, undo: Undo) -> PendingWrite {
        let store = self.store.clone();
        let state = self.state.clone();
        let policy = self.policy;
        PendingWrite::new(tokio::spawn(async move {
            let verb = write.verb();
            let result = match write {
                RemoteWrite::Insert(row) => store.insert(Table::NewsItems, row).await,
                RemoteWrite::Update { id, fields } => {
                    store.update(Table::NewsItems, &id, fields).await
                }
                RemoteWrite::Delete { id } => store.delete(Table::NewsItems, &id).await,
            };
            if let Err(e) = &result {
                match policy {
                    SyncPolicy::FireAndForget => {
                        warn!(verb, error = %e, "remote write failed; keeping local change");
                    }
                    SyncPolicy::Rollback => {
                        warn!(verb, error = %e, "remote write failed; rolling back local change");
                        let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
                        apply_undo(&mut state.items, undo);
                    }
                }
            }
            result
        }))
    }
}

fn apply_undo(items: &mut Vec<Item>, undo: Undo) {
    match undo {
        Undo::Restore { applied, previous } => {
            if let Some(current) = items.iter_mut().find(|i| i.id == previous.id) {
                // A later edit wins over the rollback.
                if *current == applied {
                    *current = previous;
                }
            }
        }
        Undo::Remove { id } => items.retain(|i| i.id != id),
        Undo::Reinsert { index, item } => {
            if !items.iter().any(|i| i.id == item.id) {
                let index = index.min(items.len());
                items.insert(index, item);
            }
        }
    }
}
