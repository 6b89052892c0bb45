//! Optimistic kanban board over the `news_items` table.

pub mod lanes;
pub mod manager;
pub mod models;
pub mod sync;
pub mod zones;

pub use lanes::{BoardStats, Lane, SourceFilter};
pub use manager::BoardManager;
pub use models::{Item, ItemPatch, ItemStatus, NewItem, NewItemKind, SourcePlatform};
pub use sync::{PendingWrite, SyncPolicy};
