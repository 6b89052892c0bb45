//! Side collections of the dashboard.
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | `collection` | `Collection<T>` with add/update/delete/toggle         |
//! | `models`     | Knowledge, source, idea, chat, lead, signal records   |
//! | `state`      | `AppState` and the cross-collection transitions       |
//! | `remote`     | Lead, source and knowledge sync from the row store    |
//! | `chat`       | Assistant chat through the text gateway               |

pub mod chat;
pub mod collection;
pub mod models;
pub mod remote;
pub mod state;

pub use collection::{Collection, Record, generate_id};
pub use remote::{LeadSync, fetch_knowledge, fetch_leads, fetch_sources, knowledge_from_news};
pub use state::{AppState, Workspace};
