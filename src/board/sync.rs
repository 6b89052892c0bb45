//! Remote write strategy for optimistic board mutations.
//!
//! Local state always changes first. The remote write runs as a detached
//! tokio task; the policy decides what happens to local state when it fails.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;

use super::models::Item;
use crate::errors::StoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Log the failure and keep the optimistic local state.
    #[default]
    FireAndForget,
    /// Restore the pre-mutation record when the remote write fails.
    Rollback,
}

impl SyncPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FireAndForget => "fire_and_forget",
            Self::Rollback => "rollback",
        }
    }
}

impl fmt::Display for SyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fire_and_forget" => Ok(Self::FireAndForget),
            "rollback" => Ok(Self::Rollback),
            _ => Err(format!("Invalid sync policy: {}", s)),
        }
    }
}

/// The remote half of an optimistic mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteWrite {
    Insert(Value),
    Update { id: String, fields: Value },
    Delete { id: String },
}

impl RemoteWrite {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// How to undo a local mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Undo {
    /// Put `previous` back, but only while the record still equals `applied`.
    Restore { applied: Item, previous: Item },
    /// Drop an optimistically added record.
    Remove { id: String },
    /// Re-insert a deleted record at its old position.
    Reinsert { index: usize, item: Item },
}

/// Handle to a detached remote write.
///
/// Dropping it leaves the write running. Hosts that must observe the outcome
/// (the CLI, tests) await [`PendingWrite::wait`].
#[derive(Debug)]
pub struct PendingWrite {
    handle: JoinHandle<Result<(), StoreError>>,
}

impl PendingWrite {
    pub(crate) fn new(handle: JoinHandle<Result<(), StoreError>>) -> Self {
        Self { handle }
    }

    pub async fn wait(self) -> Result<(), StoreError> {
        self.handle
            .await
            .map_err(|e| StoreError::TaskJoin(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_round_trip_and_default() {
        assert_eq!(SyncPolicy::default(), SyncPolicy::FireAndForget);
        for policy in [SyncPolicy::FireAndForget, SyncPolicy::Rollback] {
            assert_eq!(policy.as_str().parse::<SyncPolicy>().unwrap(), policy);
        }
        assert!("optimistic".parse::<SyncPolicy>().is_err());
    }

    #[test]
    fn test_policy_toml_form() {
        #[derive(Deserialize)]
        struct Wrapper {
            sync_policy: SyncPolicy,
        }
        let w: Wrapper = toml::from_str(r#"sync_policy = "rollback""#).unwrap();
        assert_eq!(w.sync_policy, SyncPolicy::Rollback);
    }

    #[tokio::test]
    async fn test_pending_write_surfaces_task_result() {
        let ok = PendingWrite::new(tokio::spawn(async { Ok(()) }));
        assert!(ok.wait().await.is_ok());
        let failed = PendingWrite::new(tokio::spawn(async {
            Err(StoreError::Injected("nope".into()))
        }));
        assert!(matches!(failed.wait().await, Err(StoreError::Injected(_))));
    }
}
