//! Local durable snapshot of the side collections.
//!
//! The snapshot lives at `<config_dir>/flowassist-storage.json` and holds the
//! current workspace plus the persisted collections of both workspaces. Panel
//! state and chat history are never written.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::collections::collection::Collection;
use crate::collections::models::{
    IdeaNote, KnowledgeItem, Lead, OutreachTemplate, Signal, Source, TrackedChannel,
};
use crate::collections::state::{AppState, Workspace};
use crate::errors::SnapshotError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistSnapshot {
    pub knowledge_items: Collection<KnowledgeItem>,
    pub sources: Collection<Source>,
    pub ideas: Collection<IdeaNote>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarSnapshot {
    pub leads: Collection<Lead>,
    pub signals: Collection<Signal>,
    pub channels: Collection<TrackedChannel>,
    pub templates: Collection<OutreachTemplate>,
}

/// The persisted subset of [`AppState`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub current_workspace: Workspace,
    pub assist: AssistSnapshot,
    pub radar: RadarSnapshot,
}

impl Snapshot {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            current_workspace: state.workspace,
            assist: AssistSnapshot {
                knowledge_items: state.assist.knowledge_items.clone(),
                sources: state.assist.sources.clone(),
                ideas: state.assist.ideas.clone(),
            },
            radar: RadarSnapshot {
                leads: state.radar.leads.clone(),
                signals: state.radar.signals.clone(),
                channels: state.radar.channels.clone(),
                templates: state.radar.templates.clone(),
            },
        }
    }

    /// Rebuild a state. Panel state starts fresh and chat starts empty.
    pub fn into_state(self) -> AppState {
        let mut state = AppState {
            workspace: self.current_workspace,
            ..AppState::default()
        };
        state.assist.knowledge_items = self.assist.knowledge_items;
        state.assist.sources = self.assist.sources;
        state.assist.ideas = self.assist.ideas;
        state.radar.leads = self.radar.leads;
        state.radar.signals = self.radar.signals;
        state.radar.channels = self.radar.channels;
        state.radar.templates = self.radar.templates;
        state
    }
}

/// Reads and writes one snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no snapshot has been written yet.
    pub fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| SnapshotError::Io {
            path: self.path.clone(),
            source,
        })?;
        let snapshot = serde_json::from_str(&content).map_err(|source| SnapshotError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(snapshot))
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let io_err = |source| SnapshotError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(snapshot).map_err(|source| {
            SnapshotError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), "snapshot saved");
        Ok(())
    }
}

/// Owns the [`AppState`] and writes a snapshot after every mutation.
#[derive(Debug)]
pub struct StateContainer {
    state: AppState,
    snapshots: Option<SnapshotStore>,
}

impl StateContainer {
    /// Seeded state that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            state: AppState::seeded(),
            snapshots: None,
        }
    }

    /// Restore from `snapshots`, or start from the seed data if there is no
    /// snapshot yet.
    pub fn open(snapshots: SnapshotStore) -> Result<Self, SnapshotError> {
        let state = match snapshots.load()? {
            Some(snapshot) => {
                info!(path = %snapshots.path().display(), "restored snapshot");
                snapshot.into_state()
            }
            None => AppState::seeded(),
        };
        Ok(Self {
            state,
            snapshots: Some(snapshots),
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply `change` and persist the result. A failed write is logged and
    /// the in-memory change is kept.
    pub fn mutate<R>(&mut self, change: impl FnOnce(&mut AppState) -> R) -> R {
        let out = change(&mut self.state);
        if let Err(e) = self.flush() {
            warn!(error = %e, "failed to persist state");
        }
        out
    }

    pub fn flush(&self) -> Result<(), SnapshotError> {
        match &self.snapshots {
            Some(store) => store.save(&Snapshot::from_state(&self.state)),
            None => Ok(()),
        }
    }
}
