//! Typed error hierarchy for flowboard.
//!
//! One enum per subsystem:
//! - `StoreError`: remote and local row store failures
//! - `BoardError`: board load and lookup failures
//! - `GatewayError`: generative-text provider failures
//! - `AgentError`: plan parsing and planning-call failures
//! - `SnapshotError`: local durable snapshot failures

use std::path::PathBuf;

use thiserror::Error;

/// Errors from a row store backend (REST, SQLite or in-memory).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Row store returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Row store request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to decode rows from table {table}: {source}")]
    Decode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),

    #[error("Row store lock poisoned")]
    LockPoisoned,

    #[error("Row store task failed: {0}")]
    TaskJoin(String),

    #[error("Injected failure: {0}")]
    Injected(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from the board state manager.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Failed to load board: {0}")]
    Load(#[from] StoreError),

    #[error("Item {id} not found")]
    ItemNotFound { id: String },
}

/// Errors from the generative-text gateway and its providers.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("{provider} is not configured (missing API key)")]
    NotConfigured { provider: String },

    #[error("{provider} API error: {message}")]
    Provider { provider: String, message: String },

    /// Every provider in the fallback chain failed (or none is configured).
    #[error("{message}")]
    Exhausted {
        message: String,
        failures: Vec<String>,
    },
}

/// Errors raised while turning a goal into a plan.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid plan generated: {0}")]
    PlanParse(String),

    #[error("Invalid plan generated: no tasks")]
    EmptyPlan,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Errors from the local snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to access snapshot at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
