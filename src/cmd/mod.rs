//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module    | Commands handled     |
//! |-----------|----------------------|
//! | `project` | `Init`               |
//! | `config`  | `Config`             |
//! | `board`   | `Board`              |
//! | `agent`   | `Agent`              |
//! | `chat`    | `Chat`               |
//! | `radar`   | `Leads`, `Sources`   |

pub mod agent;
pub mod board;
pub mod chat;
pub mod config;
pub mod project;
pub mod radar;

pub use agent::cmd_agent;
pub use board::cmd_board;
pub use chat::cmd_chat;
pub use config::cmd_config;
pub use project::cmd_init;
pub use radar::{cmd_leads, cmd_sources};

use std::path::Path;

use anyhow::Result;
use flowboard::config::FlowConfig;
use flowboard::persistence::{SnapshotStore, StateContainer};

use super::Cli;

/// Effective configuration for this invocation (file → env → CLI flags).
pub(crate) fn load_config(project_dir: &Path, cli: &Cli) -> Result<FlowConfig> {
    FlowConfig::with_cli_args(project_dir.to_path_buf(), cli.verbose, cli.store)
}

/// The snapshot-backed collections of the project.
pub(crate) fn open_state(config: &FlowConfig) -> Result<StateContainer> {
    Ok(StateContainer::open(SnapshotStore::new(
        config.snapshot_path(),
    ))?)
}
