//! `flowboard init`: create the project's `.flowboard/` directory.
//!
//! ```text
//! .flowboard/
//! ├── flowboard.toml            # Configuration (defaults)
//! └── flowassist-storage.json   # Snapshot of the side collections (seeded)
//! ```
//!
//! Existing files are never overwritten.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::collections::AppState;
use crate::config::{CONFIG_DIR, CONFIG_FILE, FlowToml, SNAPSHOT_NAME};
use crate::persistence::{Snapshot, SnapshotStore};

/// Result of initializing a project.
#[derive(Debug)]
pub struct InitResult {
    pub config_dir: PathBuf,
    /// False if `.flowboard/` already existed
    pub created: bool,
}

pub fn init_project(project_dir: &Path) -> Result<InitResult> {
    let config_dir = get_config_dir(project_dir);
    let created = !config_dir.exists();

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create directory: {}", config_dir.display()))?;

    let config_file = config_dir.join(CONFIG_FILE);
    if !config_file.exists() {
        FlowToml::default().save(&config_file)?;
    }

    let snapshots = SnapshotStore::new(config_dir.join(format!("{SNAPSHOT_NAME}.json")));
    if !snapshots.path().exists() {
        snapshots
            .save(&Snapshot::from_state(&AppState::seeded()))
            .context("Failed to write the initial snapshot")?;
    }

    Ok(InitResult {
        config_dir,
        created,
    })
}

pub fn is_initialized(project_dir: &Path) -> bool {
    get_config_dir(project_dir).exists()
}

pub fn get_config_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_DIR)
}
