//! Configuration for flowboard.
//!
//! Reads `.flowboard/flowboard.toml` and layers settings as file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [store]
//! backend = "rest"            # rest | sqlite | memory
//! url = "https://xyz.supabase.co"
//! sqlite_path = "board.db"    # relative to .flowboard/
//!
//! [gateway]
//! primary = "gemini"          # gemini | openai
//! gemini_model = "gemini-2.0-flash"
//! openai_model = "gpt-4o-mini"
//!
//! [agent]
//! think_delay_ms = 1500
//!
//! [board]
//! sync_policy = "fire_and_forget"   # fire_and_forget | rollback
//! ```
//!
//! Secrets never live in the file. They come from the environment (or a
//! `.env` file in the project directory):
//!
//! | Variable              | Setting                    |
//! |-----------------------|----------------------------|
//! | `FLOWBOARD_STORE_URL` | row store base URL         |
//! | `FLOWBOARD_STORE_KEY` | row store anon key         |
//! | `GEMINI_API_KEY`      | enables the Gemini adapter |
//! | `OPENAI_API_KEY`      | enables the OpenAI adapter |
//! | `FLOWBOARD_PROVIDER`  | overrides `gateway.primary`|

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::board::SyncPolicy;
use crate::gateway::{self, ProviderKind};
use crate::store::StoreBackend;

pub const CONFIG_DIR: &str = ".flowboard";
pub const CONFIG_FILE: &str = "flowboard.toml";
pub const SNAPSHOT_NAME: &str = "flowassist-storage";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Base URL of the hosted row store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,
}

fn default_sqlite_path() -> String {
    "board.db".to_string()
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: None,
            sqlite_path: default_sqlite_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySection {
    #[serde(default)]
    pub primary: ProviderKind,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Overrides the built-in system instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
}

fn default_gemini_model() -> String {
    gateway::gemini::DEFAULT_MODEL.to_string()
}

fn default_openai_model() -> String {
    gateway::openai::DEFAULT_MODEL.to_string()
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            primary: ProviderKind::default(),
            gemini_model: default_gemini_model(),
            openai_model: default_openai_model(),
            system_prompt: None,
            gemini_base_url: None,
            openai_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSection {
    /// Pause before each task's generative call
    #[serde(default = "default_think_delay_ms")]
    pub think_delay_ms: u64,
}

fn default_think_delay_ms() -> u64 {
    1500
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            think_delay_ms: default_think_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardSection {
    #[serde(default)]
    pub sync_policy: SyncPolicy,
}

/// The complete flowboard.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowToml {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub gateway: GatewaySection,
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub board: BoardSection,
}

impl FlowToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse flowboard.toml")
    }

    /// Load `.flowboard/flowboard.toml`, or defaults when it doesn't exist.
    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize flowboard.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Return warnings for settings that parse but won't work.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(url) = &self.store.url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            warnings.push(format!("store.url '{}' should start with http:// or https://", url));
        }
        if self.store.backend == StoreBackend::Sqlite && self.store.sqlite_path.trim().is_empty() {
            warnings.push("store.sqlite_path is empty".to_string());
        }
        if self.gateway.gemini_model.trim().is_empty() {
            warnings.push("gateway.gemini_model is empty".to_string());
        }
        if self.gateway.openai_model.trim().is_empty() {
            warnings.push("gateway.openai_model is empty".to_string());
        }
        if self.agent.think_delay_ms > 60_000 {
            warnings.push(format!(
                "agent.think_delay_ms = {} is over a minute per task",
                self.agent.think_delay_ms
            ));
        }

        warnings
    }
}

/// Values read from the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub store_url: Option<String>,
    pub store_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub provider: Option<ProviderKind>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            store_url: var("FLOWBOARD_STORE_URL"),
            store_key: var("FLOWBOARD_STORE_KEY"),
            gemini_api_key: var("GEMINI_API_KEY"),
            openai_api_key: var("OPENAI_API_KEY"),
            provider: var("FLOWBOARD_PROVIDER").and_then(|p| p.parse().ok()),
        }
    }
}

/// Effective configuration: file, then environment, then CLI.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub project_dir: PathBuf,
    pub config_dir: PathBuf,
    pub toml: FlowToml,
    pub env: EnvOverrides,
    /// CLI override for the store backend
    pub cli_backend: Option<StoreBackend>,
    pub verbose: bool,
}

impl FlowConfig {
    /// Load configuration for a project directory, reading `.env` first.
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let _ = dotenvy::from_path(project_dir.join(".env"));
        let config_dir = project_dir.join(CONFIG_DIR);
        let toml = FlowToml::load_or_default(&config_dir)?;
        Ok(Self::from_parts(project_dir, toml, EnvOverrides::from_env()))
    }

    pub fn with_cli_args(
        project_dir: PathBuf,
        verbose: bool,
        backend: Option<StoreBackend>,
    ) -> Result<Self> {
        let mut config = Self::new(project_dir)?;
        config.verbose = verbose;
        config.cli_backend = backend;
        Ok(config)
    }

    pub fn from_parts(project_dir: PathBuf, toml: FlowToml, env: EnvOverrides) -> Self {
        Self {
            config_dir: project_dir.join(CONFIG_DIR),
            project_dir,
            toml,
            env,
            cli_backend: None,
            verbose: false,
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Store backend (CLI → file).
    pub fn store_backend(&self) -> StoreBackend {
        self.cli_backend.unwrap_or(self.toml.store.backend)
    }

    /// Row store URL (env → file).
    pub fn store_url(&self) -> Option<String> {
        self.env.store_url.clone().or_else(|| self.toml.store.url.clone())
    }

    pub fn store_key(&self) -> Option<String> {
        self.env.store_key.clone()
    }

    pub fn sqlite_path(&self) -> PathBuf {
        self.config_dir.join(&self.toml.store.sqlite_path)
    }

    /// Local snapshot file for the collections.
    pub fn snapshot_path(&self) -> PathBuf {
        self.config_dir.join(format!("{SNAPSHOT_NAME}.json"))
    }

    /// Preferred provider (env → file → gemini).
    pub fn primary_provider(&self) -> ProviderKind {
        self.env.provider.unwrap_or(self.toml.gateway.primary)
    }

    pub fn gemini_api_key(&self) -> Option<String> {
        self.env.gemini_api_key.clone()
    }

    pub fn openai_api_key(&self) -> Option<String> {
        self.env.openai_api_key.clone()
    }

    pub fn gemini_model(&self) -> String {
        self.toml.gateway.gemini_model.clone()
    }

    pub fn openai_model(&self) -> String {
        self.toml.gateway.openai_model.clone()
    }

    pub fn gemini_base_url(&self) -> Option<String> {
        self.toml.gateway.gemini_base_url.clone()
    }

    pub fn openai_base_url(&self) -> Option<String> {
        self.toml.gateway.openai_base_url.clone()
    }

    pub fn system_prompt(&self) -> String {
        self.toml
            .gateway
            .system_prompt
            .clone()
            .unwrap_or_else(|| gateway::DEFAULT_SYSTEM_PROMPT.to_string())
    }

    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.toml.agent.think_delay_ms)
    }

    pub fn sync_policy(&self) -> SyncPolicy {
        self.toml.board.sync_policy
    }

    /// File warnings plus missing-secret warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.toml.validate();
        if self.store_backend() == StoreBackend::Rest && self.store_url().is_none() {
            warnings.push(
                "store backend is rest but no URL is set (FLOWBOARD_STORE_URL or store.url)"
                    .to_string(),
            );
        }
        if self.gemini_api_key().is_none() && self.openai_api_key().is_none() {
            warnings.push(
                "no AI provider key set (GEMINI_API_KEY or OPENAI_API_KEY); agent and chat will fail"
                    .to_string(),
            );
        }
        warnings
    }
}
