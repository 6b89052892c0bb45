//! Generative-text gateway.
//!
//! The rest of the crate only sees [`TextGenerator`]. [`Gateway`] implements
//! it over an ordered list of provider adapters: the first one that answers
//! wins, failures are logged and the next provider is tried.

pub mod gemini;
pub mod openai;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::FlowConfig;
use crate::errors::GatewayError;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are the FlowAssist assistant. You help the user \
summarize articles and technical material, translate text between English and Polish, \
explain AI and programming concepts and compare tools. Answer concisely and concretely, \
formatted as Markdown.";

pub const EXHAUSTED_MESSAGE: &str =
    "Could not get a response from any AI provider. Check the provider API keys.";

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError>;
}

/// One completion backend.
#[async_trait]
pub trait TextProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GatewayError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenAi,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [Self::Gemini, Self::OpenAi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }

    /// Preferred provider first, the rest in their fixed order.
    pub fn fallback_order(preferred: ProviderKind) -> Vec<ProviderKind> {
        std::iter::once(preferred)
            .chain(Self::ALL.into_iter().filter(|k| *k != preferred))
            .collect()
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            _ => Err(format!("Invalid provider: {} (expected gemini or openai)", s)),
        }
    }
}

pub struct Gateway {
    providers: Vec<Box<dyn TextProvider>>,
    system_prompt: String,
}

impl Gateway {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            providers: Vec::new(),
            system_prompt: system_prompt.into(),
        }
    }

    /// Providers with an API key, preferred one first.
    pub fn from_config(config: &FlowConfig) -> Self {
        let mut gateway = Self::new(config.system_prompt());
        for kind in ProviderKind::fallback_order(config.primary_provider()) {
            match kind {
                ProviderKind::Gemini => {
                    if let Some(key) = config.gemini_api_key() {
                        let mut provider = GeminiProvider::new(key, config.gemini_model());
                        if let Some(url) = config.gemini_base_url() {
                            provider = provider.with_base_url(url);
                        }
                        gateway.register_provider(Box::new(provider));
                    }
                }
                ProviderKind::OpenAi => {
                    if let Some(key) = config.openai_api_key() {
                        let mut provider = OpenAiProvider::new(key, config.openai_model());
                        if let Some(url) = config.openai_base_url() {
                            provider = provider.with_base_url(url);
                        }
                        gateway.register_provider(Box::new(provider));
                    }
                }
            }
        }
        gateway
    }

    pub fn register_provider(&mut self, provider: Box<dyn TextProvider>) {
        info!("Registered text provider: {}", provider.name());
        self.providers.push(provider);
    }

    pub fn available_providers(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

#[async_trait]
impl TextGenerator for Gateway {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        let mut failures = Vec::new();
        for provider in &self.providers {
            debug!(provider = provider.name(), "requesting completion");
            match provider.complete(&self.system_prompt, prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "provider failed, trying next");
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }
        if self.providers.is_empty() {
            warn!("no text provider configured");
        }
        Err(GatewayError::Exhausted {
            message: EXHAUSTED_MESSAGE.to_string(),
            failures,
        })
    }
}
