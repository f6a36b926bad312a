//! Configuration for presage
//!
//! Everything the assistant, tools, and index need at startup lives in one
//! explicit `Config` loaded from `~/.presage/config.json` and passed into
//! constructors. No component reads credentials from the environment or from
//! module globals.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod paths;

pub use paths::{
    cache_dir, config_path, data_dir, documents_dir, index_dir, portal_session_path, sessions_dir,
};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config not found: {0}")]
    NotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// A single LLM provider endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

/// LLM provider endpoints, tried in order
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,
    #[serde(default)]
    pub openrouter: ProviderConfig,
}

/// Assistant defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum planner/tool cycles per user turn
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
    #[serde(default = "default_history_max_messages")]
    pub history_max_messages: usize,
    /// When true, the docs tool asks for the firmware version instead of
    /// assuming the latest one
    #[serde(default)]
    pub require_version: bool,
    /// Restate final answers in this language ("" disables, "auto" detects
    /// the user's language)
    #[serde(default)]
    pub reply_language: String,
    /// Restate final answers using up to this many words (0 disables)
    #[serde(default)]
    pub reply_max_words: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_steps: default_max_steps(),
            history_max_messages: default_history_max_messages(),
            require_version: false,
            reply_language: String::new(),
            reply_max_words: 0,
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_steps() -> u32 {
    8
}

fn default_history_max_messages() -> usize {
    20
}

/// Vendor documentation site settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    #[serde(default = "default_docs_site")]
    pub site_base: String,
    /// Latest known firmware per product, used when the caller does not pin
    /// a version and `require_version` is off
    #[serde(default = "default_latest_firmware")]
    pub latest_firmware: HashMap<String, String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            site_base: default_docs_site(),
            latest_firmware: default_latest_firmware(),
        }
    }
}

fn default_docs_site() -> String {
    "https://docs.fortinet.com".to_string()
}

fn default_latest_firmware() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("fortigate".to_string(), "7.2.4".to_string());
    map
}

/// Knowledge-portal (Q&A library and ticket search) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_portal_base")]
    pub base_url: String,
    #[serde(default)]
    pub company_id: String,
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_portal_base(),
            company_id: String::new(),
            search_limit: default_search_limit(),
        }
    }
}

fn default_portal_base() -> String {
    "https://app.rfpio.com".to_string()
}

fn default_search_limit() -> u32 {
    3
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub docs: DocsConfig,
    #[serde(default)]
    pub portal: PortalConfig,
}

impl Config {
    /// Load configuration from the default location
    pub async fn load() -> Result<Self> {
        let path = config_path();
        Self::load_from(&path).await
    }

    /// Load from a specific location
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        debug!("loading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub async fn save(&self) -> Result<()> {
        let path = config_path();
        self.save_to(&path).await
    }

    /// Save to a specific location
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("saving config to {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// First configured API key, openai before openrouter
    pub fn api_key(&self) -> Option<String> {
        let key = self.providers.openai.api_key.clone();
        if !key.is_empty() {
            return Some(key);
        }

        let key = self.providers.openrouter.api_key.clone();
        if !key.is_empty() {
            return Some(key);
        }

        None
    }

    /// API base matching the configured key
    pub fn api_base(&self) -> Option<String> {
        if !self.providers.openai.api_key.is_empty() {
            return self.providers.openai.api_base.clone();
        }

        if !self.providers.openrouter.api_key.is_empty() {
            return self
                .providers
                .openrouter
                .api_base
                .clone()
                .or_else(|| Some("https://openrouter.ai/api/v1".to_string()));
        }

        None
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn default_model(&self) -> String {
        self.assistant.model.clone()
    }

    /// Latest known firmware version for a product, if any
    pub fn latest_firmware(&self, product: &str) -> Option<String> {
        self.docs.latest_firmware.get(&product.to_lowercase()).cloned()
    }
}

/// Initialize the data directory and a default config file
pub async fn init() -> Result<Config> {
    let config_path = config_path();

    if config_path.exists() {
        warn!("config already exists at {:?}", config_path);
    } else {
        let config = Config::default();
        config.save().await?;
        info!("wrote default config to {:?}", config_path);
    }

    for dir in [cache_dir(), documents_dir(), index_dir(), sessions_dir()] {
        tokio::fs::create_dir_all(&dir).await?;
    }

    Config::load().await
}
