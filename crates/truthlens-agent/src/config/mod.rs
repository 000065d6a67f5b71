//! Configuration loading for TruthLens.
//! Reads truthlens.toml from the current directory or path in TRUTHLENS_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use truthlens_common::Language;
use truthlens_pipeline::{default_ttl, AnalyzerConfig};
use truthlens_ranker::ModuleWeights;

pub const CONFIG_ENV: &str = "TRUTHLENS_CONFIG";
pub const GEMINI_KEY_ENV: &str = "TRUTHLENS_GEMINI_API_KEY";
pub const BIND_ENV: &str = "TRUTHLENS_BIND";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `gemini` or `openai_compatible`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_thinking_budget")]
    pub thinking_budget: u32,
    #[serde(default = "default_min_call_interval_ms")]
    pub min_call_interval_ms: u64,
    /// Report language when a request does not specify one.
    #[serde(default)]
    pub language: Language,
}

fn default_provider()             -> String { "gemini".to_string() }
fn default_model()                -> String { "gemini-2.5-flash".to_string() }
fn default_max_output_tokens()    -> u32 { 12_000 }
fn default_thinking_budget()      -> u32 { 4_000 }
fn default_min_call_interval_ms() -> u64 { 30 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: String::new(),
            base_url: None,
            temperature: None,
            max_output_tokens: default_max_output_tokens(),
            thinking_budget: default_thinking_budget(),
            min_call_interval_ms: default_min_call_interval_ms(),
            language: Language::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
    /// JSON file the cache is mirrored to; in-memory only when unset.
    pub path: Option<PathBuf>,
}

fn default_ttl_hours() -> i64 { 24 }

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_hours: default_ttl_hours(), path: None }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: ModuleWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "127.0.0.1:3000".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Config {
    /// Load configuration from truthlens.toml.
    /// Checks TRUTHLENS_CONFIG env var first, then current directory.
    /// A missing file yields the defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "truthlens.toml".to_string());
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(
                "Config file not found: {}. Using defaults; copy truthlens.example.toml to truthlens.toml to customise.",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.scoring.weights.validate()?;
        if self.cache.ttl_hours <= 0 {
            anyhow::bail!("cache.ttl_hours must be positive, got {}", self.cache.ttl_hours);
        }
        if chrono::Duration::try_hours(self.cache.ttl_hours).is_none() {
            anyhow::bail!("cache.ttl_hours is too large, got {}", self.cache.ttl_hours);
        }
        Ok(())
    }

    /// Fill the API key and bind address from the environment.
    /// The key only applies when the file leaves it empty; the bind address always wins.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.llm.api_key.is_empty() {
            if let Some(key) = lookup(GEMINI_KEY_ENV).filter(|k| !k.is_empty()) {
                self.llm.api_key = key;
            }
        }
        if let Some(bind) = lookup(BIND_ENV).filter(|b| !b.is_empty()) {
            self.server.bind = bind;
        }
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            max_output_tokens: self.llm.max_output_tokens,
            thinking_budget: Some(self.llm.thinking_budget),
            temperature: self.llm.temperature,
            min_call_interval: Duration::from_millis(self.llm.min_call_interval_ms),
            weights: self.scoring.weights,
            ..AnalyzerConfig::default()
        }
    }

    /// Out-of-range values only reach here when validation was skipped.
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.cache.ttl_hours).unwrap_or_else(default_ttl)
    }
}

mod tests;
