//! Configuration loading, validation, and management for leetdigest.
//!
//! Loads configuration from `~/.leetdigest/config.toml` with environment
//! variable overrides. Validates all settings once at startup; the digest
//! pipeline never re-validates.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Article source names accepted in `articles.sources`.
pub const KNOWN_ARTICLE_SOURCES: &[&str] = &["medium", "devto", "gemini"];

/// Upper bound for `request_timeout_secs` and `run_timeout_secs` (one day).
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// The root configuration structure.
///
/// Maps directly to `~/.leetdigest/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Cron expression for daemon mode (5-field, UTC)
    #[serde(default = "default_schedule")]
    pub schedule: String,

    /// Digest sizing and deadlines
    #[serde(default)]
    pub digest: DigestConfig,

    /// Article source chain
    #[serde(default)]
    pub articles: ArticlesConfig,

    /// Gemini narrative backend and suggestions
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Discord webhook delivery
    #[serde(default)]
    pub discord: DiscordConfig,
}

fn default_schedule() -> String {
    "0 9 * * *".into()
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Supplementary problems per digest
    #[serde(default = "default_random_problem_count")]
    pub random_problem_count: u32,

    /// Articles per digest
    #[serde(default = "default_article_count")]
    pub article_count: u32,

    /// Deadline for each network-bound call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Deadline for a whole scheduled run
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
}

fn default_random_problem_count() -> u32 {
    2
}
fn default_article_count() -> u32 {
    2
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_run_timeout_secs() -> u64 {
    120
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            random_problem_count: default_random_problem_count(),
            article_count: default_article_count(),
            request_timeout_secs: default_request_timeout_secs(),
            run_timeout_secs: default_run_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticlesConfig {
    /// Sources tried in order until the article count is met
    #[serde(default = "default_article_sources")]
    pub sources: Vec<String>,
}

fn default_article_sources() -> Vec<String> {
    vec!["medium".into(), "devto".into()]
}

impl Default for ArticlesConfig {
    fn default() -> Self {
        Self {
            sources: default_article_sources(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key. Absent = no narrative, deterministic description instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Primary model
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Models tried, in order, when the primary is missing or rate limited
    #[serde(default = "default_fallback_models")]
    pub fallback_models: Vec<String>,

    /// Upper bound on suggested reading topics per request
    #[serde(default = "default_topic_limit")]
    pub topic_limit: u32,

    /// Enable Gemini as an article source (must also be listed in `articles.sources`)
    #[serde(default)]
    pub suggest_articles: bool,

    /// API base URL
    #[serde(default = "default_gemini_api_url")]
    pub api_url: String,
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_fallback_models() -> Vec<String> {
    vec!["gemini-2.0-flash".into()]
}
fn default_topic_limit() -> u32 {
    3
}
fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1".into()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            fallback_models: default_fallback_models(),
            topic_limit: default_topic_limit(),
            suggest_articles: false,
            api_url: default_gemini_api_url(),
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("fallback_models", &self.fallback_models)
            .field("topic_limit", &self.topic_limit)
            .field("suggest_articles", &self.suggest_articles)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl GeminiConfig {
    /// Primary model followed by fallbacks, without blanks or repeats.
    pub fn model_chain(&self) -> Vec<String> {
        let mut chain: Vec<String> = Vec::new();
        for model in std::iter::once(&self.model).chain(self.fallback_models.iter()) {
            let model = model.trim();
            if !model.is_empty() && !chain.iter().any(|m| m == model) {
                chain.push(model.to_string());
            }
        }
        chain
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Incoming webhook URL (contains a token)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Name shown in the embed author and footer
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
}

fn default_bot_name() -> String {
    "Daily Bot".into()
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            bot_name: default_bot_name(),
        }
    }
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("webhook_url", &redact(&self.webhook_url))
            .field("bot_name", &self.bot_name)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.leetdigest/config.toml).
    ///
    /// Environment variables override file values:
    /// `DISCORD_WEBHOOK_URL`, `SCHEDULE_CRON`, `RANDOM_PROBLEM_COUNT`,
    /// `ARTICLE_COUNT`, `REQUEST_TIMEOUT`, `GEMINI_API_KEY`, `GEMINI_MODEL`,
    /// `GEMINI_TOPIC_LIMIT`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(&Self::config_path(), |key| std::env::var(key).ok())
    }

    /// Load from `path`, then apply overrides from `lookup`.
    pub fn load_with(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::read(path)?;
        config.apply_env(lookup);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read(path)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply environment overrides. Unparseable values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DISCORD_WEBHOOK_URL") {
            self.discord.webhook_url = Some(url);
        }
        if let Some(cron) = get("SCHEDULE_CRON") {
            self.schedule = cron;
        }
        if let Some(n) = get("RANDOM_PROBLEM_COUNT").and_then(|v| v.trim().parse().ok()) {
            self.digest.random_problem_count = n;
        }
        if let Some(n) = get("ARTICLE_COUNT").and_then(|v| v.trim().parse().ok()) {
            self.digest.article_count = n;
        }
        if let Some(secs) = get("REQUEST_TIMEOUT").and_then(|v| parse_duration_secs(&v)) {
            self.digest.request_timeout_secs = secs;
        }
        if let Some(key) = get("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(n) = get("GEMINI_TOPIC_LIMIT").and_then(|v| v.trim().parse().ok()) {
            self.gemini.topic_limit = n;
        }
    }

    /// Reset out-of-range values to their defaults.
    fn normalize(&mut self) {
        if self.digest.request_timeout_secs == 0 {
            self.digest.request_timeout_secs = default_request_timeout_secs();
        }
        if self.digest.run_timeout_secs == 0 {
            self.digest.run_timeout_secs = default_run_timeout_secs();
        }
        if self.gemini.topic_limit == 0 {
            self.gemini.topic_limit = default_topic_limit();
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.schedule.split_whitespace().count() != 5 {
            return Err(ConfigError::ValidationError(format!(
                "schedule '{}' must have 5 fields (minute hour dom month dow)",
                self.schedule
            )));
        }

        if let Some(unknown) = self
            .articles
            .sources
            .iter()
            .find(|s| !KNOWN_ARTICLE_SOURCES.contains(&s.as_str()))
        {
            return Err(ConfigError::ValidationError(format!(
                "unknown article source '{unknown}' (expected one of: {})",
                KNOWN_ARTICLE_SOURCES.join(", ")
            )));
        }

        for (name, secs) in [
            ("digest.request_timeout_secs", self.digest.request_timeout_secs),
            ("digest.run_timeout_secs", self.digest.run_timeout_secs),
        ] {
            if secs > MAX_TIMEOUT_SECS {
                return Err(ConfigError::ValidationError(format!(
                    "{name} = {secs} exceeds the maximum of {MAX_TIMEOUT_SECS}s"
                )));
            }
        }

        if self.gemini.model_chain().is_empty() {
            return Err(ConfigError::ValidationError(
                "gemini.model must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".leetdigest")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.digest.request_timeout_secs)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.digest.run_timeout_secs)
    }

    /// Whether a narrative backend can be built.
    pub fn narrative_enabled(&self) -> bool {
        self.gemini
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schedule: default_schedule(),
            digest: DigestConfig::default(),
            articles: ArticlesConfig::default(),
            gemini: GeminiConfig::default(),
            discord: DiscordConfig::default(),
        }
    }
}

/// Parse `"30"`, `"30s"`, `"2m"` or `"1h"` into whole seconds.
pub fn parse_duration_secs(value: &str) -> Option<u64> {
    let value = value.trim();
    let (digits, multiplier) = match value.chars().last()? {
        's' => (&value[..value.len() - 1], 1),
        'm' => (&value[..value.len() - 1], 60),
        'h' => (&value[..value.len() - 1], 3600),
        _ => (value, 1),
    };
    digits.trim().parse::<u64>().ok()?.checked_mul(multiplier)
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required setting: {0}")]
    Missing(String),
}
