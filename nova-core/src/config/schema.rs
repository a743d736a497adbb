//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for nova
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Conversation memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Agent collaborator configuration
    #[serde(default)]
    pub agent: AgentConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Conversation memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Directory holding one record per conversation
    #[serde(default = "default_history_dir")]
    pub history_dir: String,
    /// Maximum number of turns kept in the session buffer
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

fn default_history_dir() -> String {
    "chat_history".to_string()
}

fn default_max_turns() -> usize {
    50
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            history_dir: default_history_dir(),
            max_turns: default_max_turns(),
        }
    }
}

/// Agent collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// API key sent as bearer token
    #[serde(default)]
    pub api_key: String,
    /// Model name
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum completion tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Attempts made when the API reports a rate limit
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base back-off between rate-limited attempts, in seconds
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Persona name used in the system prompt and the chat prompt
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    /// Subject focus, one of the keys in [`crate::agent::SUBJECTS`]
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Explain everything as if to a five-year-old
    #[serde(default)]
    pub eli5: bool,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_bot_name() -> String {
    "Nova".to_string()
}

fn default_subject() -> String {
    crate::agent::DEFAULT_SUBJECT.to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            bot_name: default_bot_name(),
            subject: default_subject(),
            eli5: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}
