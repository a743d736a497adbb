//! Configuration loading and management

use super::schema::Config;
use super::validate::validate_config;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader with the default config directory
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .map(|h| h.join(".nova"))
            .unwrap_or_else(|| PathBuf::from(".nova"));

        Self { config_dir }
    }

    /// Create a new config loader with a custom config directory
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Load configuration from file and environment
    pub fn load(&self) -> crate::Result<Config> {
        let config_path = self.config_path();
        let mut merged = serde_json::to_value(Config::default())?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let file_value: Value = serde_json::from_str(&content)?;
            merge_values(&mut merged, file_value);
        }

        apply_alias_overrides(&mut merged);
        apply_path_overrides(&mut merged);

        let config: Config = serde_json::from_value(merged)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> crate::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(self.config_path(), content)?;
        Ok(())
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the JSON config file
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                if let Some(existing) = base_map.get_mut(&key) {
                    merge_values(existing, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

/// Set one dotted setting from an environment value.
///
/// Settings that hold strings (or are not in the defaults, such as
/// `logging.overrides` entries) take the raw text; others parse it as JSON.
fn apply_override(config: &mut Value, path: &[&str], raw: &str) {
    let value = match config.pointer(&format!("/{}", path.join("/"))) {
        Some(Value::String(_)) | None => Value::String(raw.to_string()),
        Some(_) => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
    };
    let overlay = path.iter().rev().fold(value, |inner, key| {
        let mut map = Map::new();
        map.insert((*key).to_string(), inner);
        Value::Object(map)
    });
    merge_values(config, overlay);
}

fn apply_alias_overrides(config: &mut Value) {
    // Later entries win when several are set.
    const ALIASES: [(&str, &[&str]); 4] = [
        ("OPENAI_API_KEY", &["agent", "api_key"]),
        ("GEMINI_API_KEY", &["agent", "api_key"]),
        ("GOOGLE_API_KEY", &["agent", "api_key"]),
        ("NOVA_HISTORY_DIR", &["memory", "history_dir"]),
    ];

    for (env_key, path) in ALIASES {
        match std::env::var(env_key) {
            Ok(value) if !value.trim().is_empty() => apply_override(config, path, &value),
            _ => {}
        }
    }
}

/// `NOVA__AGENT__MODEL=x` sets `agent.model`
fn apply_path_overrides(config: &mut Value) {
    const PREFIX: &str = "NOVA__";
    for (key, value) in std::env::vars() {
        let Some(suffix) = key.strip_prefix(PREFIX) else {
            continue;
        };
        let segments: Vec<String> = suffix
            .split("__")
            .filter(|s| !s.is_empty())
            .map(|s| s.to_ascii_lowercase())
            .collect();
        if segments.is_empty() {
            continue;
        }
        let path: Vec<&str> = segments.iter().map(String::as_str).collect();
        apply_override(config, &path, &value);
    }
}
