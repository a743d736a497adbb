//! Configuration validation rules.

use super::schema::Config;
use crate::agent::{Subject, SUBJECTS};

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.memory.history_dir.trim().is_empty() {
        errors.push("memory.history_dir must not be empty".to_string());
    }
    if config.memory.max_turns == 0 {
        errors.push("memory.max_turns must be > 0".to_string());
    }

    if config.agent.model.trim().is_empty() {
        errors.push("agent.model must not be empty".to_string());
    }
    if config.agent.max_tokens == 0 {
        errors.push("agent.max_tokens must be > 0".to_string());
    }
    if !(0.0..=2.0).contains(&config.agent.temperature) {
        errors.push("agent.temperature must be in [0.0, 2.0]".to_string());
    }
    if config.agent.max_retries == 0 {
        errors.push("agent.max_retries must be > 0".to_string());
    }
    if Subject::find(&config.agent.subject).is_none() {
        let keys: Vec<&str> = SUBJECTS.iter().map(|s| s.key).collect();
        errors.push(format!("agent.subject must be one of: {}", keys.join(", ")));
    }

    if !matches!(config.logging.format.to_lowercase().as_str(), "text" | "json") {
        errors.push("logging.format must be one of: text, json".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Config(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_errors_are_aggregated() {
        let mut config = Config::default();
        config.memory.max_turns = 0;
        config.agent.temperature = 3.0;

        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("memory.max_turns"));
        assert!(err.contains("agent.temperature"));
    }

    #[test]
    fn test_unknown_subject_is_rejected() {
        let mut config = Config::default();
        config.agent.subject = "Science".to_string();
        assert!(validate_config(&config).is_ok());

        config.agent.subject = "astrology".to_string();
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("agent.subject must be one of: general, math"));
    }
}
