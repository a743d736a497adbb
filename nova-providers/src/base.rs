//! Shared provider types

use nova_core::memory::{Role, Turn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limit reached after {attempts} attempts; please wait {retry_after_secs} seconds and try again")]
    RateLimited { attempts: u32, retry_after_secs: u64 },
}

pub type ProviderResult<T> = Result<T, ProviderError>;

impl From<ProviderError> for nova_core::Error {
    fn from(e: ProviderError) -> Self {
        nova_core::Error::Agent(e.to_string())
    }
}

/// A message in the chat completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User.as_str().to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant.as_str().to_string(),
            content: content.into(),
        }
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role().as_str().to_string(),
            content: turn.content().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_turn() {
        let message = Message::from(&Turn::assistant("Paris."));
        assert_eq!(message, Message::assistant("Paris."));
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({"role": "assistant", "content": "Paris."})
        );
    }

    #[test]
    fn test_provider_error_into_core_error() {
        let err: nova_core::Error = ProviderError::RateLimited {
            attempts: 2,
            retry_after_secs: 5,
        }
        .into();
        assert!(matches!(err, nova_core::Error::Agent(_)));
        assert!(err.to_string().contains("wait 5 seconds"));
    }
}
