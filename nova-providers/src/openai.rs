//! OpenAI-compatible chat completion client

use async_trait::async_trait;
use nova_core::config::AgentConfig;
use nova_core::memory::Turn;
use nova_core::{Agent, AgentReply, Subject};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::base::{Message, ProviderError, ProviderResult};

/// Chat completion request format
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

/// Chat completion response format
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

const ELI5_INSTRUCTIONS: &str = "ELI5 MODE ACTIVE: Explain EVERYTHING as if talking to a \
5-year-old child.
- Use only simple, everyday words
- Use fun comparisons like \"it's like when you...\"
- Keep sentences very short
- Use lots of friendly emojis
- Make it fun and exciting!";

/// Agent backed by any OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiCompatClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
    retry_delay: Duration,
    bot_name: String,
    subject: &'static Subject,
    eli5: bool,
}

impl OpenAiCompatClient {
    /// Create a client from the agent section of the config
    pub fn new(config: &AgentConfig) -> Self {
        let api_key = Some(config.api_key.trim().to_string()).filter(|key| !key.is_empty());

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
            bot_name: config.bot_name.clone(),
            subject: Subject::find_or_default(&config.subject),
            eli5: config.eli5,
        }
    }

    pub fn subject(&self) -> &'static Subject {
        self.subject
    }

    /// Switch the subject focus. Unknown keys leave it unchanged and
    /// return `None`.
    pub fn set_subject(&mut self, key: &str) -> Option<&'static Subject> {
        let subject = Subject::find(key)?;
        debug!("Subject focus set to {}", subject.key);
        self.subject = subject;
        Some(subject)
    }

    pub fn eli5(&self) -> bool {
        self.eli5
    }

    pub fn set_eli5(&mut self, enabled: bool) {
        self.eli5 = enabled;
    }

    fn system_prompt(&self) -> String {
        let mut prompt = format!(
            "You are {}, a friendly and knowledgeable educational AI assistant. \
             Respond helpfully and naturally. If the user asks a follow-up question, \
             refer to the person or topic from the previous conversation.\n\n\
             Subject focus: {} {}",
            self.bot_name, self.subject.name, self.subject.icon
        );
        if self.eli5 {
            prompt.push_str("\n\n");
            prompt.push_str(ELI5_INSTRUCTIONS);
        }
        prompt
    }

    fn build_messages(&self, context: &[Turn], input: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(context.len() + 2);
        messages.push(Message::system(self.system_prompt()));
        messages.extend(context.iter().map(Message::from));
        messages.push(Message::user(input));
        messages
    }

    /// Send a chat completion request, retrying when rate limited
    pub async fn chat(&self, messages: Vec<Message>) -> ProviderResult<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        let url = format!("{}/chat/completions", self.api_base);

        for attempt in 1..=self.max_retries {
            debug!(
                "Sending chat request to {} with model {} (attempt {})",
                self.api_base, self.model, attempt
            );

            let mut req_builder = self.client.post(&url).json(&request);
            if let Some(api_key) = &self.api_key {
                req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
            }

            let response = req_builder.send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!("Rate limited by {} (attempt {})", self.api_base, attempt);
                if attempt < self.max_retries {
                    tokio::time::sleep(self.retry_delay * attempt).await;
                }
                continue;
            }

            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(ProviderError::ApiError(format!(
                    "HTTP {}: {}",
                    status, error_text
                )));
            }

            let response_data: ChatCompletionResponse = response.json().await?;
            return parse_response(response_data);
        }

        Err(ProviderError::RateLimited {
            attempts: self.max_retries,
            retry_after_secs: self.retry_delay.as_secs(),
        })
    }
}

fn parse_response(response: ChatCompletionResponse) -> ProviderResult<String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?;

    choice
        .message
        .content
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| ProviderError::InvalidResponse("Empty message content".to_string()))
}

#[async_trait]
impl Agent for OpenAiCompatClient {
    async fn respond(&self, context: &[Turn], input: &str) -> nova_core::Result<AgentReply> {
        let messages = self.build_messages(context, input);
        let text = self.chat(messages).await?;
        Ok(AgentReply::new(text))
    }

    fn name(&self) -> &str {
        &self.bot_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn config(api_base: String) -> AgentConfig {
        AgentConfig {
            api_base,
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            retry_delay_secs: 0,
            ..AgentConfig::default()
        }
    }

    #[test]
    fn test_build_messages_order() {
        let client = OpenAiCompatClient::new(&config("http://localhost".to_string()));
        let context = vec![Turn::user("Who was Ada Lovelace?"), Turn::assistant("A mathematician.")];

        let messages = client.build_messages(&context, "What did she write?");
        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert!(messages[0].content.contains("Nova"));
        assert_eq!(messages[3].content, "What did she write?");
    }

    #[test]
    fn test_system_prompt_follows_modes() {
        let mut client = OpenAiCompatClient::new(&AgentConfig {
            subject: "history".to_string(),
            ..config("http://localhost".to_string())
        });
        let prompt = client.system_prompt();
        assert!(prompt.contains("Subject focus: History 📜"));
        assert!(!prompt.contains("ELI5"));

        assert!(client.set_subject("astrology").is_none());
        assert_eq!(client.subject().key, "history");
        assert_eq!(client.set_subject("MATH").map(|s| s.name), Some("Mathematics"));
        client.set_eli5(true);

        let prompt = client.system_prompt();
        assert!(prompt.contains("Subject focus: Mathematics 🧮"));
        assert!(prompt.contains("ELI5 MODE ACTIVE"));
        assert!(prompt.contains("5-year-old"));
    }

    #[tokio::test]
    async fn test_eli5_reaches_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex("ELI5 MODE ACTIVE".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"Plants eat sunshine! 🌱"}}]}"#)
            .create_async()
            .await;

        let client = OpenAiCompatClient::new(&AgentConfig {
            eli5: true,
            ..config(server.url())
        });
        let reply = client.respond(&[], "What is photosynthesis?").await.unwrap();

        assert_eq!(reply.text, "Plants eat sunshine! 🌱");
        mock.assert_async().await;
    }

    #[test]
    fn test_parse_response_rejects_empty() {
        let response: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            parse_response(response),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_respond_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({"model": "test-model"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Sam Altman."}}]}"#)
            .create_async()
            .await;

        let client = OpenAiCompatClient::new(&config(server.url()));
        let reply = client
            .respond(&[], "Who is the CEO of OpenAI?")
            .await
            .unwrap();

        assert_eq!(reply.text, "Sam Altman.");
        assert_eq!(reply.source, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_retries_then_fails() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("quota exceeded")
            .expect(2)
            .create_async()
            .await;

        let client = OpenAiCompatClient::new(&config(server.url()));
        let err = client.chat(vec![Message::user("hi")]).await.unwrap_err();

        assert!(matches!(err, ProviderError::RateLimited { attempts: 2, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("boom")
            .expect(1)
            .create_async()
            .await;

        let client = OpenAiCompatClient::new(&config(server.url()));
        let err = client.respond(&[], "hi").await.unwrap_err();

        assert!(matches!(err, nova_core::Error::Agent(msg) if msg.contains("HTTP 500")));
        mock.assert_async().await;
    }
}
