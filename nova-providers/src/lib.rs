//! LLM provider integrations for nova
//!
//! Implements the agent collaborator of `nova-core` on top of an
//! OpenAI-compatible chat completion API.

pub mod base;
pub mod openai;

pub use base::{Message, ProviderError, ProviderResult};
pub use openai::OpenAiCompatClient;
