//! Core types and traits for nova
//!
//! This crate owns the conversation memory of the bot: the bounded
//! in-process session buffer, the file-backed history store and the
//! coordinator keeping the two consistent. It also carries the shared
//! configuration, logging and error types used by the other nova crates.

pub mod agent;
pub mod config;
pub mod error;
pub mod logging;
pub mod memory;
pub mod utils;

pub use agent::{Agent, AgentReply, Subject};
pub use error::{Error, Result};
pub use memory::{
    Conversation, ConversationStore, ConversationSummary, MemoryCoordinator, Role, SessionBuffer,
    SessionState, SessionStatus, Turn,
};
