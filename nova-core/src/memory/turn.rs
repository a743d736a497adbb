//! Conversation data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::utils::truncate_chars;

/// Title used when a conversation has neither an explicit title nor a user turn
pub const DEFAULT_TITLE: &str = "New Conversation";

/// Characters of the first user message kept in a derived title
const TITLE_MAX_CHARS: usize = 50;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message of a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a turn stamped with the current time
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// An ordered, append-only sequence of turns with an identifier
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    /// Conversation identifier, also the record key in the store
    pub id: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time, used to order the history list
    pub updated_at: DateTime<Utc>,
    title: Option<String>,
    turns: Vec<Turn>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            created_at: now,
            updated_at: now,
            title: None,
            turns: Vec::new(),
        }
    }

    /// Create an empty conversation with an identifier derived from the
    /// current time
    pub fn fresh() -> Self {
        Self::new(generate_id(Utc::now()))
    }

    /// Rebuild a conversation read back from storage
    pub(crate) fn restore(
        id: String,
        title: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        turns: Vec<Turn>,
    ) -> Self {
        Self {
            id,
            created_at,
            updated_at,
            title,
            turns,
        }
    }

    /// Set an explicit title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a turn and bump the modification time
    pub fn push(&mut self, turn: Turn) {
        self.updated_at = Utc::now().max(turn.timestamp());
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Display title.
    ///
    /// An explicit title wins, then the first user message truncated to
    /// 50 characters, then [`DEFAULT_TITLE`].
    pub fn title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        self.turns
            .iter()
            .find(|t| t.role() == Role::User)
            .map(|t| truncate_chars(t.content().trim(), TITLE_MAX_CHARS))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }

    /// Summary used by the history list
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            title: self.title(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            turn_count: self.turns.len(),
        }
    }
}

/// Generate a conversation identifier from its creation time
pub fn generate_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("chat-{}-{}", now.format("%Y%m%d-%H%M%S"), &suffix[..8])
}

/// Entry of the history list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub turn_count: usize,
}
