//! Seam to the agent-execution collaborator
//!
//! The agent consumes the buffered context plus the new user text and
//! produces the assistant reply. Its reasoning and tool use live outside
//! this crate.

use async_trait::async_trait;

use crate::memory::Turn;
use crate::Result;

/// Reply produced by an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    /// Assistant text
    pub text: String,
    /// Optional reference to the source the answer came from
    pub source: Option<String>,
}

impl AgentReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Subject area the assistant focuses its answers on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    /// Key used in config and the `/subject` command
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

/// Key of the subject used when none is configured
pub const DEFAULT_SUBJECT: &str = "general";

/// Known subjects, default first
pub const SUBJECTS: &[Subject] = &[
    Subject { key: "general", name: "General Knowledge", icon: "🌐" },
    Subject { key: "math", name: "Mathematics", icon: "🧮" },
    Subject { key: "science", name: "Science", icon: "🔬" },
    Subject { key: "history", name: "History", icon: "📜" },
    Subject { key: "literature", name: "Literature", icon: "📖" },
    Subject { key: "programming", name: "Programming", icon: "💻" },
    Subject { key: "geography", name: "Geography", icon: "🌍" },
    Subject { key: "art", name: "Art & Music", icon: "🎨" },
];

impl Subject {
    /// Look up a subject by key, ignoring case
    pub fn find(key: &str) -> Option<&'static Subject> {
        let key = key.trim();
        SUBJECTS.iter().find(|s| s.key.eq_ignore_ascii_case(key))
    }

    /// The configured subject, falling back to general knowledge
    pub fn find_or_default(key: &str) -> &'static Subject {
        Self::find(key).unwrap_or(&SUBJECTS[0])
    }
}

/// Produces assistant replies from prior context and a new user message
#[async_trait]
pub trait Agent: Send + Sync {
    /// Answer `input` given `context`, oldest turn first
    async fn respond(&self, context: &[Turn], input: &str) -> Result<AgentReply>;

    /// Name shown to the user
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ConversationStore, MemoryCoordinator};
    use tempfile::TempDir;

    /// Replies with the number of turns it was given
    struct CountingAgent;

    #[async_trait]
    impl Agent for CountingAgent {
        async fn respond(&self, context: &[Turn], input: &str) -> Result<AgentReply> {
            Ok(AgentReply::new(format!("{} turns before '{}'", context.len(), input))
                .with_source("test"))
        }

        fn name(&self) -> &str {
            "counter"
        }
    }

    #[test]
    fn test_subject_lookup() {
        assert_eq!(Subject::find("Math").unwrap().name, "Mathematics");
        assert_eq!(Subject::find(" art ").unwrap().icon, "🎨");
        assert!(Subject::find("astrology").is_none());
        assert_eq!(Subject::find_or_default("astrology").key, DEFAULT_SUBJECT);
    }

    #[tokio::test]
    async fn test_agent_receives_buffered_context() {
        let temp_dir = TempDir::new().unwrap();
        let memory = MemoryCoordinator::new(ConversationStore::new(temp_dir.path()), 2);
        let agent = CountingAgent;
        let mut state = memory.start_new();

        for input in ["first", "second"] {
            let context = memory.context_for_agent(&state);
            let reply = agent.respond(&context, input).await.unwrap();
            memory
                .record_exchange(&mut state, input, &reply.text)
                .unwrap();
        }

        let context = memory.context_for_agent(&state);
        assert_eq!(context[1].content(), "2 turns before 'second'");
        assert_eq!(agent.name(), "counter");
    }
}
