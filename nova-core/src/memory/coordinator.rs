//! Keeps the session buffer and the conversation store consistent

use tracing::{debug, info, warn};

use super::buffer::SessionBuffer;
use super::store::ConversationStore;
use super::turn::{Conversation, ConversationSummary, Turn};
use crate::config::MemoryConfig;
use crate::{Error, Result};

/// Persistence status of the active conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Fresh conversation, nothing recorded yet
    Empty,
    /// Holds turns whose last save failed
    Unsaved,
    /// Matches the persisted record
    Persisted,
}

/// The active conversation of a UI process.
///
/// Owned by the caller and handed to [`MemoryCoordinator`] operations.
/// Starting a new chat or resuming a past one produces a new value.
#[derive(Debug, Clone)]
pub struct SessionState {
    conversation: Conversation,
    buffer: SessionBuffer,
    status: SessionStatus,
}

impl SessionState {
    /// Identifier of the active conversation
    pub fn id(&self) -> &str {
        &self.conversation.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Full conversation, including turns evicted from the buffer
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Bounded turn window used as agent context and for rendering
    pub fn buffer(&self) -> &SessionBuffer {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.conversation.is_empty()
    }
}

/// Mediates between the session buffer and the conversation store
#[derive(Debug, Clone)]
pub struct MemoryCoordinator {
    store: ConversationStore,
    max_turns: usize,
}

impl MemoryCoordinator {
    /// Create a coordinator keeping at most `max_turns` turns in context
    pub fn new(store: ConversationStore, max_turns: usize) -> Self {
        Self { store, max_turns }
    }

    /// Create a coordinator from the memory section of the config
    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(ConversationStore::new(&config.history_dir), config.max_turns)
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Begin an empty, unsaved conversation with a fresh identifier
    pub fn start_new(&self) -> SessionState {
        let conversation = Conversation::fresh();
        debug!("Starting conversation {}", conversation.id);
        SessionState {
            conversation,
            buffer: SessionBuffer::new(self.max_turns),
            status: SessionStatus::Empty,
        }
    }

    /// Full stored conversation for display.
    ///
    /// Unreadable records are logged and reported as [`Error::NotFound`].
    pub fn load(&self, id: &str) -> Result<Conversation> {
        match self.store.load(id) {
            Err(Error::CorruptRecord { path, reason }) => {
                warn!("Cannot read {} from {}: {}", id, path.display(), reason);
                Err(Error::NotFound(id.to_string()))
            }
            other => other,
        }
    }

    /// Load a past conversation; the buffer keeps its newest turns.
    ///
    /// Unreadable records are reported as [`Error::NotFound`].
    pub fn resume(&self, id: &str) -> Result<SessionState> {
        let conversation = self.load(id)?;

        let mut buffer = SessionBuffer::new(self.max_turns);
        buffer.replace_with(conversation.turns());
        info!(
            "Resumed conversation {} ({} turns, {} in context)",
            conversation.id,
            conversation.len(),
            buffer.len()
        );

        Ok(SessionState {
            conversation,
            buffer,
            status: SessionStatus::Persisted,
        })
    }

    /// Append a user/assistant pair and persist the conversation.
    ///
    /// The turns stay in memory even when the save fails; the returned
    /// [`Error::WriteFailure`] is meant to be shown as a warning.
    pub fn record_exchange(
        &self,
        state: &mut SessionState,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<()> {
        for turn in [Turn::user(user_text), Turn::assistant(assistant_text)] {
            state.buffer.append(turn.clone());
            state.conversation.push(turn);
        }

        match self.store.save(&state.conversation) {
            Ok(()) => {
                state.status = SessionStatus::Persisted;
                Ok(())
            }
            Err(e) => {
                warn!("Conversation {} kept in memory only: {}", state.id(), e);
                state.status = SessionStatus::Unsaved;
                Err(e)
            }
        }
    }

    /// Buffered turns, oldest first, for the agent collaborator
    pub fn context_for_agent(&self, state: &SessionState) -> Vec<Turn> {
        state.buffer.snapshot()
    }

    /// History list for navigation, most recent first
    pub fn list_history(&self) -> Vec<ConversationSummary> {
        self.store.list().collect()
    }

    /// Delete a stored conversation. Returns whether a record was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.store.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::turn::Role;
    use tempfile::TempDir;

    fn coordinator(dir: &TempDir, max_turns: usize) -> MemoryCoordinator {
        MemoryCoordinator::new(ConversationStore::new(dir.path()), max_turns)
    }

    #[test]
    fn test_start_new_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let memory = coordinator(&temp_dir, 10);

        let state = memory.start_new();
        assert_eq!(state.status(), SessionStatus::Empty);
        assert!(memory.context_for_agent(&state).is_empty());
        assert!(!memory.store().exists(state.id()));
        assert_ne!(memory.start_new().id(), state.id());
    }

    #[test]
    fn test_record_exchange_persists() {
        let temp_dir = TempDir::new().unwrap();
        let memory = coordinator(&temp_dir, 10);
        let mut state = memory.start_new();

        memory
            .record_exchange(&mut state, "Who is the CEO of OpenAI?", "Sam Altman...")
            .unwrap();

        assert_eq!(state.status(), SessionStatus::Persisted);
        let context = memory.context_for_agent(&state);
        assert_eq!(context.len(), 2);
        assert_eq!(context[0].role(), Role::User);
        assert_eq!(context[0].content(), "Who is the CEO of OpenAI?");
        assert_eq!(context[1].role(), Role::Assistant);
        assert_eq!(context[1].content(), "Sam Altman...");

        let stored = memory.store().load(state.id()).unwrap();
        assert_eq!(stored.turns(), state.conversation().turns());
    }

    #[test]
    fn test_write_failure_keeps_session_in_memory() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the history directory should be.
        let blocker = temp_dir.path().join("history");
        std::fs::write(&blocker, "not a directory").unwrap();
        let memory = MemoryCoordinator::new(ConversationStore::new(&blocker), 10);
        let mut state = memory.start_new();

        let err = memory
            .record_exchange(&mut state, "hello", "hi")
            .unwrap_err();

        assert!(matches!(err, Error::WriteFailure { .. }));
        assert!(!err.is_fatal());
        assert_eq!(state.status(), SessionStatus::Unsaved);
        assert_eq!(memory.context_for_agent(&state).len(), 2);
    }

    #[test]
    fn test_resume_keeps_newest_turns_in_context() {
        let temp_dir = TempDir::new().unwrap();
        let memory = coordinator(&temp_dir, 10);
        let mut state = memory.start_new();
        for i in 0..4 {
            memory
                .record_exchange(&mut state, &format!("q{}", i), &format!("a{}", i))
                .unwrap();
        }

        let narrow = coordinator(&temp_dir, 3);
        let resumed = narrow.resume(state.id()).unwrap();

        assert_eq!(resumed.status(), SessionStatus::Persisted);
        assert_eq!(resumed.conversation().len(), 8);
        let context: Vec<String> = narrow
            .context_for_agent(&resumed)
            .iter()
            .map(|t| t.content().to_string())
            .collect();
        assert_eq!(context, vec!["a2", "q3", "a3"]);
    }

    #[test]
    fn test_resume_missing_and_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let memory = coordinator(&temp_dir, 10);
        std::fs::write(temp_dir.path().join("broken.jsonl"), "oops").unwrap();

        assert!(matches!(memory.resume("absent"), Err(Error::NotFound(_))));
        assert!(matches!(memory.resume("broken"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_load_hides_corrupt_record() {
        let temp_dir = TempDir::new().unwrap();
        let memory = coordinator(&temp_dir, 10);
        std::fs::write(temp_dir.path().join("broken.jsonl"), "{\"_type\":").unwrap();
        let mut state = memory.start_new();
        memory.record_exchange(&mut state, "q", "a").unwrap();

        assert!(matches!(memory.store().load("broken"), Err(Error::CorruptRecord { .. })));
        assert!(matches!(memory.load("broken"), Err(Error::NotFound(id)) if id == "broken"));
        assert_eq!(memory.load(state.id()).unwrap().len(), 2);
    }

    #[test]
    fn test_list_and_delete_history() {
        let temp_dir = TempDir::new().unwrap();
        let memory = coordinator(&temp_dir, 10);
        let mut state = memory.start_new();
        memory.record_exchange(&mut state, "q", "a").unwrap();

        let history = memory.list_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, state.id());

        assert!(memory.delete(state.id()).unwrap());
        assert!(!memory.delete(state.id()).unwrap());
        assert!(memory.list_history().is_empty());
    }
}
