//! Conversation memory
//!
//! Two tiers: a bounded [`SessionBuffer`] holding the context of the
//! active chat, and a [`ConversationStore`] keeping every conversation on
//! disk as a JSONL record. The [`MemoryCoordinator`] appends each
//! exchange to both and persists after every completed turn pair.

pub mod buffer;
pub mod coordinator;
pub mod store;
pub mod turn;

pub use buffer::SessionBuffer;
pub use coordinator::{MemoryCoordinator, SessionState, SessionStatus};
pub use store::ConversationStore;
pub use turn::{Conversation, ConversationSummary, Role, Turn, DEFAULT_TITLE};
