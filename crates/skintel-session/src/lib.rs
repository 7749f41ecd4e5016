//! Conversation session management for skintel
//!
//! This crate keeps the chat transcript shown to the user and the compact
//! exchange log sent to the backend, persists both through a pluggable
//! key-value store, and provides the turn-taking helpers chat surfaces use
//! to talk to the remote chat service.

pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod file_store;
pub mod manager;
pub mod store;
pub mod turn;

// Re-export commonly used types
pub use clock::{Clock, IdSource, SequentialIds, SteppingClock, SystemClock, UuidIds};
pub use config::SessionConfig;
pub use error::{PersistenceError, StoreError};
pub use file_store::FileStore;
pub use manager::{ConversationManager, Session};
pub use store::{KeyValueStore, MemoryStore};
pub use turn::{
    begin_turn, complete_turn, run_turn, ChatBackend, PendingTurn, TurnGate, TurnGuard,
    TurnOutcome,
};

pub use skintel_types::{ChatMessage, Exchange, Role, Sender};
