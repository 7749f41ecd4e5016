//! Turn-taking with the remote chat service.
//!
//! A turn is split into two synchronous halves around the network call so
//! a chat surface never holds the manager across an await point:
//! [`begin_turn`] records the user message and snapshots the context,
//! [`complete_turn`] records the reply. Only a successful reply reaches the
//! exchange log.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use skintel_types::{ChatMessage, Exchange, Sender, ASSISTANT_UNAVAILABLE_MESSAGE};

use crate::manager::ConversationManager;
use crate::store::KeyValueStore;

/// Anything that can answer a chat message given the prior exchanges
#[async_trait(?Send)]
pub trait ChatBackend {
    type Error: Display;

    async fn reply(&self, message: &str, history: &[Exchange]) -> Result<String, Self::Error>;
}

/// A user message waiting for its reply
#[derive(Debug, Clone)]
pub struct PendingTurn {
    user_message: ChatMessage,
    context: Vec<Exchange>,
}

impl PendingTurn {
    pub fn user_message(&self) -> &ChatMessage {
        &self.user_message
    }

    pub fn content(&self) -> &str {
        self.user_message.content()
    }

    /// Exchange log as it was before this turn
    pub fn context(&self) -> &[Exchange] {
        &self.context
    }
}

#[derive(Debug, Clone)]
pub enum TurnOutcome {
    Answered(ChatMessage),
    Failed { message: ChatMessage, error: String },
}

impl TurnOutcome {
    /// The bot message that was added for this turn
    pub fn message(&self) -> &ChatMessage {
        match self {
            TurnOutcome::Answered(message) => message,
            TurnOutcome::Failed { message, .. } => message,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, TurnOutcome::Answered(_))
    }
}

/// Record the user's message. Blank input is ignored.
pub fn begin_turn<S: KeyValueStore>(
    manager: &mut ConversationManager<S>,
    content: &str,
) -> Option<PendingTurn> {
    if content.trim().is_empty() {
        return None;
    }

    let context = manager.conversation_history().to_vec();
    let user_message = manager.add_message(content, Sender::User);
    Some(PendingTurn {
        user_message,
        context,
    })
}

/// Record the outcome of the backend call for `pending`
pub fn complete_turn<S, E>(
    manager: &mut ConversationManager<S>,
    pending: PendingTurn,
    result: Result<String, E>,
) -> TurnOutcome
where
    S: KeyValueStore,
    E: Display,
{
    match result {
        Ok(reply) => {
            let message = manager.add_message(reply.as_str(), Sender::Bot);
            manager.update_conversation_history(pending.content(), reply);
            TurnOutcome::Answered(message)
        }
        Err(e) => {
            let error = e.to_string();
            warn!("Chat request failed: {}", error);
            let message = manager.add_message(ASSISTANT_UNAVAILABLE_MESSAGE, Sender::Bot);
            TurnOutcome::Failed { message, error }
        }
    }
}

/// Run a whole turn against `backend`
pub async fn run_turn<S, B>(
    manager: &mut ConversationManager<S>,
    backend: &B,
    content: &str,
) -> Option<TurnOutcome>
where
    S: KeyValueStore,
    B: ChatBackend + ?Sized,
{
    let pending = begin_turn(manager, content)?;
    let result = backend.reply(pending.content(), pending.context()).await;
    Some(complete_turn(manager, pending, result))
}

/// At most one outstanding request per chat surface.
///
/// The manager accepts overlapping turns; surfaces that want strict
/// one-at-a-time sending take a guard before [`begin_turn`] and keep it
/// until [`complete_turn`].
#[derive(Debug, Clone, Default)]
pub struct TurnGate {
    busy: Arc<AtomicBool>,
}

impl TurnGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another guard is alive
    pub fn try_acquire(&self) -> Option<TurnGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| TurnGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the gate on drop
#[derive(Debug)]
pub struct TurnGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
