use log::{debug, warn};
use skintel_types::{ChatMessage, Exchange, Sender};

use crate::clock::{Clock, IdSource, SystemClock, UuidIds};
use crate::codec;
use crate::config::SessionConfig;
use crate::error::PersistenceError;
use crate::store::KeyValueStore;

/// The two parallel logs of one chat widget
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    messages: Vec<ChatMessage>,
    exchanges: Vec<Exchange>,
}

impl Session {
    /// Displayed messages, oldest first
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Conversation context for the backend, in (user, assistant) pairs
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }
}

/// Owns a [`Session`] and keeps it persisted in a [`KeyValueStore`].
///
/// Every mutation is written through to the store. Store failures are
/// logged and otherwise ignored: the in-memory session is authoritative
/// and none of the public operations can fail.
pub struct ConversationManager<S: KeyValueStore> {
    store: S,
    config: SessionConfig,
    clock: Box<dyn Clock + Send + Sync>,
    ids: Box<dyn IdSource + Send + Sync>,
    session: Session,
}

impl<S: KeyValueStore> ConversationManager<S> {
    /// Create a manager and restore whatever the store holds
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self::with_sources(store, config, Box::new(SystemClock), Box::new(UuidIds))
    }

    pub fn with_sources(
        store: S,
        config: SessionConfig,
        clock: Box<dyn Clock + Send + Sync>,
        ids: Box<dyn IdSource + Send + Sync>,
    ) -> Self {
        let mut manager = Self {
            store,
            config,
            clock,
            ids,
            session: Session::default(),
        };
        manager.initialize();
        manager
    }

    /// Reload the session from the store.
    ///
    /// Missing or malformed data yields a fresh session seeded with the
    /// welcome message. The result is written back so the store always
    /// reflects what is in memory.
    pub fn initialize(&mut self) -> &Session {
        self.session = match self.restore() {
            Ok(Some(session)) => {
                debug!(
                    "Restored chat session: {} messages, {} exchanges",
                    session.messages.len(),
                    session.exchanges.len()
                );
                session
            }
            Ok(None) => self.seeded(self.config.welcome_message.clone()),
            Err(e) => {
                warn!("Discarding persisted chat history: {}", e);
                self.seeded(self.config.welcome_message.clone())
            }
        };

        self.evict_messages();
        self.evict_exchanges();
        self.persist();
        &self.session
    }

    /// Append a message and return it
    pub fn add_message(&mut self, content: impl Into<String>, sender: Sender) -> ChatMessage {
        let message = self.new_message(content.into(), sender);
        self.session.messages.push(message.clone());
        self.evict_messages();
        self.persist_messages();
        message
    }

    /// Record a completed turn in the conversation context
    pub fn update_conversation_history(
        &mut self,
        user_content: impl Into<String>,
        assistant_content: impl Into<String>,
    ) {
        self.session.exchanges.push(Exchange::user(user_content));
        self.session.exchanges.push(Exchange::assistant(assistant_content));
        self.evict_exchanges();
        self.persist_conversation();
    }

    /// Start over with the "cleared" welcome message and no context
    pub fn clear_chat(&mut self) {
        self.session = self.seeded(self.config.cleared_message.clone());

        for key in [self.config.messages_key(), self.config.conversation_key()] {
            if let Err(source) = self.store.remove(&key) {
                warn!("{}", PersistenceError::Write { key, source });
            }
        }

        self.persist();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.session.messages()
    }

    pub fn conversation_history(&self) -> &[Exchange] {
        self.session.exchanges()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn new_message(&self, content: String, sender: Sender) -> ChatMessage {
        ChatMessage::new(self.ids.next_id(), content, sender, self.clock.now())
    }

    fn seeded(&self, text: String) -> Session {
        Session {
            messages: vec![self.new_message(text, Sender::Bot)],
            exchanges: Vec::new(),
        }
    }

    /// `Ok(None)` when there is nothing usable to restore
    fn restore(&self) -> Result<Option<Session>, PersistenceError> {
        let messages_key = self.config.messages_key();
        let raw_messages = match self.read(&messages_key)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let messages = codec::decode_messages(&messages_key, &raw_messages)?;
        if messages.is_empty() {
            return Ok(None);
        }

        let conversation_key = self.config.conversation_key();
        let exchanges = match self.read(&conversation_key)? {
            Some(raw) => codec::decode_exchanges(&conversation_key, &raw)?,
            None => Vec::new(),
        };

        Ok(Some(Session {
            messages,
            exchanges,
        }))
    }

    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.store.get(key).map_err(|source| PersistenceError::Read {
            key: key.to_string(),
            source,
        })
    }

    fn evict_messages(&mut self) {
        let max = self.config.max_messages.max(1);
        let len = self.session.messages.len();
        if len > max {
            self.session.messages.drain(..len - max);
            debug!("Evicted {} oldest messages", len - max);
        }
    }

    /// Drops whole pairs from the front so roles keep alternating
    fn evict_exchanges(&mut self) {
        let max = self.config.max_exchange_entries();
        let len = self.session.exchanges.len();
        if len > max {
            let excess = len - max;
            let excess = (excess + excess % 2).min(len);
            self.session.exchanges.drain(..excess);
            debug!("Evicted {} oldest exchange pairs", excess / 2);
        }
    }

    fn persist(&self) {
        self.persist_messages();
        self.persist_conversation();
    }

    fn persist_messages(&self) {
        let key = self.config.messages_key();
        match codec::encode_messages(&self.session.messages) {
            Ok(json) => self.write(key, &json),
            Err(e) => warn!("Failed to serialize chat messages: {}", e),
        }
    }

    fn persist_conversation(&self) {
        let key = self.config.conversation_key();
        match codec::encode_exchanges(&self.session.exchanges) {
            Ok(json) => self.write(key, &json),
            Err(e) => warn!("Failed to serialize conversation history: {}", e),
        }
    }

    fn write(&self, key: String, value: &str) {
        if let Err(source) = self.store.set(&key, value) {
            warn!("{}", PersistenceError::Write { key, source });
        }
    }
}
