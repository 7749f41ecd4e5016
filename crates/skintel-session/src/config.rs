use skintel_types::{
    CONVERSATION_KEY_SUFFIX, DEFAULT_CLEARED_MESSAGE, DEFAULT_MAX_MESSAGES, DEFAULT_STORAGE_KEY,
    DEFAULT_WELCOME_MESSAGE, MESSAGES_KEY_SUFFIX,
};

/// Settings for a [`ConversationManager`](crate::ConversationManager)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Base name of the two persisted entries
    pub storage_key: String,
    /// Cap on displayed messages, never below 1
    pub max_messages: usize,
    /// Cap on the exchange log, counted in (user, assistant) pairs
    pub max_exchange_pairs: usize,
    pub welcome_message: String,
    pub cleared_message: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            max_messages: DEFAULT_MAX_MESSAGES,
            max_exchange_pairs: DEFAULT_MAX_MESSAGES / 2,
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            cleared_message: DEFAULT_CLEARED_MESSAGE.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the message cap. The exchange cap follows at half of it.
    pub fn with_max_messages(mut self, max: usize) -> Self {
        if max == 0 {
            log::warn!("max_messages of 0 is not allowed, using 1");
        }
        self.max_messages = max.max(1);
        self.max_exchange_pairs = self.max_messages / 2;
        self
    }

    pub fn with_max_exchange_pairs(mut self, pairs: usize) -> Self {
        self.max_exchange_pairs = pairs;
        self
    }

    pub fn with_welcome_message(mut self, text: impl Into<String>) -> Self {
        self.welcome_message = text.into();
        self
    }

    pub fn with_cleared_message(mut self, text: impl Into<String>) -> Self {
        self.cleared_message = text.into();
        self
    }

    pub fn messages_key(&self) -> String {
        format!("{}{}", self.storage_key, MESSAGES_KEY_SUFFIX)
    }

    pub fn conversation_key(&self) -> String {
        format!("{}{}", self.storage_key, CONVERSATION_KEY_SUFFIX)
    }

    /// Exchange cap in entries
    pub fn max_exchange_entries(&self) -> usize {
        self.max_exchange_pairs * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.max_messages, 50);
        assert_eq!(config.max_exchange_pairs, 25);
        assert_eq!(config.max_exchange_entries(), 50);
        assert_eq!(config.messages_key(), "skincare-chat-history-messages");
        assert_eq!(config.conversation_key(), "skincare-chat-history-conversation");
    }

    #[test]
    fn test_max_messages_is_clamped() {
        let config = SessionConfig::new().with_max_messages(0);
        assert_eq!(config.max_messages, 1);
        assert_eq!(config.max_exchange_pairs, 0);

        let config = SessionConfig::new().with_max_messages(7);
        assert_eq!(config.max_exchange_pairs, 3);
    }
}
