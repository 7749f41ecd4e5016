//! Core types shared by the skintel crates
//!
//! This crate holds the chat data model (displayed messages and the compact
//! exchange log) and the wire types of the backend chat API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Constants
// ============================================================================

/// Base name for the persisted chat entries
pub const DEFAULT_STORAGE_KEY: &str = "skincare-chat-history";

/// Suffix of the entry holding the displayed messages
pub const MESSAGES_KEY_SUFFIX: &str = "-messages";

/// Suffix of the entry holding the exchange log
pub const CONVERSATION_KEY_SUFFIX: &str = "-conversation";

/// Default cap on displayed messages
pub const DEFAULT_MAX_MESSAGES: usize = 50;

/// First message of a fresh session
pub const DEFAULT_WELCOME_MESSAGE: &str = "Hi! I'm your Skintel skincare assistant. \
Ask me about your skin concerns, routines or products and I'll do my best to help.";

/// First message after the chat has been cleared
pub const DEFAULT_CLEARED_MESSAGE: &str =
    "Chat cleared. How can I help you with your skincare today?";

/// Shown in place of a reply when the backend could not be reached
pub const ASSISTANT_UNAVAILABLE_MESSAGE: &str = "Sorry, I couldn't reach the skincare assistant \
right now. Please try again in a moment.";

// ============================================================================
// Message Types
// ============================================================================

/// Error returned when a persisted enum value is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Who a displayed message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sender {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            other => Err(ParseEnumError {
                kind: "sender",
                value: other.to_string(),
            }),
        }
    }
}

/// Role of an entry in the exchange log sent to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(ParseEnumError {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// A displayed chat entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    id: String,
    content: String,
    sender: Sender,
    timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        sender: Sender,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            sender,
            timestamp,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// One entry of the compact conversation context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub role: Role,
    pub content: String,
}

impl Exchange {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ============================================================================
// Backend Wire Types
// ============================================================================

/// Body of `POST /chatbot`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub conversation_history: Option<Vec<Exchange>>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, history: &[Exchange]) -> Self {
        Self {
            message: message.into(),
            conversation_history: if history.is_empty() {
                None
            } else {
                Some(history.to_vec())
            },
        }
    }
}

/// Response of `POST /chatbot`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// Daily quota of the backend chatbot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub requests_remaining: u32,
    pub requests_made: u32,
    pub daily_limit: u32,
    #[serde(default)]
    pub retry_after: u64,
    pub can_make_request: bool,
}

/// Response of `GET /chatbot/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatbotStatus {
    pub quota_status: QuotaStatus,
    pub service_available: bool,
    #[serde(default)]
    pub estimated_reset_time: Option<String>,
}

/// Body of `POST /skin-advice`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinAdviceRequest {
    pub concerns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub additional_context: Option<String>,
}

/// Response of `POST /skin-advice`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinAdviceResponse {
    pub success: bool,
    #[serde(default)]
    pub advice: Option<String>,
    #[serde(default)]
    pub concerns_analyzed: Option<Vec<String>>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// FastAPI error body: `{"detail": ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub detail: serde_json::Value,
}

impl ErrorDetail {
    /// Flatten the detail into a single line of text
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
