//! Persisted form of the session.
//!
//! Restored data is read into string-typed records first and validated
//! field by field; any record that does not check out rejects the whole
//! entry.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use skintel_types::{ChatMessage, Exchange, Role, Sender};

use crate::error::PersistenceError;

#[derive(Debug, Serialize, Deserialize)]
struct StoredMessage {
    id: String,
    content: String,
    sender: String,
    timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredExchange {
    role: String,
    content: String,
}

impl From<&ChatMessage> for StoredMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            id: msg.id().to_string(),
            content: msg.content().to_string(),
            sender: msg.sender().as_str().to_string(),
            timestamp: format_timestamp(msg.timestamp()),
        }
    }
}

impl From<&Exchange> for StoredExchange {
    fn from(exchange: &Exchange) -> Self {
        Self {
            role: exchange.role.as_str().to_string(),
            content: exchange.content.clone(),
        }
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}

pub fn encode_messages(messages: &[ChatMessage]) -> serde_json::Result<String> {
    let stored: Vec<StoredMessage> = messages.iter().map(StoredMessage::from).collect();
    serde_json::to_string(&stored)
}

pub fn encode_exchanges(exchanges: &[Exchange]) -> serde_json::Result<String> {
    let stored: Vec<StoredExchange> = exchanges.iter().map(StoredExchange::from).collect();
    serde_json::to_string(&stored)
}

pub fn decode_messages(key: &str, raw: &str) -> Result<Vec<ChatMessage>, PersistenceError> {
    let stored: Vec<StoredMessage> = serde_json::from_str(raw)
        .map_err(|e| PersistenceError::malformed(key, format!("invalid JSON: {}", e)))?;

    stored
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            if record.id.is_empty() {
                return Err(PersistenceError::malformed(
                    key,
                    format!("message {} has an empty id", idx),
                ));
            }
            let sender: Sender = record
                .sender
                .parse()
                .map_err(|e| PersistenceError::malformed(key, format!("message {}: {}", idx, e)))?;
            let timestamp = parse_timestamp(&record.timestamp).map_err(|e| {
                PersistenceError::malformed(
                    key,
                    format!("message {} has invalid timestamp '{}': {}", idx, record.timestamp, e),
                )
            })?;
            Ok(ChatMessage::new(record.id, record.content, sender, timestamp))
        })
        .collect()
}

pub fn decode_exchanges(key: &str, raw: &str) -> Result<Vec<Exchange>, PersistenceError> {
    let stored: Vec<StoredExchange> = serde_json::from_str(raw)
        .map_err(|e| PersistenceError::malformed(key, format!("invalid JSON: {}", e)))?;

    if stored.len() % 2 != 0 {
        return Err(PersistenceError::malformed(
            key,
            format!("odd number of entries ({})", stored.len()),
        ));
    }

    stored
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let role: Role = record
                .role
                .parse()
                .map_err(|e| PersistenceError::malformed(key, format!("entry {}: {}", idx, e)))?;
            let expected = if idx % 2 == 0 { Role::User } else { Role::Assistant };
            if role != expected {
                return Err(PersistenceError::malformed(
                    key,
                    format!("entry {} has role '{}', expected '{}'", idx, role, expected),
                ));
            }
            Ok(Exchange {
                role,
                content: record.content,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample_message() -> ChatMessage {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        ChatMessage::new("m-1", "Hello", Sender::Bot, ts)
    }

    #[test]
    fn test_messages_encode_with_iso_timestamps() {
        let json = encode_messages(&[sample_message()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "id": "m-1",
                "content": "Hello",
                "sender": "bot",
                "timestamp": "2024-05-01T12:30:00.000Z"
            }])
        );
        assert_eq!(decode_messages("k", &json).unwrap(), vec![sample_message()]);
    }

    #[test]
    fn test_decode_accepts_offset_timestamps() {
        let raw = r#"[{"id":"a","content":"x","sender":"user","timestamp":"2024-05-01T14:30:00+02:00"}]"#;
        let messages = decode_messages("k", raw).unwrap();
        assert_eq!(
            messages[0].timestamp(),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_decode_messages_rejects_bad_records() {
        let cases = [
            "not json",
            r#"{"id":"a"}"#,
            r#"[{"id":"a","content":"x","sender":"assistant","timestamp":"2024-05-01T12:30:00Z"}]"#,
            r#"[{"id":"a","content":"x","sender":"user","timestamp":"yesterday"}]"#,
            r#"[{"id":"","content":"x","sender":"user","timestamp":"2024-05-01T12:30:00Z"}]"#,
            r#"[{"id":"a","sender":"user","timestamp":"2024-05-01T12:30:00Z"}]"#,
        ];
        for raw in cases {
            let err = decode_messages("chat-messages", raw).unwrap_err();
            assert!(matches!(err, PersistenceError::Malformed { .. }), "{}", raw);
            assert_eq!(err.key(), "chat-messages");
        }
    }

    #[test]
    fn test_decode_exchanges_requires_alternating_pairs() {
        let ok = r#"[{"role":"user","content":"Hi"},{"role":"assistant","content":"Hello!"}]"#;
        assert_eq!(
            decode_exchanges("k", ok).unwrap(),
            vec![Exchange::user("Hi"), Exchange::assistant("Hello!")]
        );

        let odd = r#"[{"role":"user","content":"Hi"}]"#;
        assert!(decode_exchanges("k", odd).is_err());

        let swapped = r#"[{"role":"assistant","content":"a"},{"role":"user","content":"b"}]"#;
        assert!(decode_exchanges("k", swapped).is_err());

        let unknown = r#"[{"role":"user","content":"a"},{"role":"system","content":"b"}]"#;
        assert!(decode_exchanges("k", unknown).is_err());
    }
}
