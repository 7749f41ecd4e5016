use thiserror::Error;

/// Failure reported by a [`KeyValueStore`](crate::KeyValueStore)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage quota exceeded ({requested} bytes requested, quota is {quota})")]
    QuotaExceeded { requested: usize, quota: usize },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Persistence failures absorbed by the session manager.
///
/// These never reach callers of the manager; they are logged and the
/// in-memory session stays authoritative.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("malformed data under '{key}': {reason}")]
    Malformed { key: String, reason: String },

    #[error("failed to write '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: StoreError,
    },
}

impl PersistenceError {
    pub fn malformed(key: &str, reason: impl Into<String>) -> Self {
        PersistenceError::Malformed {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            PersistenceError::Read { key, .. }
            | PersistenceError::Malformed { key, .. }
            | PersistenceError::Write { key, .. } => key,
        }
    }
}
