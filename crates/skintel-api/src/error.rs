use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 from the backend; the token is missing, expired or invalid
    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("backend returned {status}: {detail}")]
    Service { status: u16, detail: String },

    /// 2xx response whose body says `"success": false`
    #[error("backend reported failure: {0}")]
    Unsuccessful(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    /// Worth retrying later without user action
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Service { status, .. } => *status == 429 || *status >= 500,
            ApiError::Http(e) => e.is_timeout() || e.is_connect(),
            ApiError::Unauthorized(_) | ApiError::Unsuccessful(_) => false,
        }
    }
}
