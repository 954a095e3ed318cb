//! Enmet error types

/// Enmet error types
#[derive(Debug, thiserror::Error)]
pub enum EnmetError {
    // Construction errors
    #[error("invalid {0}")]
    InvalidId(String),

    // Transport/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    // Cache/configuration errors
    #[error("cache error: {0}")]
    Cache(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl EnmetError {
    /// Whether retrying the triggering access may succeed.
    ///
    /// Nothing in this crate retries on its own; this is a hint for callers.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for EnmetError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => EnmetError::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None => EnmetError::Http(err.to_string()),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for EnmetError {
    fn from(err: rusqlite::Error) -> Self {
        EnmetError::Cache(err.to_string())
    }
}

/// Result type alias for Enmet operations
pub type Result<T> = std::result::Result<T, EnmetError>;
