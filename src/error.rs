use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonoError {
    #[error("invalid token: {0}")]
    InvalidToken(&'static str),

    #[error("invalid date range: {from} to {to} must span less than 31 days and 1 hour")]
    InvalidDateRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    #[error("too many requests: only one statement request per 60 seconds, retry in {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// Non-success response; displays exactly the upstream description.
    #[error("{description}")]
    Api {
        status: reqwest::StatusCode,
        description: String,
    },

    #[error("invalid or unexpected response format: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl MonoError {
    /// HTTP status of an upstream rejection, if this error is one.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            MonoError::Api { status, .. } => Some(*status),
            MonoError::Http(err) => err.status(),
            _ => None,
        }
    }
}
