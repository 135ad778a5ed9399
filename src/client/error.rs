use serde::Deserialize;
use thiserror::Error;

/// Every client failure. `status` is `None` for transport errors and for calls
/// refused locally because there is no session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ClientError {
    pub status: Option<u16>,
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ClientError {
    pub fn no_session() -> Self {
        Self {
            status: None,
            message: "Not logged in".to_string(),
        }
    }

    /// Build from a non-success response body, preferring the service's
    /// `{"error"}` message over the HTTP reason phrase.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Request failed").to_string());
        Self {
            status: Some(status.as_u16()),
            message,
        }
    }

    pub fn is_status(&self, code: u16) -> bool {
        self.status == Some(code)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}
