//! Maps API error taxonomy

/// Errors raised by the Maps API layer.
///
/// `Transport` covers timeouts, connection failures and upstream 5xx responses
/// and is the only retryable class. `Api` carries the machine-readable status
/// string Google returned (`OVER_QUERY_LIMIT`, `REQUEST_DENIED`, ...).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapsError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{}", describe_api_error(.status, .message.as_deref()))]
    Api { status: String, message: Option<String> },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MapsError {
    /// Build an API-level error from a status string and optional detail
    pub fn api(status: impl Into<String>, message: Option<String>) -> Self {
        Self::Api {
            status: status.into(),
            message,
        }
    }

    /// Only transport-level failures can change outcome on a second attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            MapsError::Transport(_) => true,
            MapsError::Api { .. } => false,
            MapsError::Decode(_) => false,
            MapsError::Cancelled => false,
            MapsError::Internal(_) => false,
        }
    }

    /// Upstream status string, if this is an API-level error
    pub fn api_status(&self) -> Option<&str> {
        match self {
            MapsError::Api { status, .. } => Some(status),
            _ => None,
        }
    }
}

fn describe_api_error(status: &str, message: Option<&str>) -> String {
    match message {
        Some(message) if !message.is_empty() => format!("{} ({})", status, message),
        _ => status.to_string(),
    }
}

impl From<reqwest::Error> for MapsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MapsError::Decode(err.to_string())
        } else if err.is_builder() {
            MapsError::Internal(err.to_string())
        } else {
            // timeouts, connect/reset failures, body read errors
            MapsError::Transport(err.to_string())
        }
    }
}
