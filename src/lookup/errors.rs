// Error types for the lookup pipeline

use thiserror::Error;

pub type LookupResult<T> = Result<T, LookupError>;

/// Shown when a transport failure carries no usable description.
pub const GENERIC_TRANSPORT_MESSAGE: &str =
    "An unexpected error occurred while contacting the metadata service.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The submitted text does not contain a recognizable video ID
    #[error("Could not extract a valid YouTube video ID from the URL.")]
    InvalidUrl(String),

    /// The metadata request failed (DNS, timeout, non-2xx, malformed JSON)
    #[error("{message}")]
    Transport {
        message: String,
        status: Option<u16>,
    },

    /// The request succeeded but the payload has no title
    #[error("unexpected response shape")]
    UnexpectedShape,

    /// Missing or invalid startup configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LookupError {
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Transport {
            message: if message.trim().is_empty() {
                GENERIC_TRANSPORT_MESSAGE.to_string()
            } else {
                message
            },
            status: None,
        }
    }

    /// Non-2xx reply. A server-provided `message` wins over the status line.
    pub fn http_status(status: u16, server_message: Option<String>) -> Self {
        let message = server_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed with status code {}", status));
        Self::Transport {
            message,
            status: Some(status),
        }
    }

    /// Display-ready text for the presentation layer.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnexpectedShape => "Could not fetch video details. \
                 The API response was not in the expected format."
                .to_string(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::transport("Network timeout: the metadata service is not responding");
        }

        if e.is_connect() {
            return Self::transport(format!("Could not connect to the metadata service: {}", e));
        }

        if e.is_decode() {
            return Self::transport(format!("Failed to parse JSON: {}", e));
        }

        match e.status() {
            Some(status) => Self::http_status(status.as_u16(), None),
            None => Self::transport(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(e: serde_json::Error) -> Self {
        Self::transport(format!("Failed to parse JSON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_wins() {
        let err = LookupError::http_status(403, Some("You are not subscribed to this API.".into()));
        assert_eq!(err.to_string(), "You are not subscribed to this API.");
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_status_fallback_message() {
        let err = LookupError::http_status(500, Some("   ".into()));
        assert_eq!(err.to_string(), "Request failed with status code 500");
    }

    #[test]
    fn test_blank_transport_message_falls_back() {
        let err = LookupError::transport("");
        assert_eq!(err.to_string(), GENERIC_TRANSPORT_MESSAGE);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            LookupError::InvalidUrl("not a url".into()).user_message(),
            "Could not extract a valid YouTube video ID from the URL."
        );
        assert_eq!(LookupError::UnexpectedShape.to_string(), "unexpected response shape");
        assert!(LookupError::UnexpectedShape
            .user_message()
            .contains("not in the expected format"));
    }
}
