//! Error types for status client operations.

use thiserror::Error;

/// Result type alias for status client operations.
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Errors that can occur while talking to the authority server.
///
/// None of these are fatal to the kiosk: the reconciliation engine treats
/// every variant as "no trustworthy answer" and resynchronizes later.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    /// Request never produced a response (unreachable, refused, reset)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request exceeded the configured timeout
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Server answered with a non-success status code
    #[error("Server returned HTTP {code}")]
    Status { code: u16 },

    /// Response arrived but its payload could not be interpreted
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Server URL could not be built from the configuration
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// HTTP client could not be constructed
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl NetworkError {
    /// Create a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Create a new invalid URL error.
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            NetworkError::Timeout(3000).to_string(),
            "Request timeout after 3000ms"
        );
        assert_eq!(
            NetworkError::Status { code: 401 }.to_string(),
            "Server returned HTTP 401"
        );
        assert_eq!(
            NetworkError::malformed("missing keyTaken").to_string(),
            "Malformed response: missing keyTaken"
        );
    }

    #[test]
    fn test_error_is_cloneable() {
        let error = NetworkError::transport("connection refused");
        assert_eq!(error.clone(), error);
    }
}
