//! Error types for the probe engine.
//!
//! Most failures never leave a probe: they are logged and folded into a
//! verdict. Only the variants a caller has to act on are returned.

use idprobe_core::ConfigError;
use thiserror::Error;

/// Errors that can occur while probing.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// No response was received (DNS, TCP or TLS failure)
    #[error("network error for {url}: {message}")]
    Network {
        /// Request URL
        url: String,
        /// Transport error message
        message: String,
    },

    /// The HTTP client could not be built (e.g. invalid proxy URL)
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The account is locked; further attempts against it should stop
    #[error("account {identity} is locked")]
    AccountLocked {
        /// Locked identity
        identity: String,
    },

    /// Request validation error
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ProbeError {
    /// Build a network error from a URL and any displayable cause.
    pub fn network(url: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Network {
            url: url.into(),
            message: cause.to_string(),
        }
    }
}

/// Result type alias for probe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProbeError::AccountLocked {
            identity: "alice@contoso.com".to_string(),
        };
        assert_eq!(err.to_string(), "account alice@contoso.com is locked");

        let err = ProbeError::network("https://www.office.com", "connection refused");
        assert_eq!(
            err.to_string(),
            "network error for https://www.office.com: connection refused"
        );
    }
}
