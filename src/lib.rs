//! Stubdeck - a terminal admin console for WireMock-style mock servers.
//!
//! This library provides the core functionality for the `sd` CLI tool:
//! an admin API client, view models for stub mappings and serve events,
//! foldered tree construction, search, and scenario state-machine layout.

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod models;
pub mod search;
pub mod tui;

/// Library-level error type for stubdeck operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level failure: connection refused, DNS, timeout. The
    /// request may never have reached the server.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("server error: {status} {status_text}")]
    Server { status: u16, status_text: String },

    #[error("invalid admin URL: {0}")]
    InvalidUrl(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// HTTP status of a server-returned error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short toast/log message built from whichever fields are present.
    pub fn summary(&self) -> String {
        match self {
            Error::Server { status, status_text } if status_text.is_empty() => {
                format!("server returned {}", status)
            }
            Error::Server { status, status_text } => {
                format!("server returned {} {}", status, status_text)
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Error::Server {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            },
            None => Error::Network(err.to_string()),
        }
    }
}

/// Result type alias for stubdeck operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_summary_includes_status() {
        let err = Error::Server {
            status: 422,
            status_text: "Unprocessable Entity".to_string(),
        };
        assert_eq!(err.summary(), "server returned 422 Unprocessable Entity");
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_server_error_summary_without_text() {
        let err = Error::Server {
            status: 500,
            status_text: String::new(),
        };
        assert_eq!(err.summary(), "server returned 500");
    }

    #[test]
    fn test_network_error_has_no_status() {
        let err = Error::Network("connection refused".to_string());
        assert_eq!(err.status(), None);
    }
}
