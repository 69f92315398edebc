//! Error types for StyleSense
//!
//! Every failure the client can surface to the user funnels through
//! [`StyleSenseError`]. Missing optional product fields are not errors and
//! never reach this type.

use thiserror::Error;

/// Main error type for StyleSense operations
#[derive(Error, Debug)]
pub enum StyleSenseError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Service returned {code}: {detail}")]
    Status { code: u16, detail: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for StyleSense operations
pub type Result<T> = std::result::Result<T, StyleSenseError>;

impl StyleSenseError {
    /// Build a status error, keeping the body only when it is non-empty
    pub fn from_status(code: u16, detail: Option<String>) -> Self {
        let detail = detail
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "no detail provided".to_string());
        StyleSenseError::Status { code, detail }
    }

    /// Whether the error came from talking to the service (transport or protocol)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            StyleSenseError::Transport(_)
                | StyleSenseError::Status { .. }
                | StyleSenseError::Decode(_)
        )
    }
}

impl From<reqwest::Error> for StyleSenseError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StyleSenseError::Decode(e.to_string())
        } else {
            StyleSenseError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for StyleSenseError {
    fn from(e: serde_json::Error) -> Self {
        StyleSenseError::Decode(e.to_string())
    }
}

impl From<figment::Error> for StyleSenseError {
    fn from(e: figment::Error) -> Self {
        StyleSenseError::Config(e.to_string())
    }
}

impl From<arboard::Error> for StyleSenseError {
    fn from(e: arboard::Error) -> Self {
        StyleSenseError::Clipboard(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_without_detail_gets_placeholder() {
        let err = StyleSenseError::from_status(500, Some("  ".to_string()));
        assert_eq!(err.to_string(), "Service returned 500: no detail provided");
    }

    #[test]
    fn transport_classification() {
        assert!(StyleSenseError::Transport("refused".into()).is_transport());
        assert!(StyleSenseError::from_status(502, None).is_transport());
        assert!(!StyleSenseError::Config("bad".into()).is_transport());
    }
}
