//! Weather-source error types.

use thiserror::Error;

/// The three ways a lookup can fail, as seen by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The remote reports the city does not exist.
    NotFound,
    /// Network, server or other non-404 failure.
    TransientFailure,
    /// The remote answered but the document does not match its schema.
    MalformedResponse,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("City not found: {0}")]
    NotFound(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl FetchError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Collapse into the user-facing classification.
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::NotFound(_) => FetchErrorKind::NotFound,
            Self::MalformedResponse(_) => FetchErrorKind::MalformedResponse,
            Self::Api { .. } | Self::Network(_) => FetchErrorKind::TransientFailure,
        }
    }
}
