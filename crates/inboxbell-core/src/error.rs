//! Error types for the core library.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication with the inbox provider failed.
    #[error("OAuth error: {0}")]
    OAuth(#[from] inboxbell_oauth::Error),

    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The inbox API rejected the session; a fresh login may succeed.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// The inbox API answered with an unexpected status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// An inbox item had a kind this program does not handle.
    #[error("Unknown inbox item kind: {0}")]
    UnknownItemKind(String),

    /// The persisted ledger exists but cannot be parsed.
    #[error("Seen ledger at {} is corrupt: {source}", path.display())]
    CorruptLedger {
        /// Ledger file path.
        path: PathBuf,
        /// Parse failure.
        source: serde_json::Error,
    },

    /// Reading or writing the ledger file failed.
    #[error("Seen ledger I/O at {}: {source}", path.display())]
    LedgerIo {
        /// Ledger file path.
        path: PathBuf,
        /// Underlying failure.
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The system keyring could not be read.
    #[error("Credential error: {0}")]
    Credential(#[from] crate::credentials::CredentialError),
}

impl Error {
    /// Returns true for failures a re-login can fix: an expired or revoked
    /// session, or a rejected password grant.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::SessionExpired(_) => true,
            Self::OAuth(e) => e.is_auth_failure(),
            _ => false,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
