//! Error types for `OAuth2` operations.

/// Result type alias for `OAuth2` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `OAuth2` error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `OAuth2` error from server.
    #[error("OAuth2 error: {error} - {description}")]
    OAuth {
        /// Error code (e.g., `invalid_grant`).
        error: String,
        /// Human-readable description.
        description: String,
    },

    /// Invalid token response.
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The one-time-password secret could not be decoded.
    #[error("Invalid TOTP secret: {0}")]
    InvalidTotpSecret(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl Error {
    /// Creates an OAuth error from error code and description.
    #[must_use]
    pub fn oauth_error(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::OAuth {
            error: error.into(),
            description: description.into(),
        }
    }

    /// Returns true if the error means the credentials or session were
    /// rejected, as opposed to a transport or configuration problem.
    ///
    /// A one-time code that rolled over between generation and use also
    /// surfaces as `invalid_grant`, so callers may retry these.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::OAuth { error, .. } if matches!(
                error.as_str(),
                "invalid_grant" | "invalid_token" | "unauthorized_client" | "401" | "403"
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_classification() {
        assert!(Error::oauth_error("invalid_token", "").is_auth_failure());
        assert!(Error::oauth_error("invalid_grant", "").is_auth_failure());
        assert!(Error::oauth_error("401", "Unauthorized").is_auth_failure());
        assert!(!Error::oauth_error("unsupported_grant_type", "").is_auth_failure());
        assert!(!Error::InvalidConfig("missing".into()).is_auth_failure());
    }
}
