//! `OAuth2` provider configurations.

use crate::error::{Error, Result};
use url::Url;

/// `OAuth2` provider configuration.
#[derive(Debug, Clone)]
pub struct Provider {
    /// Provider name (e.g., "Reddit").
    pub name: String,
    /// Token endpoint URL.
    pub token_url: Url,
    /// Base URL for authenticated API calls.
    pub api_base: Url,
    /// Default scopes.
    pub default_scopes: Vec<String>,
}

impl Provider {
    /// Creates a new provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if URLs are invalid.
    pub fn new(
        name: impl Into<String>,
        token_url: impl AsRef<str>,
        api_base: impl AsRef<str>,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            token_url: Url::parse(token_url.as_ref())?,
            api_base: Url::parse(api_base.as_ref())?,
            default_scopes: Vec::new(),
        })
    }

    /// Sets the default scopes.
    #[must_use]
    pub fn with_default_scopes(mut self, scopes: Vec<String>) -> Self {
        self.default_scopes = scopes;
        self
    }

    /// Reddit `OAuth2` provider configuration.
    ///
    /// Scopes:
    /// - `identity` - Resolve the authenticated account name
    /// - `privatemessages` - Read the inbox
    ///
    /// # Errors
    ///
    /// Returns an error if URL parsing fails.
    pub fn reddit() -> Result<Self> {
        Ok(Self::new(
            "Reddit",
            "https://www.reddit.com/api/v1/access_token",
            "https://oauth.reddit.com/",
        )?
        .with_default_scopes(vec![
            "identity".to_string(),
            "privatemessages".to_string(),
        ]))
    }

    /// Resolves an API path against the provider's API base.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn api_url(&self, path: &str) -> Result<Url> {
        Ok(self.api_base.join(path.trim_start_matches('/'))?)
    }

    /// Validates that required URLs are usable.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.token_url.cannot_be_a_base() {
            return Err(Error::InvalidConfig("token_url is not a base URL".into()));
        }
        if self.api_base.cannot_be_a_base() {
            return Err(Error::InvalidConfig("api_base is not a base URL".into()));
        }
        Ok(())
    }
}
