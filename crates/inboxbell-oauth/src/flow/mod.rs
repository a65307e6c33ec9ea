//! `OAuth2` authorization flows.

mod password;

pub use password::PasswordFlow;

use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::token::{ErrorResponse, Token, TokenReply};
use reqwest::Client;
use reqwest::header::USER_AGENT;
use tracing::debug;

/// User agent sent when the caller does not set one.
const DEFAULT_USER_AGENT: &str = concat!("inboxbell/", env!("CARGO_PKG_VERSION"));

/// Common `OAuth2` client configuration.
#[derive(Clone)]
pub struct OAuthClient {
    /// Client ID from provider.
    pub client_id: String,
    /// Client secret (Reddit script apps always have one).
    pub client_secret: Option<String>,
    /// User agent sent with token requests.
    pub user_agent: String,
    /// Provider configuration.
    pub provider: Provider,
    /// HTTP client.
    http_client: Client,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("client_id", &self.client_id)
            .field("user_agent", &self.user_agent)
            .field("provider", &self.provider.name)
            .finish_non_exhaustive()
    }
}

impl OAuthClient {
    /// Creates a new OAuth client.
    #[must_use]
    pub fn new(client_id: impl Into<String>, provider: Provider) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            provider,
            http_client: Client::new(),
        }
    }

    /// Sets the client secret.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Sets the user agent. Reddit throttles requests with generic agents.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Uses an existing HTTP client (shares its connection pool).
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Posts a grant to the token endpoint.
    ///
    /// Client credentials go in the basic auth header, as Reddit requires.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the grant.
    pub(crate) async fn request_token(&self, params: &[(&str, &str)]) -> Result<Token> {
        debug!(provider = %self.provider.name, "Requesting access token");

        let response = self
            .http_client
            .post(self.provider.token_url.clone())
            .header(USER_AGENT, &self.user_agent)
            .basic_auth(&self.client_id, self.client_secret.as_deref())
            .form(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(serde_json::from_str::<ErrorResponse>(&body).map_or_else(
                |_| Error::oauth_error(status.as_u16().to_string(), status.to_string()),
                ErrorResponse::into_error,
            ));
        }

        match serde_json::from_str::<TokenReply>(&body)? {
            TokenReply::Granted(response) => Token::from_response(response),
            TokenReply::Failed(error) => Err(error.into_error()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_client_creation() {
        let provider = Provider::reddit().unwrap();
        let client = OAuthClient::new("test_client_id", provider);
        assert_eq!(client.client_id, "test_client_id");
        assert!(client.client_secret.is_none());
        assert!(client.user_agent.starts_with("inboxbell/"));
    }

    #[test]
    fn test_oauth_client_debug_hides_secret() {
        let provider = Provider::reddit().unwrap();
        let client = OAuthClient::new("test_client_id", provider)
            .with_client_secret("hunter2")
            .with_user_agent("linux:inboxbell:0.1 (by /u/someone)");

        assert_eq!(client.client_secret.as_deref(), Some("hunter2"));
        assert!(!format!("{client:?}").contains("hunter2"));
    }
}
