//! Resource Owner Password Credentials flow (RFC 6749 section 4.3).

use super::OAuthClient;
use crate::error::Result;
use crate::token::Token;
use crate::totp::Totp;
use tracing::debug;

/// Password grant for Reddit "script" apps.
///
/// The account password is sent directly to the token endpoint. When a
/// TOTP secret is configured the current one-time code is appended as
/// `password:code`.
#[derive(Clone)]
pub struct PasswordFlow {
    client: OAuthClient,
    username: String,
    password: String,
    totp: Option<Totp>,
}

impl std::fmt::Debug for PasswordFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordFlow")
            .field("client", &self.client)
            .field("username", &self.username)
            .field("two_factor", &self.totp.is_some())
            .finish_non_exhaustive()
    }
}

impl PasswordFlow {
    /// Creates a new password flow.
    #[must_use]
    pub fn new(
        client: OAuthClient,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client,
            username: username.into(),
            password: password.into(),
            totp: None,
        }
    }

    /// Enables two-factor authentication with the given generator.
    #[must_use]
    pub fn with_totp(mut self, totp: Totp) -> Self {
        self.totp = Some(totp);
        self
    }

    /// Returns the account name this flow authenticates as.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the underlying client.
    #[must_use]
    pub const fn client(&self) -> &OAuthClient {
        &self.client
    }

    /// Returns true if a one-time code is appended to the password.
    #[must_use]
    pub const fn uses_two_factor(&self) -> bool {
        self.totp.is_some()
    }

    /// Exchanges the account credentials for an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the one-time code cannot be generated, the
    /// request fails, or the server rejects the credentials.
    pub async fn authorize(&self) -> Result<Token> {
        let password = match &self.totp {
            Some(totp) => format!("{}:{}", self.password, totp.now()?),
            None => self.password.clone(),
        };

        let scope = self.client.provider.default_scopes.join(" ");
        let mut params = vec![
            ("grant_type", "password"),
            ("username", self.username.as_str()),
            ("password", password.as_str()),
        ];
        if !scope.is_empty() {
            params.push(("scope", scope.as_str()));
        }

        let token = self.client.request_token(&params).await?;
        debug!(username = %self.username, expires_at = ?token.expires_at, "Obtained access token");
        Ok(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::provider::Provider;
    use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn flow_for(server: &MockServer) -> PasswordFlow {
        let provider = Provider::new(
            "Test",
            format!("{}/api/v1/access_token", server.uri()),
            format!("{}/", server.uri()),
        )
        .unwrap()
        .with_default_scopes(vec!["identity".into(), "privatemessages".into()]);
        let client = OAuthClient::new("client", provider)
            .with_client_secret("secret")
            .with_user_agent("test-agent");
        PasswordFlow::new(client, "someone", "pa55")
    }

    #[tokio::test]
    async fn test_password_grant_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .and(header_exists("authorization"))
            .and(header("user-agent", "test-agent"))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("username=someone"))
            .and(body_string_contains("password=pa55"))
            .and(body_string_contains("scope=identity+privatemessages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok",
                "token_type": "bearer",
                "expires_in": 86400,
                "scope": "identity privatemessages"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = flow_for(&server).await.authorize().await.unwrap();
        assert_eq!(token.access_token, "tok");
        assert!(token.is_valid());
    }

    #[tokio::test]
    async fn test_password_grant_appends_totp() {
        let server = MockServer::start().await;
        // "pa55:" url-encodes the colon
        Mock::given(method("POST"))
            .and(body_string_contains("password=pa55%3A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok",
                "token_type": "bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let flow = flow_for(&server)
            .await
            .with_totp(Totp::from_base32("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").unwrap());
        assert!(flow.uses_two_factor());
        flow.authorize().await.unwrap();
    }

    #[tokio::test]
    async fn test_error_body_with_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "error": "invalid_grant" })),
            )
            .mount(&server)
            .await;

        let err = flow_for(&server).await.authorize().await.unwrap_err();
        assert!(matches!(err, Error::OAuth { ref error, .. } if error == "invalid_grant"));
        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn test_unauthorized_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Unauthorized",
                "error": 401
            })))
            .mount(&server)
            .await;

        let err = flow_for(&server).await.authorize().await.unwrap_err();
        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn test_server_error_without_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = flow_for(&server).await.authorize().await.unwrap_err();
        assert!(matches!(err, Error::OAuth { ref error, .. } if error == "503"));
        assert!(!err.is_auth_failure());
    }
}
