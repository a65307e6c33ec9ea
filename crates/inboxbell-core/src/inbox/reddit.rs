//! Reddit inbox source.
//!
//! Authenticates as a "script" app with the password grant and reads
//! `/message/unread`. The access token is cached until it expires or the
//! API rejects it.

use std::time::Duration;

use inboxbell_oauth::{OAuthClient, PasswordFlow, Provider, Token, Totp};
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use super::model::{DELETED_AUTHOR, InboxItem};
use super::InboxSource;
use crate::config::RedditConfig;
use crate::{Error, Result};

/// Items requested per listing page (Reddit's maximum).
const PAGE_SIZE: &str = "100";

/// Upper bound on listing pages followed in one fetch.
const MAX_PAGES: usize = 10;

/// Timeout for each API request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Listing envelope returned by Reddit.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    data: ThingData,
}

#[derive(Debug, Deserialize)]
struct ThingData {
    id: String,
    author: Option<String>,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    context: String,
    subreddit: Option<String>,
}

impl From<Thing> for InboxItem {
    fn from(thing: Thing) -> Self {
        let data = thing.data;
        Self {
            thing_kind: thing.kind,
            id: data.id,
            author: data.author.unwrap_or_else(|| DELETED_AUTHOR.to_string()),
            subject: data.subject,
            body: data.body,
            context: data.context,
            subreddit: data.subreddit.filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Me {
    name: String,
}

/// Inbox source backed by the Reddit API.
#[derive(Debug)]
pub struct RedditInbox {
    flow: PasswordFlow,
    http: Client,
    token: Option<Token>,
}

impl RedditInbox {
    /// Creates a source from an authorization flow.
    #[must_use]
    pub fn new(flow: PasswordFlow, http: Client) -> Self {
        Self {
            flow,
            http,
            token: None,
        }
    }

    /// Creates a source for the production Reddit endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOTP secret is invalid or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &RedditConfig) -> Result<Self> {
        Self::with_provider(config, Provider::reddit()?)
    }

    /// Creates a source against a custom provider (used for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the provider URLs cannot serve as a base, the
    /// TOTP secret is invalid or the HTTP client cannot be built.
    pub fn with_provider(config: &RedditConfig, provider: Provider) -> Result<Self> {
        provider.validate()?;
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let client = OAuthClient::new(&config.client_id, provider)
            .with_client_secret(&config.client_secret)
            .with_user_agent(&config.user_agent)
            .with_http_client(http.clone());

        let mut flow = PasswordFlow::new(client, &config.username, &config.password);
        if let Some(secret) = &config.totp_secret {
            flow = flow.with_totp(Totp::from_base32(secret)?);
        }

        Ok(Self::new(flow, http))
    }

    /// Returns a valid access token, logging in if needed.
    async fn access_token(&mut self) -> Result<String> {
        if let Some(token) = self.token.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.access_token.clone());
        }

        info!(username = %self.flow.username(), "Logging in to Reddit");
        let token = self.flow.authorize().await?;
        let access = token.access_token.clone();
        self.token = Some(token);
        Ok(access)
    }

    /// Performs an authenticated GET and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&mut self, url: Url) -> Result<T> {
        let access = self.access_token().await?;

        let response = self
            .http
            .get(url)
            .header(USER_AGENT, &self.flow.client().user_agent)
            .bearer_auth(access)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.token = None;
            return Err(Error::SessionExpired(status.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    fn unread_url(&self, after: Option<&str>) -> Result<Url> {
        let mut url = self.flow.client().provider.api_url("message/unread")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("limit", PAGE_SIZE)
                .append_pair("mark", "false")
                .append_pair("raw_json", "1");
            if let Some(after) = after {
                pairs.append_pair("after", after);
            }
        }
        Ok(url)
    }
}

impl InboxSource for RedditInbox {
    async fn identity(&mut self) -> Result<String> {
        let url = self.flow.client().provider.api_url("api/v1/me")?;
        let me: Me = self.get_json(url).await?;
        Ok(me.name)
    }

    async fn unread(&mut self) -> Result<Vec<InboxItem>> {
        let mut items = Vec::new();
        let mut after: Option<String> = None;

        for page in 1..=MAX_PAGES {
            let url = self.unread_url(after.as_deref())?;
            let listing: Listing = self.get_json(url).await?;

            debug!(page, count = listing.data.children.len(), "Fetched unread page");
            items.extend(listing.data.children.into_iter().map(InboxItem::from));

            match listing.data.after {
                Some(next) if !next.is_empty() => after = Some(next),
                _ => break,
            }
        }

        Ok(items)
    }

    fn reset_session(&mut self) {
        self.token = None;
    }
}
