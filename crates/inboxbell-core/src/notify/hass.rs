//! Home Assistant notify service.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::{Delivery, NotificationPayload, Notifier};
use crate::config::HubConfig;
use crate::Result;

/// Timeout for each delivery request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Request body for `POST /api/services/notify/<target>`.
#[derive(Debug, Serialize)]
struct NotifyRequest<'a> {
    title: &'a str,
    message: &'a str,
    data: NotifyData<'a>,
}

#[derive(Debug, Serialize)]
struct NotifyData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_url: Option<&'a str>,
    url: &'a str,
}

/// Sends notifications through a Home Assistant notify service.
pub struct HomeAssistantNotifier {
    client: Client,
    endpoint: Url,
    token: String,
}

impl std::fmt::Debug for HomeAssistantNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeAssistantNotifier")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl HomeAssistantNotifier {
    /// Creates a notifier for the configured hub and target.
    ///
    /// # Errors
    ///
    /// Returns an error if the service URL or the HTTP client cannot be
    /// built.
    pub fn new(config: &HubConfig) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            endpoint: config.service_url()?,
            token: config.token.clone(),
        })
    }
}

impl Notifier for HomeAssistantNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<Delivery> {
        let body = NotifyRequest {
            title: &payload.title,
            message: &payload.body,
            data: NotifyData {
                icon_url: payload.icon_url.as_deref(),
                url: &payload.link,
            },
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(title = %payload.title, "Notification accepted by hub");
            return Ok(Delivery::Delivered);
        }

        Ok(Delivery::Rejected {
            status: status.as_u16(),
            reason: response.text().await.unwrap_or_default(),
        })
    }
}
