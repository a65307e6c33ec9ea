//! Push notification delivery.

pub mod hass;
mod payload;

pub use hass::HomeAssistantNotifier;
pub use payload::{
    DEFAULT_DEEP_LINK_BASE, DEFAULT_MAX_BODY_CHARS, NotificationPayload, NotificationStyle,
    truncate,
};

use crate::Result;

/// Outcome of a delivery attempt that reached the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The hub accepted the notification.
    Delivered,
    /// The hub answered with a non-success status.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        reason: String,
    },
}

impl Delivery {
    /// Returns true if the hub accepted the notification.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Sends notifications to a hub.
///
/// One call makes one delivery attempt; retrying is the caller's decision.
/// Transport failures are returned as `Err`.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    /// Sends a single notification.
    async fn send(&self, payload: &NotificationPayload) -> Result<Delivery>;
}
