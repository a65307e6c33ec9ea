//! Notification formatting.

use crate::inbox::InboxItem;
use crate::ledger::ItemKind;

/// Default deep-link prefix; opens the item in the Apollo client.
pub const DEFAULT_DEEP_LINK_BASE: &str = "apollo://reddit.com";

/// Bodies longer than this are cut with an ellipsis.
pub const DEFAULT_MAX_BODY_CHARS: usize = 500;

/// Presentation settings applied to every notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationStyle {
    /// Icon shown with the notification.
    pub icon_url: Option<String>,
    /// Prefix joined with the item's path to form the tap target.
    pub deep_link_base: String,
    /// Maximum body length in characters.
    pub max_body_chars: usize,
}

impl Default for NotificationStyle {
    fn default() -> Self {
        Self {
            icon_url: None,
            deep_link_base: DEFAULT_DEEP_LINK_BASE.to_string(),
            max_body_chars: DEFAULT_MAX_BODY_CHARS,
        }
    }
}

/// A push notification ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Icon URL, if configured.
    pub icon_url: Option<String>,
    /// URL opened when the notification is tapped.
    pub link: String,
}

impl NotificationPayload {
    /// Builds the notification for an inbox item.
    ///
    /// The result depends only on the item, its kind and the style.
    #[must_use]
    pub fn from_item(item: &InboxItem, kind: ItemKind, style: &NotificationStyle) -> Self {
        let base = style.deep_link_base.trim_end_matches('/');

        let (title, link) = match kind {
            ItemKind::Comment => {
                let title = item.subreddit.as_deref().map_or_else(
                    || format!("u/{} replied", item.author),
                    |sub| format!("u/{} replied in r/{sub}", item.author),
                );
                let link = if item.context.is_empty() {
                    format!("{base}/message/inbox")
                } else {
                    format!("{base}/{}", item.context.trim_start_matches('/'))
                };
                (title, link)
            }
            ItemKind::Message => (
                format!("u/{}: {}", item.author, item.subject),
                format!("{base}/message/messages/{}", item.id),
            ),
        };

        let text = if item.body.trim().is_empty() {
            item.subject.as_str()
        } else {
            item.body.as_str()
        };

        Self {
            title,
            body: truncate(text.trim(), style.max_body_chars),
            icon_url: style.icon_url.clone(),
            link,
        }
    }
}

/// Truncates `s` to at most `max_len` characters, ending in `...` when cut.
///
/// Limits too small to hold the ellipsis cut without one.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncate_at = max_len.saturating_sub(3);
        let truncated: String = s.chars().take(truncate_at).collect();
        format!("{}...", truncated.trim_end())
    }
}
