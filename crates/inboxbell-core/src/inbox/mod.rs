//! Inbox sources.
//!
//! A source lists the unread items of one account. The poll loop only
//! depends on [`InboxSource`]; [`RedditInbox`] talks to the Reddit API.

mod model;
pub mod reddit;

pub use model::{DELETED_AUTHOR, InboxItem};
pub use reddit::RedditInbox;

use crate::Result;

/// Provider of unread inbox items.
///
/// Implementations cache their session between calls. An expired or
/// rejected session is reported as an error for which
/// [`crate::Error::is_auth_failure`] is true.
#[allow(async_fn_in_trait)]
pub trait InboxSource {
    /// Returns the authenticated account name.
    async fn identity(&mut self) -> Result<String>;

    /// Returns the unread items, in the order the provider lists them.
    async fn unread(&mut self) -> Result<Vec<InboxItem>>;

    /// Drops any cached session so the next call logs in again.
    fn reset_session(&mut self);
}
