//! Inbox item model.

use crate::Result;
use crate::ledger::ItemKind;

/// Placeholder author for deleted accounts.
pub const DELETED_AUTHOR: &str = "[deleted]";

/// One unread entry in the inbox, as returned by the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxItem {
    /// Raw kind prefix from the source (`t1` comment, `t4` message).
    pub thing_kind: String,
    /// Unique item ID (without kind prefix).
    pub id: String,
    /// Author account name.
    pub author: String,
    /// Subject line ("comment reply", "username mention", or a PM subject).
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Permalink path with context, for comments (e.g. `/r/rust/comments/...`).
    pub context: String,
    /// Subreddit name, for comments.
    pub subreddit: Option<String>,
}

impl InboxItem {
    /// Creates a comment item.
    #[must_use]
    pub fn comment(id: impl Into<String>, author: impl Into<String>) -> Self {
        Self::with_kind("t1", id, author)
    }

    /// Creates a private message item.
    #[must_use]
    pub fn message(id: impl Into<String>, author: impl Into<String>) -> Self {
        Self::with_kind("t4", id, author)
    }

    /// Creates an item with an arbitrary kind prefix.
    #[must_use]
    pub fn with_kind(
        thing_kind: impl Into<String>,
        id: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            thing_kind: thing_kind.into(),
            id: id.into(),
            author: author.into(),
            subject: String::new(),
            body: String::new(),
            context: String::new(),
            subreddit: None,
        }
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the context permalink.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Sets the subreddit.
    #[must_use]
    pub fn with_subreddit(mut self, subreddit: impl Into<String>) -> Self {
        self.subreddit = Some(subreddit.into());
        self
    }

    /// Resolves the ledger kind of this item.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownItemKind`] if the source sent a kind
    /// other than comment or message.
    pub fn kind(&self) -> Result<ItemKind> {
        ItemKind::from_thing_kind(&self.thing_kind)
    }
}
