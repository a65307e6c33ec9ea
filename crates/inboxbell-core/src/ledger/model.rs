//! Ledger data models.

use crate::{Error, Result};

/// Kind of inbox item, keyed separately in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Reply to a post or comment, or a username mention.
    Comment,
    /// Private message.
    Message,
}

impl ItemKind {
    /// Every kind the ledger tracks.
    pub const ALL: [Self; 2] = [Self::Comment, Self::Message];

    /// Maps a Reddit thing kind prefix (`t1`, `t4`) to an item kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownItemKind`] for any other prefix.
    pub fn from_thing_kind(kind: &str) -> Result<Self> {
        match kind {
            "t1" => Ok(Self::Comment),
            "t4" => Ok(Self::Message),
            other => Err(Error::UnknownItemKind(other.to_string())),
        }
    }

    /// Ledger key for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thing_kind_mapping() {
        assert_eq!(ItemKind::from_thing_kind("t1").ok(), Some(ItemKind::Comment));
        assert_eq!(ItemKind::from_thing_kind("t4").ok(), Some(ItemKind::Message));
    }

    #[test]
    fn test_unknown_thing_kind() {
        let err = ItemKind::from_thing_kind("t3");
        assert!(matches!(err, Err(Error::UnknownItemKind(ref k)) if k == "t3"));
    }

    #[test]
    fn test_as_str() {
        assert_eq!(ItemKind::Comment.as_str(), "comment");
        assert_eq!(ItemKind::Message.to_string(), "message");
    }
}
