//! # inboxbell-core
//!
//! Core logic for `inboxbell`, which forwards unread Reddit inbox items to a
//! Home Assistant notify service exactly once.
//!
//! This crate provides:
//! - **Seen ledger** - Durable per-kind set of already-notified item IDs
//! - **Inbox sources** - The [`InboxSource`] seam and a Reddit implementation
//! - **Notifiers** - Payload formatting and a Home Assistant implementation
//! - **Poll loop** - Fetch, dedupe, notify, record, sleep, with auth retries
//! - **Configuration** - Immutable settings from the environment and keyring
//!
//! ## Example
//!
//! ```ignore
//! use inboxbell_core::{Config, HomeAssistantNotifier, PollLoop, RedditInbox, SeenLedger};
//!
//! let config = Config::from_env()?;
//! let source = RedditInbox::from_config(&config.reddit)?;
//! let notifier = HomeAssistantNotifier::new(&config.hub)?;
//! let ledger = SeenLedger::load(&config.ledger_path).await?;
//!
//! PollLoop::new(config.poll, source, notifier, ledger).run().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod credentials;
mod error;
pub mod inbox;
pub mod ledger;
pub mod notify;
pub mod poll;

pub use config::{Config, HubConfig, PollConfig, RedditConfig, RetryPolicy};
pub use credentials::{CredentialError, CredentialResult};
pub use error::{Error, Result};
pub use inbox::{InboxItem, InboxSource, RedditInbox};
pub use ledger::{ItemKind, SeenLedger};
pub use notify::{
    Delivery, HomeAssistantNotifier, NotificationPayload, NotificationStyle, Notifier,
};
pub use poll::{CycleOutcome, CycleReport, FetchOutcome, PollLoop};
