//! The poll loop.
//!
//! Each cycle fetches the unread items, skips the ones already in the
//! ledger, notifies the rest and records each delivered item before moving
//! on. A crash between a send and the next persist can therefore re-send at
//! most one notification, never lose track of one.

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::PollConfig;
use crate::inbox::{InboxItem, InboxSource};
use crate::ledger::SeenLedger;
use crate::notify::{Delivery, NotificationPayload, Notifier};
use crate::{Error, Result};

/// Result of one fetch attempt that did not fail fatally.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The source returned its unread items.
    Items(Vec<InboxItem>),
    /// The session was rejected; a retry with a fresh login may succeed.
    AuthExpired(Error),
}

/// Counters for one processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Items returned by the source.
    pub fetched: usize,
    /// Notifications delivered and recorded.
    pub notified: usize,
    /// Items skipped because they were already in the ledger.
    pub skipped: usize,
    /// Deliveries that failed; these items stay unseen.
    pub failed: usize,
}

/// How a cycle ended, short of a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Items were fetched and processed.
    Completed(CycleReport),
    /// Every attempt failed authentication; nothing was processed.
    AuthRetryExhausted {
        /// Attempts made.
        attempts: u32,
    },
}

/// Polls an inbox source and forwards new items to a notifier.
#[derive(Debug)]
pub struct PollLoop<S, N> {
    config: PollConfig,
    source: S,
    notifier: N,
    ledger: SeenLedger,
}

impl<S: InboxSource, N: Notifier> PollLoop<S, N> {
    /// Creates a poll loop.
    #[must_use]
    pub const fn new(config: PollConfig, source: S, notifier: N, ledger: SeenLedger) -> Self {
        Self {
            config,
            source,
            notifier,
            ledger,
        }
    }

    /// The ledger as currently held in memory.
    #[must_use]
    pub const fn ledger(&self) -> &SeenLedger {
        &self.ledger
    }

    /// The inbox source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// The notifier.
    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Runs cycles forever, sleeping the refresh interval between them.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: an unknown item kind, a failed ledger
    /// persist, or a non-auth failure from the source.
    pub async fn run(&mut self) -> Result<()> {
        match self.source.identity().await {
            Ok(name) => info!("Reddit user: {name}"),
            Err(e) if e.is_auth_failure() => warn!("Could not resolve account name: {e}"),
            Err(e) => return Err(e),
        }

        loop {
            match self.run_cycle().await? {
                CycleOutcome::Completed(report) => info!(
                    fetched = report.fetched,
                    notified = report.notified,
                    skipped = report.skipped,
                    failed = report.failed,
                    "Cycle complete"
                ),
                CycleOutcome::AuthRetryExhausted { attempts } => {
                    warn!(attempts, "Giving up on this cycle after repeated auth failures");
                }
            }

            debug!(
                "Sleeping {}s until next check",
                self.config.refresh_interval.as_secs()
            );
            sleep(self.config.refresh_interval).await;
        }
    }

    /// Runs one fetch-and-process cycle, retrying on auth failures.
    ///
    /// Before each retry the source session is dropped so the next attempt
    /// logs in again. Reprocessing after a partial attempt is safe: items
    /// recorded in the ledger are skipped.
    ///
    /// # Errors
    ///
    /// Returns fatal errors from fetching or processing.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let retry = self.config.retry;
        let max_attempts = retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            info!("Checking inbox for unread notifications...");
            match self.fetch().await? {
                FetchOutcome::Items(items) => {
                    let report = self.process(&items).await?;
                    return Ok(CycleOutcome::Completed(report));
                }
                FetchOutcome::AuthExpired(e) => {
                    warn!(attempt, max_attempts, "Authentication failed: {e}");
                    self.source.reset_session();
                    if attempt < max_attempts {
                        sleep(retry.backoff).await;
                    }
                }
            }
        }

        Ok(CycleOutcome::AuthRetryExhausted {
            attempts: max_attempts,
        })
    }

    /// Fetches unread items, separating retryable auth failures from fatal
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns source errors that are not auth failures.
    pub async fn fetch(&mut self) -> Result<FetchOutcome> {
        match self.source.unread().await {
            Ok(items) => Ok(FetchOutcome::Items(items)),
            Err(e) if e.is_auth_failure() => Ok(FetchOutcome::AuthExpired(e)),
            Err(e) => Err(e),
        }
    }

    /// Notifies every item not yet in the ledger, in order.
    ///
    /// A delivered item is recorded and the ledger persisted before the next
    /// item is looked at. A failed delivery is logged and the item left
    /// unseen so the next cycle tries again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownItemKind`] when an item has an unsupported
    /// kind, and ledger errors when persisting fails. Items before the
    /// failing one have already been handled.
    pub async fn process(&mut self, items: &[InboxItem]) -> Result<CycleReport> {
        let mut report = CycleReport {
            fetched: items.len(),
            ..CycleReport::default()
        };

        for item in items {
            let kind = item.kind()?;

            if self.ledger.is_seen(kind, &item.id) {
                info!(
                    "Unread {kind} in inbox, but notification was already sent. Skipping item id {}",
                    item.id
                );
                report.skipped += 1;
                continue;
            }

            info!("Unread {kind} in inbox, sending notification for item id {}", item.id);
            let payload = NotificationPayload::from_item(item, kind, &self.config.style);

            match self.notifier.send(&payload).await {
                Ok(Delivery::Delivered) => {
                    self.ledger.mark_seen(kind, &item.id);
                    self.ledger.persist().await?;
                    report.notified += 1;
                }
                Ok(Delivery::Rejected { status, reason }) => {
                    warn!(status, "Hub rejected notification for {kind} {}: {reason}", item.id);
                    report.failed += 1;
                }
                Err(e) => {
                    warn!("Failed to send notification for {kind} {}: {e}", item.id);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}
