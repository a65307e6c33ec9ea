//! Seen-item ledger.
//!
//! Records which inbox items have already triggered a notification so each
//! one is only sent once, across restarts.

mod model;
mod store;

pub use model::ItemKind;
pub use store::SeenLedger;
