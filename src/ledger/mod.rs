//! XP ledger
//!
//! Append-only log of XP deltas; the sum of a user's deltas is their total XP.

pub mod entry;
pub mod store;

pub use entry::{LedgerEntry, NewLedgerEntry, sum_deltas};
pub use store::{Ledger, DEFAULT_PAGE_SIZE};
