//! Ledger records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable XP ledger record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Signed XP change, never zero
    pub delta_xp: i64,
    pub reason: String,
    /// Kind of entity that caused the award (e.g. "quest")
    #[serde(default)]
    pub ref_type: Option<String>,
    #[serde(default)]
    pub ref_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An entry waiting to be appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    pub user_id: Uuid,
    pub delta_xp: i64,
    pub reason: String,
    pub ref_type: Option<String>,
    pub ref_id: Option<String>,
}

impl NewLedgerEntry {
    pub fn new(user_id: Uuid, delta_xp: i64, reason: impl Into<String>) -> Self {
        Self {
            user_id,
            delta_xp,
            reason: reason.into(),
            ref_type: None,
            ref_id: None,
        }
    }

    /// Point the entry at the entity that caused it
    pub fn with_ref(mut self, ref_type: impl Into<String>, ref_id: impl Into<String>) -> Self {
        self.ref_type = Some(ref_type.into());
        self.ref_id = Some(ref_id.into());
        self
    }

    /// Stamp the entry with an id and creation time
    pub(crate) fn stamp(self) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            delta_xp: self.delta_xp,
            reason: self.reason,
            ref_type: self.ref_type,
            ref_id: self.ref_id,
            created_at: Utc::now(),
        }
    }
}

/// Sum of deltas, saturating at the i64 bounds
pub fn sum_deltas<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> i64 {
    entries
        .into_iter()
        .fold(0i64, |acc, e| acc.saturating_add(e.delta_xp))
}
