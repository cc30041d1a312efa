//! Append-only XP ledger store
//!
//! One JSON record per line. Records are only ever appended; totals are
//! summed from the file on every read so the log stays the single source
//! of truth.

use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::entry::{sum_deltas, LedgerEntry, NewLedgerEntry};
use crate::error::{Result, TitanError};

/// Default ledger page size
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// File-backed XP ledger
pub struct Ledger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl Ledger {
    /// Open (or lazily create) the ledger at `path`
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry, returning the stored record
    pub fn append(&self, entry: NewLedgerEntry) -> Result<LedgerEntry> {
        if entry.delta_xp == 0 {
            return Err(TitanError::ZeroDelta);
        }

        let record = entry.stamp();
        let line = serde_json::to_string(&record)?;

        let _guard = self.write_lock.lock();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;

        log::info!(
            "Ledger: {:+} XP for {} ({})",
            record.delta_xp, record.user_id, record.reason
        );
        Ok(record)
    }

    /// Read every entry in append order
    pub fn read_all(&self) -> Result<Vec<LedgerEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut entries = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LedgerEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => log::warn!("Skipping malformed ledger line {}: {}", idx + 1, e),
            }
        }

        Ok(entries)
    }

    /// All entries for one user, in append order
    pub fn entries_for(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|e| e.user_id == user_id)
            .collect())
    }

    /// Newest-first history for one user
    pub fn recent(&self, user_id: Uuid, limit: usize) -> Result<Vec<LedgerEntry>> {
        let mut entries = self.entries_for(user_id)?;
        // append order breaks ties between identical timestamps
        entries.reverse();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Total XP for a user: the sum of every delta they own
    pub fn total_xp(&self, user_id: Uuid) -> Result<i64> {
        Ok(sum_deltas(&self.entries_for(user_id)?))
    }
}
