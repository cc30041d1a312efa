//! Quest audit trail
//!
//! Append-only JSONL log of quest lifecycle events.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestEventType {
    Created,
    Updated,
    Completed,
}

/// Single quest event record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quest_id: Uuid,
    pub event_type: QuestEventType,
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl QuestEvent {
    pub fn new(user_id: Uuid, quest_id: Uuid, event_type: QuestEventType, meta: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            quest_id,
            event_type,
            meta,
            created_at: Utc::now(),
        }
    }
}

/// Event log store
pub struct QuestEventLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl QuestEventLog {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Append an event record
    pub fn append(&self, event: &QuestEvent) -> Result<()> {
        let line = serde_json::to_string(event)?;

        let _guard = self.write_lock.lock();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    /// Read all events
    pub fn read_all(&self) -> Result<Vec<QuestEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<QuestEvent>(&line) {
                Ok(event) => events.push(event),
                Err(e) => log::warn!("Skipping malformed quest event: {}", e),
            }
        }
        Ok(events)
    }

    /// Events for one quest, oldest first
    pub fn for_quest(&self, quest_id: Uuid) -> Result<Vec<QuestEvent>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|e| e.quest_id == quest_id)
            .collect())
    }
}
