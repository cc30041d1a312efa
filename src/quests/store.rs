//! Quest persistence
//!
//! Quests are mutable, so unlike the ledger they live in a single versioned
//! JSON document that is rewritten (temp file, then rename) on every change.
//! The file is the source of truth: it is reloaded before every read and
//! every change, so quests written by another process sharing the data
//! directory are picked up instead of overwritten. Lifecycle changes are
//! also appended to the quest event log.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use chrono::Utc;
use uuid::Uuid;

use super::events::{QuestEvent, QuestEventLog, QuestEventType};
use super::quest::{Quest, QuestCreate, QuestFilter, QuestUpdate};
use crate::error::{Result, TitanError};

/// Quest file version for compatibility checking
const QUESTS_VERSION: u32 = 1;

/// On-disk quest document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuestBook {
    version: u32,
    quests: Vec<Quest>,
}

impl Default for QuestBook {
    fn default() -> Self {
        Self {
            version: QUESTS_VERSION,
            quests: Vec::new(),
        }
    }
}

impl QuestBook {
    fn find_mut(&mut self, user_id: Uuid, quest_id: Uuid) -> Result<&mut Quest> {
        self.quests
            .iter_mut()
            .find(|q| q.id == quest_id && q.user_id == user_id)
            .ok_or(TitanError::QuestNotFound(quest_id))
    }
}

/// File-backed quest store
pub struct QuestStore {
    path: PathBuf,
    /// Last successfully loaded or written document
    book: RwLock<QuestBook>,
    events: QuestEventLog,
}

impl QuestStore {
    /// Load quests from `path`, starting empty if the file does not exist
    pub fn open(path: impl AsRef<Path>, events_path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let book = load_book(&path)?;
        log::info!("Loaded {} quests from {:?}", book.quests.len(), path);

        Ok(Self {
            path,
            book: RwLock::new(book),
            events: QuestEventLog::open(events_path),
        })
    }

    pub fn events(&self) -> &QuestEventLog {
        &self.events
    }

    /// Number of stored quests across all users
    pub fn len(&self) -> usize {
        self.sync();
        self.book.read().quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a quest for `user_id`
    pub fn create(&self, user_id: Uuid, request: QuestCreate) -> Result<Quest> {
        let quest = request.into_quest(user_id)?;

        self.modify(|book| {
            book.quests.push(quest.clone());
            Ok(())
        })?;

        self.record(QuestEvent::new(
            user_id,
            quest.id,
            QuestEventType::Created,
            json!({ "type": quest.quest_type, "xp_reward": quest.xp_reward }),
        ));

        log::info!("Quest created: {} ({})", quest.title, quest.id);
        Ok(quest)
    }

    /// Quests owned by `user_id` that pass `filter`, newest first
    pub fn list(&self, user_id: Uuid, filter: &QuestFilter) -> Vec<Quest> {
        self.sync();
        let book = self.book.read();
        let mut quests: Vec<Quest> = book
            .quests
            .iter()
            .filter(|q| q.user_id == user_id && filter.matches(q))
            .cloned()
            .collect();
        quests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        quests
    }

    pub fn get(&self, user_id: Uuid, quest_id: Uuid) -> Option<Quest> {
        self.sync();
        self.book
            .read()
            .quests
            .iter()
            .find(|q| q.id == quest_id && q.user_id == user_id)
            .cloned()
    }

    /// Apply a partial update
    pub fn update(&self, user_id: Uuid, quest_id: Uuid, update: &QuestUpdate) -> Result<Quest> {
        if update.is_empty() {
            return Err(TitanError::NoFieldsToUpdate);
        }

        let (quest, changed) = self.modify(|book| {
            let quest = book.find_mut(user_id, quest_id)?;
            let changed = update.apply(quest)?;
            Ok((quest.clone(), changed))
        })?;

        self.record(QuestEvent::new(
            user_id,
            quest_id,
            QuestEventType::Updated,
            json!({ "changed": changed }),
        ));

        Ok(quest)
    }

    /// Mark a quest completed; fails if it is unknown or already done
    pub fn complete(&self, user_id: Uuid, quest_id: Uuid) -> Result<Quest> {
        let quest = self.modify(|book| {
            let quest = book.find_mut(user_id, quest_id)?;
            if quest.is_completed {
                return Err(TitanError::QuestAlreadyCompleted(quest_id));
            }
            quest.is_completed = true;
            quest.completed_at = Some(Utc::now());
            Ok(quest.clone())
        })?;

        self.record(QuestEvent::new(
            user_id,
            quest_id,
            QuestEventType::Completed,
            json!({}),
        ));

        log::info!("Quest completed: {} ({})", quest.title, quest.id);
        Ok(quest)
    }

    /// Append to the event log once a change is already on disk
    fn record(&self, event: QuestEvent) {
        if let Err(e) = self.events.append(&event) {
            log::warn!("Could not log {:?} event for quest {}: {}", event.event_type, event.quest_id, e);
        }
    }

    /// Refresh the cached document from disk, keeping the cache on failure
    fn sync(&self) {
        match load_book(&self.path) {
            Ok(book) => *self.book.write() = book,
            Err(e) => log::warn!("Could not reload quests from {:?}: {}", self.path, e),
        }
    }

    /// Run `change` against a fresh copy of the document and write it back.
    /// The cache is only replaced once the write has succeeded.
    fn modify<T>(&self, change: impl FnOnce(&mut QuestBook) -> Result<T>) -> Result<T> {
        let mut cached = self.book.write();
        let mut book = load_book(&self.path)?;
        let out = change(&mut book)?;
        self.persist(&book)?;
        *cached = book;
        Ok(out)
    }

    /// Write the document atomically
    fn persist(&self, book: &QuestBook) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(book)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

/// Read the quest document, or an empty one if the file does not exist yet
fn load_book(path: &Path) -> Result<QuestBook> {
    if !path.exists() {
        return Ok(QuestBook::default());
    }
    let data = fs::read_to_string(path)?;
    let book: QuestBook = serde_json::from_str(&data)?;
    if book.version != QUESTS_VERSION {
        return Err(TitanError::VersionMismatch {
            expected: QUESTS_VERSION,
            found: book.version,
        });
    }
    Ok(book)
}
