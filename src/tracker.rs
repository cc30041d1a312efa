//! Tracker service
//!
//! Ties the ledger, the quest store and the level engine together into the
//! operations the product exposes: awarding XP, reading history, quest
//! lifecycle and the progress summary.

use serde::{Deserialize, Serialize};
use std::fs;
use uuid::Uuid;

use crate::config::TrackerConfig;
use crate::error::Result;
use crate::ledger::{Ledger, LedgerEntry, NewLedgerEntry};
use crate::progression::{compute_level, LevelInfo};
use crate::quests::{Quest, QuestCreate, QuestFilter, QuestStore, QuestUpdate};

/// Progress snapshot derived from the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub user_id: Uuid,
    pub total_xp: i64,
    pub level: u64,
    pub xp_into_level: u64,
    pub xp_for_next_level: u64,
    pub rank: String,
}

impl ProgressSummary {
    pub fn level_info(&self) -> LevelInfo {
        LevelInfo {
            level: self.level,
            xp_into_level: self.xp_into_level,
            xp_for_next_level: self.xp_for_next_level,
        }
    }
}

/// Result of completing a quest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReceipt {
    pub ok: bool,
    pub quest_id: Uuid,
    /// XP actually written to the ledger (0 for reward-less quests)
    pub xp_awarded: i64,
}

/// Store health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub ledger_entries: usize,
    pub quests: usize,
}

/// The tracker service
pub struct Tracker {
    config: TrackerConfig,
    ledger: Ledger,
    quests: QuestStore,
}

impl Tracker {
    /// Open the stores under the configured data directory
    pub fn open(config: TrackerConfig) -> Result<Self> {
        let data_dir = config.data_dir();
        fs::create_dir_all(&data_dir)?;
        log::info!("Opening tracker data in {:?}", data_dir);

        let ledger = Ledger::open(config.ledger_path());
        let quests = QuestStore::open(config.quests_path(), config.quest_events_path())?;

        Ok(Self { config, ledger, quests })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn ledger_store(&self) -> &Ledger {
        &self.ledger
    }

    pub fn quest_store(&self) -> &QuestStore {
        &self.quests
    }

    fn user_id(&self) -> Uuid {
        self.config.user_id
    }

    /// Record a manual XP change
    pub fn award_xp(
        &self,
        delta_xp: i64,
        reason: &str,
        ref_type: Option<String>,
        ref_id: Option<String>,
    ) -> Result<LedgerEntry> {
        let mut entry = NewLedgerEntry::new(self.user_id(), delta_xp, reason);
        entry.ref_type = ref_type;
        entry.ref_id = ref_id;
        self.ledger.append(entry)
    }

    /// Most recent ledger entries, newest first
    pub fn ledger(&self, limit: Option<usize>) -> Result<Vec<LedgerEntry>> {
        let limit = limit.unwrap_or(self.config.ledger_page_size);
        self.ledger.recent(self.user_id(), limit)
    }

    /// Current level, progress and rank
    pub fn progress(&self) -> Result<ProgressSummary> {
        let total_xp = self.ledger.total_xp(self.user_id())?;
        let info = compute_level(total_xp, &self.config.curve);
        let rank = self.config.ranks.rank_for_level(info.level).to_string();

        Ok(ProgressSummary {
            user_id: self.user_id(),
            total_xp,
            level: info.level,
            xp_into_level: info.xp_into_level,
            xp_for_next_level: info.xp_for_next_level,
            rank,
        })
    }

    pub fn create_quest(&self, request: QuestCreate) -> Result<Quest> {
        self.quests.create(self.user_id(), request)
    }

    pub fn list_quests(&self, filter: &QuestFilter) -> Vec<Quest> {
        self.quests.list(self.user_id(), filter)
    }

    pub fn update_quest(&self, quest_id: Uuid, update: &QuestUpdate) -> Result<Quest> {
        self.quests.update(self.user_id(), quest_id, update)
    }

    /// Complete a quest and pay out its reward
    pub fn complete_quest(&self, quest_id: Uuid) -> Result<CompletionReceipt> {
        let quest = self.quests.complete(self.user_id(), quest_id)?;

        let mut xp_awarded = 0;
        if quest.xp_reward > 0 {
            let entry = NewLedgerEntry::new(
                self.user_id(),
                quest.xp_reward,
                format!("Quest completed: {}", quest.title),
            )
            .with_ref("quest", quest.id.to_string());
            self.ledger.append(entry)?;
            xp_awarded = quest.xp_reward;
        }

        Ok(CompletionReceipt {
            ok: true,
            quest_id,
            xp_awarded,
        })
    }

    /// Verify both stores can be read
    pub fn health(&self) -> Result<HealthReport> {
        let ledger_entries = self.ledger.read_all()?.len();
        Ok(HealthReport {
            status: "Titan Protocol Online".to_string(),
            ledger_entries,
            quests: self.quests.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quests::QuestType;
    use tempfile::TempDir;

    fn tracker(dir: &TempDir) -> Tracker {
        Tracker::open(TrackerConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_fresh_progress() {
        let dir = TempDir::new().unwrap();
        let progress = tracker(&dir).progress().unwrap();
        assert_eq!(progress.total_xp, 0);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.xp_into_level, 0);
        assert_eq!(progress.xp_for_next_level, 125);
        assert_eq!(progress.rank, "Initiate");
    }

    #[test]
    fn test_award_moves_progress() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker(&dir);
        tracker.award_xp(200, "frontend test", None, None).unwrap();
        let progress = tracker.progress().unwrap();
        assert_eq!(progress.total_xp, 200);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.xp_into_level, 75);
        assert_eq!(progress.xp_for_next_level, 200);
    }

    #[test]
    fn test_complete_quest_awards_reward() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker(&dir);
        let quest = tracker
            .create_quest(QuestCreate::new(QuestType::Main, "Launch").with_reward(150))
            .unwrap();

        let receipt = tracker.complete_quest(quest.id).unwrap();
        assert_eq!(receipt.xp_awarded, 150);

        let ledger = tracker.ledger(None).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].reason, "Quest completed: Launch");
        assert_eq!(ledger[0].ref_type.as_deref(), Some("quest"));
        assert_eq!(ledger[0].ref_id, Some(quest.id.to_string()));
        assert_eq!(tracker.progress().unwrap().total_xp, 150);
    }

    #[test]
    fn test_rewardless_quest_writes_no_ledger_entry() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker(&dir);
        let quest = tracker.create_quest(QuestCreate::new(QuestType::Side, "Tidy desk")).unwrap();
        let receipt = tracker.complete_quest(quest.id).unwrap();
        assert_eq!(receipt.xp_awarded, 0);
        assert!(tracker.ledger(None).unwrap().is_empty());
    }

    #[test]
    fn test_ledger_page_size() {
        let dir = TempDir::new().unwrap();
        let tracker = Tracker::open(TrackerConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ledger_page_size: 2,
            ..Default::default()
        })
        .unwrap();
        for _ in 0..4 {
            tracker.award_xp(10, "tick", None, None).unwrap();
        }
        assert_eq!(tracker.ledger(None).unwrap().len(), 2);
        assert_eq!(tracker.ledger(Some(10)).unwrap().len(), 4);
    }

    #[test]
    fn test_health() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker(&dir);
        tracker.award_xp(5, "ping", None, None).unwrap();
        let health = tracker.health().unwrap();
        assert_eq!(health.ledger_entries, 1);
        assert_eq!(health.quests, 0);
    }
}
