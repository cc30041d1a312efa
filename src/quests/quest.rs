//! Quest definitions and change requests

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Result, TitanError};

/// Quest categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestType {
    Main,
    Side,
    Daily,
}

impl QuestType {
    pub fn name(&self) -> &'static str {
        match self {
            QuestType::Main => "main",
            QuestType::Side => "side",
            QuestType::Daily => "daily",
        }
    }
}

impl fmt::Display for QuestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for QuestType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" => Ok(QuestType::Main),
            "side" => Ok(QuestType::Side),
            "daily" => Ok(QuestType::Daily),
            other => Err(format!("unknown quest type {:?} (expected main, side or daily)", other)),
        }
    }
}

/// A tracked quest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub quest_type: QuestType,
    pub title: String,
    pub description: Option<String>,
    pub xp_reward: i64,
    pub due_date: Option<NaiveDate>,
    pub is_active: bool,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request to create a quest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestCreate {
    pub quest_type: QuestType,
    pub title: String,
    pub description: Option<String>,
    pub xp_reward: i64,
    /// "YYYY-MM-DD"
    pub due_date: Option<String>,
}

impl QuestCreate {
    pub fn new(quest_type: QuestType, title: impl Into<String>) -> Self {
        Self {
            quest_type,
            title: title.into(),
            description: None,
            xp_reward: 0,
            due_date: None,
        }
    }

    pub fn with_reward(mut self, xp_reward: i64) -> Self {
        self.xp_reward = xp_reward;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Validate and turn into a stored quest owned by `user_id`
    pub(crate) fn into_quest(self, user_id: Uuid) -> Result<Quest> {
        let due_date = self.due_date.as_deref().map(parse_due_date).transpose()?;
        Ok(Quest {
            id: Uuid::new_v4(),
            user_id,
            quest_type: self.quest_type,
            title: self.title,
            description: self.description,
            xp_reward: self.xp_reward,
            due_date,
            is_active: true,
            is_completed: false,
            completed_at: None,
            created_at: Utc::now(),
        })
    }
}

/// Partial update; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub xp_reward: Option<i64>,
    /// `Some(None)` clears the due date
    pub due_date: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl QuestUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.xp_reward.is_none()
            && self.due_date.is_none()
            && self.is_active.is_none()
    }

    /// Apply to `quest`, returning the changed fields as a JSON object
    ///
    /// Validates everything before touching the quest, so a bad due date
    /// leaves it unchanged.
    pub(crate) fn apply(&self, quest: &mut Quest) -> Result<serde_json::Map<String, serde_json::Value>> {
        use serde_json::Value;

        if self.is_empty() {
            return Err(TitanError::NoFieldsToUpdate);
        }
        let due_date = match &self.due_date {
            Some(Some(raw)) => Some(Some(parse_due_date(raw)?)),
            Some(None) => Some(None),
            None => None,
        };

        let mut changed = serde_json::Map::new();
        if let Some(title) = &self.title {
            quest.title = title.clone();
            changed.insert("title".into(), Value::from(title.as_str()));
        }
        if let Some(description) = &self.description {
            quest.description = Some(description.clone());
            changed.insert("description".into(), Value::from(description.as_str()));
        }
        if let Some(xp_reward) = self.xp_reward {
            quest.xp_reward = xp_reward;
            changed.insert("xp_reward".into(), Value::from(xp_reward));
        }
        if let Some(due_date) = due_date {
            quest.due_date = due_date;
            let value = due_date.map(|d| Value::from(d.to_string())).unwrap_or(Value::Null);
            changed.insert("due_date".into(), value);
        }
        if let Some(is_active) = self.is_active {
            quest.is_active = is_active;
            changed.insert("is_active".into(), Value::from(is_active));
        }
        Ok(changed)
    }
}

/// Which quests to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestFilter {
    pub quest_type: Option<QuestType>,
    pub active_only: bool,
    pub completed: Option<bool>,
}

impl Default for QuestFilter {
    fn default() -> Self {
        Self {
            quest_type: None,
            active_only: true,
            completed: None,
        }
    }
}

impl QuestFilter {
    pub fn matches(&self, quest: &Quest) -> bool {
        if let Some(quest_type) = self.quest_type {
            if quest.quest_type != quest_type {
                return false;
            }
        }
        if self.active_only && !quest.is_active {
            return false;
        }
        if let Some(completed) = self.completed {
            if quest.is_completed != completed {
                return false;
            }
        }
        true
    }
}

/// Parse a "YYYY-MM-DD" due date
pub fn parse_due_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| TitanError::InvalidDueDate(raw.to_string()))
}
