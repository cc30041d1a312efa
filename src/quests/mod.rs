//! Quests
//!
//! User-defined tasks that pay out XP when completed.

pub mod quest;
pub mod events;
pub mod store;

pub use quest::{Quest, QuestCreate, QuestFilter, QuestType, QuestUpdate, parse_due_date};
pub use events::{QuestEvent, QuestEventLog, QuestEventType};
pub use store::QuestStore;
