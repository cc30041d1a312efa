//! Titan Protocol - gamified quest tracking
//!
//! Complete quests, earn XP, climb levels and ranks. XP lives in an
//! append-only ledger; levels are derived from its sum on demand.

pub mod config;
pub mod error;
pub mod ledger;
pub mod progression;
pub mod quests;
pub mod tracker;
pub mod ui;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use error::{Result, TitanError};
pub use progression::{compute_level, LevelCurve, LevelInfo};
pub use tracker::{CompletionReceipt, HealthReport, ProgressSummary, Tracker};
