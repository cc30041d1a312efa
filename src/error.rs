//! Error types for Titan Protocol.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TitanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Config serialize error: {0}")]
    RonSerialize(#[from] ron::Error),

    #[error("Invalid level curve: base ({base}) + growth ({growth}) must be positive")]
    InvalidCurve { base: u64, growth: u64 },

    #[error("delta_xp must not be 0")]
    ZeroDelta,

    #[error("due_date must be YYYY-MM-DD (got {0:?})")]
    InvalidDueDate(String),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Quest not found: {0}")]
    QuestNotFound(Uuid),

    #[error("Quest already completed: {0}")]
    QuestAlreadyCompleted(Uuid),

    #[error("Data version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

pub type Result<T> = std::result::Result<T, TitanError>;
