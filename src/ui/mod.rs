//! User Interface module
//!
//! Terminal dashboard using ratatui.

pub mod app;

pub use app::{Dashboard, MANUAL_AWARD_XP, progress_ratio};
