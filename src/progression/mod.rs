//! Progression systems

pub mod level;
pub mod rank;

pub use level::{
    LevelCurve, LevelInfo, DEFAULT_BASE, DEFAULT_GROWTH,
    compute_level, compute_level_default, total_xp_for_level, xp_required_for_level,
};
pub use rank::{Rank, RankTable, UNRANKED};
