//! Experience and leveling
//!
//! Translates a cumulative XP total into a level, the progress made inside
//! that level, and the threshold still to clear. Everything here is pure
//! integer arithmetic; the same total always produces the same result.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TitanError};

/// Default flat XP cost of every level
pub const DEFAULT_BASE: u64 = 100;
/// Default quadratic growth factor
pub const DEFAULT_GROWTH: u64 = 25;

/// XP needed to advance *from* `level` to `level + 1`: `base + growth * level^2`
///
/// Saturates instead of overflowing.
pub fn xp_required_for_level(level: u64, base: u64, growth: u64) -> u64 {
    growth
        .saturating_mul(level.saturating_mul(level))
        .saturating_add(base)
}

/// Tunable difficulty curve
///
/// `base + growth` must be positive, otherwise a level would cost nothing
/// and the level walk would never end. Construction and deserialization both
/// go through [`LevelCurve::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelCurve {
    base: u64,
    growth: u64,
}

impl<'de> Deserialize<'de> for LevelCurve {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct CurveParams {
            base: u64,
            growth: u64,
        }

        let params = CurveParams::deserialize(deserializer)?;
        LevelCurve::new(params.base, params.growth).map_err(serde::de::Error::custom)
    }
}

impl LevelCurve {
    pub fn new(base: u64, growth: u64) -> Result<Self> {
        if base.saturating_add(growth) == 0 {
            return Err(TitanError::InvalidCurve { base, growth });
        }
        Ok(Self { base, growth })
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn growth(&self) -> u64 {
        self.growth
    }

    /// XP needed to go from `level` to `level + 1` on this curve
    pub fn required_for(&self, level: u64) -> u64 {
        xp_required_for_level(level, self.base, self.growth)
    }
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self { base: DEFAULT_BASE, growth: DEFAULT_GROWTH }
    }
}

/// Where a given XP total sits on the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Current level, always >= 1
    pub level: u64,
    /// XP earned inside the current level
    pub xp_into_level: u64,
    /// Requirement of the current level (the threshold not yet cleared)
    pub xp_for_next_level: u64,
}

impl LevelInfo {
    /// XP still missing before the next level
    pub fn xp_to_next_level(&self) -> u64 {
        self.xp_for_next_level - self.xp_into_level
    }
}

/// Compute the level for a cumulative XP total
///
/// Negative totals count as zero. Starting at level 1, each level's
/// requirement is paid out of the total until the remainder no longer
/// covers the next one. The walk takes one step per level gained; flat
/// curves (`growth == 0`) are answered in closed form so a huge total on a
/// cheap curve cannot spin for billions of steps.
pub fn compute_level(total_xp: i64, curve: &LevelCurve) -> LevelInfo {
    let mut remaining = total_xp.max(0) as u64;

    if curve.growth == 0 {
        // base >= 1 here, guaranteed by LevelCurve::new
        return LevelInfo {
            level: 1 + remaining / curve.base,
            xp_into_level: remaining % curve.base,
            xp_for_next_level: curve.base,
        };
    }

    let mut level = 1;
    loop {
        let required = curve.required_for(level);
        if remaining < required {
            break;
        }
        remaining -= required;
        level += 1;
    }

    LevelInfo {
        level,
        xp_into_level: remaining,
        xp_for_next_level: curve.required_for(level),
    }
}

/// [`compute_level`] on the default curve (base 100, growth 25)
pub fn compute_level_default(total_xp: i64) -> LevelInfo {
    compute_level(total_xp, &LevelCurve::default())
}

/// Total XP needed to reach `level` starting from zero
///
/// Inverse of [`compute_level`]: the result lands exactly on the start of
/// `level` with nothing carried into it.
pub fn total_xp_for_level(level: u64, curve: &LevelCurve) -> u64 {
    // sum of requirements for levels 1..level, i.e. n = level - 1 terms
    let n = level.saturating_sub(1) as u128;
    let squares = n.saturating_mul(n + 1).saturating_mul(2 * n + 1) / 6;
    let total = (curve.base as u128)
        .saturating_mul(n)
        .saturating_add((curve.growth as u128).saturating_mul(squares));
    u64::try_from(total).unwrap_or(u64::MAX)
}
