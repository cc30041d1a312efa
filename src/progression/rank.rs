//! Ranks
//!
//! Cosmetic titles unlocked at level thresholds.

use serde::{Deserialize, Serialize};

/// Title shown when no threshold has been reached
pub const UNRANKED: &str = "Unranked";

/// A named rank and the level at which it unlocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rank {
    pub name: String,
    pub min_level: u64,
}

impl Rank {
    pub fn new(name: impl Into<String>, min_level: u64) -> Self {
        Self { name: name.into(), min_level }
    }
}

/// Threshold table mapping levels to rank names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankTable {
    ranks: Vec<Rank>,
}

impl RankTable {
    /// Build a table; entries may be given in any order
    pub fn new(ranks: Vec<Rank>) -> Self {
        Self { ranks }
    }

    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    /// Rank with the highest threshold not above `level`
    pub fn rank_for_level(&self, level: u64) -> &str {
        self.ranks
            .iter()
            .filter(|r| r.min_level <= level)
            .max_by_key(|r| r.min_level)
            .map(|r| r.name.as_str())
            .unwrap_or(UNRANKED)
    }

    /// The next rank to unlock above `level`, if any
    pub fn next_rank(&self, level: u64) -> Option<&Rank> {
        self.ranks
            .iter()
            .filter(|r| r.min_level > level)
            .min_by_key(|r| r.min_level)
    }
}

impl Default for RankTable {
    fn default() -> Self {
        Self::new(vec![
            Rank::new("Initiate", 1),
            Rank::new("Operative", 5),
            Rank::new("Vanguard", 10),
            Rank::new("Sentinel", 20),
            Rank::new("Titan", 35),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_for_level() {
        let table = RankTable::default();
        assert_eq!(table.rank_for_level(1), "Initiate");
        assert_eq!(table.rank_for_level(4), "Initiate");
        assert_eq!(table.rank_for_level(5), "Operative");
        assert_eq!(table.rank_for_level(34), "Sentinel");
        assert_eq!(table.rank_for_level(500), "Titan");
    }

    #[test]
    fn test_unranked_below_first_threshold() {
        let table = RankTable::new(vec![Rank::new("Bronze", 3)]);
        assert_eq!(table.rank_for_level(1), UNRANKED);
        assert_eq!(table.rank_for_level(3), "Bronze");
        assert_eq!(RankTable::new(Vec::new()).rank_for_level(99), UNRANKED);
    }

    #[test]
    fn test_unsorted_table() {
        let table = RankTable::new(vec![
            Rank::new("Gold", 10),
            Rank::new("Bronze", 1),
            Rank::new("Silver", 5),
        ]);
        assert_eq!(table.rank_for_level(7), "Silver");
        assert_eq!(table.next_rank(7).map(|r| r.name.as_str()), Some("Gold"));
        assert!(table.next_rank(10).is_none());
    }
}
