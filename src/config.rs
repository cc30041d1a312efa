//! Tracker configuration
//!
//! Loaded from a RON file, falling back to built-in defaults when the file
//! is missing. Example:
//!
//! ```ron
//! (
//!     user_id: "00000000-0000-0000-0000-000000000000",
//!     curve: (base: 100, growth: 25),
//!     ranks: [(name: "Initiate", min_level: 1), (name: "Titan", min_level: 35)],
//!     ledger_page_size: 20,
//! )
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::Result;
use crate::ledger::DEFAULT_PAGE_SIZE;
use crate::progression::{LevelCurve, RankTable};

/// Config file name inside the platform config directory
pub const CONFIG_FILE: &str = "titan.ron";

/// Everything the tracker needs to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Owner of all quests and ledger entries (single-user mode)
    pub user_id: Uuid,
    /// Difficulty curve for the level engine
    pub curve: LevelCurve,
    /// Level thresholds for rank titles
    pub ranks: RankTable,
    /// Where stores live; platform data dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Entries returned by a ledger read
    pub ledger_page_size: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            user_id: Uuid::nil(),
            curve: LevelCurve::default(),
            ranks: RankTable::default(),
            data_dir: None,
            ledger_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TrackerConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: TrackerConfig = ron::from_str(&content)?;
        log::info!("Config loaded from {:?}", path);
        Ok(config)
    }

    /// Load from the platform config directory
    pub fn load_default() -> Result<Self> {
        Self::load(&default_config_path())
    }

    /// Write this config as pretty RON, creating parent directories
    pub fn export(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let ron = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, ron)?;
        log::info!("Config written to {:?}", path);
        Ok(())
    }

    /// Resolved data directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir().join("xp_ledger.jsonl")
    }

    pub fn quests_path(&self) -> PathBuf {
        self.data_dir().join("quests.json")
    }

    pub fn quest_events_path(&self) -> PathBuf {
        self.data_dir().join("quest_events.jsonl")
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "titan-protocol", "Titan Protocol")
}

/// Platform config file location
pub fn default_config_path() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        proj_dirs.config_dir().join(CONFIG_FILE)
    } else {
        PathBuf::from(".").join(CONFIG_FILE)
    }
}

/// Platform data directory
pub fn default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        // Fallback to current directory
        PathBuf::from("./titan-data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::Rank;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = TrackerConfig::load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.curve.base(), 100);
        assert_eq!(config.curve.growth(), 25);
        assert_eq!(config.ledger_page_size, 20);
    }

    #[test]
    fn test_export_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = TrackerConfig {
            user_id: Uuid::new_v4(),
            curve: LevelCurve::new(50, 10).unwrap(),
            ranks: RankTable::new(vec![Rank::new("Rookie", 1)]),
            data_dir: Some(dir.path().join("data")),
            ledger_page_size: 5,
        };
        config.export(&path).unwrap();
        assert_eq!(TrackerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "(curve: (base: 10, growth: 1))").unwrap();
        let config = TrackerConfig::load(&path).unwrap();
        assert_eq!(config.curve, LevelCurve::new(10, 1).unwrap());
        assert_eq!(config.ranks, RankTable::default());
        assert_eq!(config.user_id, Uuid::nil());
    }

    #[test]
    fn test_invalid_curve_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "(curve: (base: 0, growth: 0))").unwrap();
        assert!(TrackerConfig::load(&path).is_err());
    }

    #[test]
    fn test_store_paths_follow_data_dir() {
        let config = TrackerConfig {
            data_dir: Some(PathBuf::from("/tmp/titan")),
            ..Default::default()
        };
        assert_eq!(config.ledger_path(), PathBuf::from("/tmp/titan/xp_ledger.jsonl"));
        assert_eq!(config.quests_path(), PathBuf::from("/tmp/titan/quests.json"));
    }
}
