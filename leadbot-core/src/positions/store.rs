//! Durable position state.
//!
//! The full position set is one JSON object keyed by ticker, rewritten after
//! every open or close. Writes go to a temp file first and are renamed into
//! place, so a crash mid-write leaves the previous state intact.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::Position;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join("positions.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restore the position set. A missing file is an empty set, not an
    /// error.
    pub fn load(&self) -> Result<HashMap<String, Position>, StateError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let text = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Atomically replace the stored set: write `positions.json.tmp`, then
    /// rename over the live file.
    pub fn save(&self, positions: &HashMap<String, Position>) -> Result<(), StateError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(positions)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_position(ticker: &str) -> Position {
        Position {
            ticker: ticker.to_string(),
            entry_price: 1234.5,
            quantity: 8.1,
            entry_time: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
            invested_krw: 9999.45,
            stop_loss_price: 1111.05,
            peak_price: 1300.25,
            trailing_active: true,
            entry_score: 82.0,
            leader_score: 71.5,
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_load_roundtrip_preserves_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());

        let mut positions = HashMap::new();
        positions.insert("KRW-ETH".to_string(), sample_position("KRW-ETH"));
        positions.insert("KRW-SOL".to_string(), sample_position("KRW-SOL"));
        store.save(&positions).unwrap();

        let restored = store.load().unwrap();
        assert_eq!(restored.len(), 2);
        let p = &restored["KRW-ETH"];
        assert_eq!(p.entry_price, 1234.5);
        assert_eq!(p.peak_price, 1300.25);
        assert!(p.trailing_active);
        assert_eq!(p.stop_loss_price, 1111.05);
        assert_eq!(p.entry_time, sample_position("KRW-ETH").entry_time);
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());
        store.save(&HashMap::new()).unwrap();
        assert!(store.path().exists());
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn save_creates_missing_state_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested/state");
        let store = StateStore::new(&nested);
        store.save(&HashMap::new()).unwrap();
        assert!(store.path().exists());
    }
}
