//! Closed-trade history, appended as CSV.
//!
//! One row per closed position. Best-effort: an append failure is logged by
//! the caller and never blocks the exit path.

use std::path::{Path, PathBuf};

use super::store::StateError;
use crate::domain::TradeSummary;

#[derive(Debug)]
pub struct TradeLog {
    path: PathBuf,
}

impl TradeLog {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join("trades.csv"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one closed trade; writes the header when creating the file.
    pub fn append(&self, summary: &TradeSummary) -> Result<(), StateError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let write_header = std::fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        writer
            .serialize(summary)
            .map_err(|e| StateError::Io(std::io::Error::other(e)))?;
        writer
            .flush()
            .map_err(StateError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExitReason;

    fn summary(ticker: &str) -> TradeSummary {
        TradeSummary {
            ticker: ticker.to_string(),
            entry_price: 100.0,
            exit_price: 89.0,
            pnl_rate: -0.11,
            pnl_krw: -1100.0,
            invested_krw: 10_000.0,
            peak_price: 104.0,
            hold_hours: 6.5,
            reason: ExitReason::StopLoss,
        }
    }

    #[test]
    fn appends_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = TradeLog::new(dir.path());
        log.append(&summary("KRW-ETH")).unwrap();
        log.append(&summary("KRW-SOL")).unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ticker,"));
        assert!(lines[1].contains("KRW-ETH"));
        assert!(lines[2].contains("KRW-SOL"));
        assert!(lines[1].contains("stop-loss"));
    }
}
