//! Entry scoring: turns one candidate's OHLCV series into a bounded
//! composite score plus fixed-field signal flags.
//!
//! Score distribution (each sub-score independently capped):
//!   EMA alignment (fast>mid>slow): 25
//!   MACD histogram turning positive: 20
//!   RSI in the entry band: 15
//!   ADX trend strength: 15
//!   Close above the Bollinger mid band: 10
//!   Volume surge (>= surge ratio x 20-bar average): 10
//!   Bullish candle: 5

mod score;

pub use score::{compute_entry_score, should_enter};

use serde::Serialize;

/// Indicator snapshot for one evaluation. Recomputed every cycle; NaN means
/// the indicator is undefined for the available history.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSet {
    pub ema_fast: f64,
    pub ema_mid: f64,
    pub ema_slow: f64,
    pub macd_hist: f64,
    pub rsi: f64,
    pub adx: f64,
    pub atr: f64,
    pub bb_mid: f64,
    pub volume_ratio: f64,
    pub current_price: f64,
}

/// Boolean signal flags, one per scoring category.
///
/// These drive nothing but logging and the returned evaluation; control flow
/// runs on the numeric score alone.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EntrySignals {
    pub ema_aligned: bool,
    pub macd_bullish: bool,
    pub rsi_ok: bool,
    pub adx_trending: bool,
    pub above_bb_mid: bool,
    pub volume_confirmed: bool,
    pub bullish_candle: bool,
}

impl EntrySignals {
    /// Compact label string of the active signals, for log lines.
    pub fn active_labels(&self) -> String {
        let labels = [
            (self.ema_aligned, "EMA"),
            (self.macd_bullish, "MACD"),
            (self.rsi_ok, "RSI"),
            (self.adx_trending, "ADX"),
            (self.above_bb_mid, "BB"),
            (self.volume_confirmed, "VOL"),
            (self.bullish_candle, "BULL"),
        ];
        labels
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of scoring one candidate.
#[derive(Debug, Clone, Serialize)]
pub struct EntryEvaluation {
    /// 0..=100.
    pub score: u32,
    pub entry_recommended: bool,
    pub signals: EntrySignals,
    pub indicators: IndicatorSet,
}

/// Final entry decision combining the leader score with the entry score.
#[derive(Debug, Clone, Serialize)]
pub struct EntryDecision {
    pub enter: bool,
    pub ticker: String,
    pub entry_score: u32,
    pub leader_score: f64,
    /// leader_score * 0.4 + entry_score * 0.6.
    pub combined_confidence: f64,
    pub entry_price: f64,
    /// Advisory only; the authoritative stop is fixed at position open.
    pub stop_loss_price: f64,
    pub evaluation: EntryEvaluation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_labels_joins_set_flags() {
        let signals = EntrySignals {
            ema_aligned: true,
            rsi_ok: true,
            bullish_candle: true,
            ..EntrySignals::default()
        };
        assert_eq!(signals.active_labels(), "EMA RSI BULL");
    }

    #[test]
    fn active_labels_empty_when_none() {
        assert_eq!(EntrySignals::default().active_labels(), "");
    }
}
