//! Candle — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle for a single market at a fixed interval.
///
/// Series are ordered ascending by timestamp. Volume is in base currency;
/// prices are in the quote currency (KRW).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Close above open.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Basic OHLC sanity check: high >= low, prices positive, nothing NaN.
    pub fn is_sane(&self) -> bool {
        !(self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan())
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Extract the close series from a candle slice.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Extract the volume series from a candle slice.
pub fn volumes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.volume).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_candle() -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle().is_sane());
    }

    #[test]
    fn candle_detects_insane_high_low() {
        let mut c = sample_candle();
        c.high = 97.0; // below low
        assert!(!c.is_sane());
    }

    #[test]
    fn candle_bullish() {
        assert!(sample_candle().is_bullish());
        let mut c = sample_candle();
        c.close = 99.0;
        assert!(!c.is_bullish());
    }

    #[test]
    fn candle_serialization_roundtrip() {
        let c = sample_candle();
        let json = serde_json::to_string(&c).unwrap();
        let deser: Candle = serde_json::from_str(&json).unwrap();
        assert_eq!(c.timestamp, deser.timestamp);
        assert_eq!(c.close, deser.close);
        assert_eq!(c.volume, deser.volume);
    }
}
