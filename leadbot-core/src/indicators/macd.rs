//! Moving Average Convergence Divergence (MACD).
//!
//! macd_line  = EMA(close, fast) - EMA(close, slow)
//! signal     = EMA(macd_line, signal_span)
//! histogram  = macd_line - signal
//! With first-value-seeded EMAs, all three series are defined from index 0.

use crate::indicators::ema::ema;

/// The three aligned MACD series.
#[derive(Debug, Clone)]
pub struct Macd {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(close: &[f64], fast: usize, slow: usize, signal_span: usize) -> Macd {
    let fast_ema = ema(close, fast);
    let slow_ema = ema(close, slow);
    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema(&macd_line, signal_span);
    let histogram: Vec<f64> = macd_line.iter().zip(&signal).map(|(m, s)| m - s).collect();
    Macd {
        macd: macd_line,
        signal,
        histogram,
    }
}
