//! Bollinger Bands.
//!
//! mid = SMA(period); bands = mid +/- mult * rolling sample stddev.
//! All three series are NaN until the window fills.

use crate::indicators::sma::{rolling_std, sma};

/// Upper / mid / lower band series.
#[derive(Debug, Clone)]
pub struct Bollinger {
    pub upper: Vec<f64>,
    pub mid: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn bollinger(close: &[f64], period: usize, mult: f64) -> Bollinger {
    let mid = sma(close, period);
    let std = rolling_std(close, period);
    let upper: Vec<f64> = mid
        .iter()
        .zip(&std)
        .map(|(m, s)| m + mult * s)
        .collect();
    let lower: Vec<f64> = mid
        .iter()
        .zip(&std)
        .map(|(m, s)| m - mult * s)
        .collect();
    Bollinger { upper, mid, lower }
}
