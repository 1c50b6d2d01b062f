//! Relative Strength Index (RSI), Wilder's smoothing variant.
//!
//! Gains and losses are separated from one-bar deltas and each smoothed with
//! alpha = 1/period; RS = avg_gain / avg_loss; RSI = 100 - 100/(1 + RS).
//! Undefined (NaN) until `period` deltas are available, and whenever
//! avg_loss = 0 — a NaN RSI contributes nothing to scoring.

use crate::indicators::atr::wilder_ewm;

pub fn rsi(close: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "RSI period must be >= 1");
    let n = close.len();
    let mut result = vec![f64::NAN; n];
    if n < period + 1 {
        return result;
    }

    let mut gains = vec![f64::NAN; n];
    let mut losses = vec![f64::NAN; n];
    for i in 1..n {
        let change = close[i] - close[i - 1];
        gains[i] = change.max(0.0);
        losses[i] = (-change).max(0.0);
    }

    let avg_gain = wilder_ewm(&gains, period);
    let avg_loss = wilder_ewm(&losses, period);

    for i in 0..n {
        let g = avg_gain[i];
        let l = avg_loss[i];
        if g.is_nan() || l.is_nan() || l == 0.0 {
            continue;
        }
        result[i] = 100.0 - 100.0 / (1.0 + g / l);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rsi_known_values() {
        // Closes: 100, 101, 100, 102, 101; period 2; alpha = 1/2
        // Gains:  _, 1, 0, 2, 0   Losses: _, 0, 1, 0, 1
        // avg_gain: seed 1 -> 0.5 -> 1.25 -> 0.625
        // avg_loss: seed 0 -> 0.5 -> 0.25 -> 0.625
        // RSI[2] = 100 - 100/(1 + 0.5/0.5)   = 50
        // RSI[3] = 100 - 100/(1 + 1.25/0.25) = 100 - 100/6
        // RSI[4] = 100 - 100/(1 + 1)         = 50
        let result = rsi(&[100.0, 101.0, 100.0, 102.0, 101.0], 2);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 50.0, DEFAULT_EPSILON);
        assert_approx(result[3], 100.0 - 100.0 / 6.0, DEFAULT_EPSILON);
        assert_approx(result[4], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_all_gains_is_undefined() {
        // avg_loss stays 0 -> RS undefined -> NaN, not 100
        let result = rsi(&[100.0, 101.0, 102.0, 103.0, 104.0], 2);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let result = rsi(&[104.0, 103.0, 102.0, 101.0, 100.0], 2);
        assert_approx(result[4], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_bounds() {
        let result = rsi(
            &[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0],
            3,
        );
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!(
                    (0.0..=100.0).contains(&v),
                    "RSI out of bounds at index {i}: {v}"
                );
            }
        }
    }

    #[test]
    fn rsi_short_series_all_nan() {
        let result = rsi(&[100.0, 101.0], 14);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
