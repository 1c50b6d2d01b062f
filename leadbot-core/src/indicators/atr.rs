//! Average True Range (ATR) and the shared Wilder smoother.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|); the first
//! candle has no previous close, so TR[0] = high - low.
//! ATR is the Wilder-smoothed TR, alpha = 1/period.

use crate::domain::Candle;

/// Compute the True Range series.
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    let n = candles.len();
    let mut tr = vec![f64::NAN; n];
    if n == 0 {
        return tr;
    }

    tr[0] = candles[0].high - candles[0].low;
    for i in 1..n {
        let h = candles[i].high;
        let l = candles[i].low;
        let pc = candles[i - 1].close;
        tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }
    tr
}

/// Wilder smoothing: recursive EMA with alpha = 1/period, seeded from the
/// first non-NaN value, output gated until `period` valid samples have been
/// consumed.
///
/// Interior NaN samples emit NaN at their own index without disturbing the
/// smoother state; leading NaN samples are skipped entirely.
pub fn wilder_ewm(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "Wilder period must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let alpha = 1.0 / period as f64;
    let mut state = f64::NAN;
    let mut count = 0usize;

    for i in 0..n {
        let v = values[i];
        if v.is_nan() {
            continue;
        }
        if count == 0 {
            state = v;
        } else {
            state = alpha * v + (1.0 - alpha) * state;
        }
        count += 1;
        if count >= period {
            result[i] = state;
        }
    }
    result
}

/// ATR: Wilder-smoothed True Range.
pub fn atr(candles: &[Candle], period: usize) -> Vec<f64> {
    wilder_ewm(&true_range(candles), period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_candles, DEFAULT_EPSILON};

    #[test]
    fn true_range_basic() {
        let candles = make_ohlc_candles(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 105-95 = 10
            (102.0, 108.0, 100.0, 106.0), // TR = max(8, |108-102|, |100-102|) = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = max(9, |107-106|, |98-106|) = 9
        ]);
        let tr = true_range(&candles);
        assert_approx(tr[0], 10.0, DEFAULT_EPSILON);
        assert_approx(tr[1], 8.0, DEFAULT_EPSILON);
        assert_approx(tr[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        // Gap up: prev close 100, current candle 110-115-108
        let candles = make_ohlc_candles(&[
            (98.0, 102.0, 97.0, 100.0),
            (110.0, 115.0, 108.0, 112.0), // TR = max(7, |115-100|, |108-100|) = 15
        ]);
        let tr = true_range(&candles);
        assert_approx(tr[1], 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_period_2_known_values() {
        let candles = make_ohlc_candles(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 10
            (102.0, 108.0, 100.0, 106.0), // TR = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = 9
        ]);
        // alpha = 1/2, seed = TR[0] = 10
        // ATR[0] gated (1 < 2 samples)
        // ATR[1] = 0.5*8 + 0.5*10 = 9
        // ATR[2] = 0.5*9 + 0.5*9  = 9
        let result = atr(&candles, 2);
        assert!(result[0].is_nan());
        assert_approx(result[1], 9.0, DEFAULT_EPSILON);
        assert_approx(result[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_skips_leading_nan() {
        let values = [f64::NAN, 4.0, 6.0, 8.0];
        // seed at index 1 = 4; alpha = 1/2
        // index 2: 0.5*6 + 0.5*4 = 5 (count 2 >= 2 -> emitted)
        // index 3: 0.5*8 + 0.5*5 = 6.5
        let result = wilder_ewm(&values, 2);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 5.0, DEFAULT_EPSILON);
        assert_approx(result[3], 6.5, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_interior_nan_keeps_state() {
        let values = [4.0, 6.0, f64::NAN, 8.0];
        let result = wilder_ewm(&values, 2);
        assert_approx(result[1], 5.0, DEFAULT_EPSILON);
        assert!(result[2].is_nan());
        assert_approx(result[3], 6.5, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_insufficient_history_is_nan() {
        let candles = make_ohlc_candles(&[(100.0, 105.0, 95.0, 102.0)]);
        let result = atr(&candles, 14);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
