//! ADX — Average Directional Index (Wilder).
//!
//! 1. +DM / -DM from successive high/low deltas, each zeroed when not dominant
//! 2. TR, +DM, -DM smoothed with alpha = 1/period
//! 3. +DI = 100 * sm(+DM) / sm(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI), NaN when the sum is zero
//! 5. ADX = Wilder-smoothed DX

use crate::domain::Candle;
use crate::indicators::atr::{true_range, wilder_ewm};

pub fn adx(candles: &[Candle], period: usize) -> Vec<f64> {
    assert!(period >= 1, "ADX period must be >= 1");
    let n = candles.len();
    if n < 2 {
        return vec![f64::NAN; n];
    }

    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];
    for i in 1..n {
        let up = candles[i].high - candles[i - 1].high;
        let down = candles[i - 1].low - candles[i].low;
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    let smooth_tr = wilder_ewm(&true_range(candles), period);
    let smooth_plus = wilder_ewm(&plus_dm, period);
    let smooth_minus = wilder_ewm(&minus_dm, period);

    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        let tr = smooth_tr[i];
        let p = smooth_plus[i];
        let m = smooth_minus[i];
        if tr.is_nan() || p.is_nan() || m.is_nan() || tr == 0.0 {
            continue;
        }
        let plus_di = 100.0 * p / tr;
        let minus_di = 100.0 * m / tr;
        let di_sum = plus_di + minus_di;
        if di_sum == 0.0 {
            continue;
        }
        dx[i] = 100.0 * (plus_di - minus_di).abs() / di_sum;
    }

    wilder_ewm(&dx, period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_candles;

    #[test]
    fn adx_bounds() {
        let candles = make_ohlc_candles(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 110.0),
            (110.0, 111.0, 104.0, 105.0),
            (105.0, 109.0, 103.0, 107.0),
            (107.0, 113.0, 105.0, 112.0),
        ]);
        let result = adx(&candles, 3);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "ADX out of bounds at {i}: {v}");
            }
        }
    }

    #[test]
    fn adx_elevated_in_strong_trend() {
        let mut data = Vec::new();
        for i in 0..20 {
            let base = 100.0 + i as f64 * 5.0;
            data.push((base - 1.0, base + 3.0, base - 3.0, base + 2.0));
        }
        let candles = make_ohlc_candles(&data);
        let result = adx(&candles, 5);
        let last = result.iter().rev().find(|v| !v.is_nan());
        assert!(last.is_some());
        if let Some(&v) = last {
            assert!(v > 50.0, "ADX should be high in a one-way trend, got {v}");
        }
    }

    #[test]
    fn adx_too_few_candles() {
        let candles = make_ohlc_candles(&[(100.0, 105.0, 95.0, 102.0)]);
        let result = adx(&candles, 3);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn adx_defined_after_two_periods() {
        let mut data = Vec::new();
        for i in 0..12 {
            let base = 100.0 + (i % 4) as f64 * 2.0 + i as f64;
            data.push((base - 1.0, base + 2.0, base - 2.0, base + 1.0));
        }
        let candles = make_ohlc_candles(&data);
        let result = adx(&candles, 3);
        // DM series start at index 1, each smoother needs `period` samples:
        // DX first defined near index 3, ADX three samples later.
        assert!(result.iter().any(|v| !v.is_nan()));
    }
}
