//! Simple moving average and rolling standard deviation.
//!
//! Both are NaN until `period - 1`, matching a rolling window that only
//! emits once full.

/// Rolling mean over `period` values.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "SMA period must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }

    let mut sum: f64 = values[..period].iter().sum();
    result[period - 1] = sum / period as f64;
    for i in period..n {
        sum += values[i] - values[i - period];
        result[i] = sum / period as f64;
    }
    result
}

/// Rolling sample standard deviation (ddof = 1) over `period` values.
///
/// Undefined for period < 2 (a single sample has no dispersion).
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 2, "rolling_std period must be >= 2");
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (period as f64 - 1.0);
        result[i] = var.sqrt();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_known_values() {
        let result = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 2.0, DEFAULT_EPSILON);
        assert_approx(result[3], 3.0, DEFAULT_EPSILON);
        assert_approx(result[4], 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_short_series_all_nan() {
        let result = sma(&[1.0, 2.0], 3);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rolling_std_known_values() {
        // Window (1,2,3): mean 2, var ((1)+(0)+(1))/2 = 1, std 1
        let result = rolling_std(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 1.0, DEFAULT_EPSILON);
        assert_approx(result[3], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_std_constant_window_is_zero() {
        let result = rolling_std(&[7.0, 7.0, 7.0, 7.0], 3);
        assert_approx(result[2], 0.0, DEFAULT_EPSILON);
    }
}
