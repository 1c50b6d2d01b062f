//! Composite entry score over one OHLCV series.

use tracing::info;

use super::{EntryDecision, EntryEvaluation, EntrySignals, IndicatorSet};
use crate::config::TradingConfig;
use crate::domain::{closes, volumes, Candle};
use crate::indicators::{adx, atr, bollinger, ema, macd, rsi, sma};

/// Value `k` positions back from the end of a series, NaN when out of range.
fn nth_back(series: &[f64], k: usize) -> f64 {
    series
        .len()
        .checked_sub(k + 1)
        .and_then(|i| series.get(i))
        .copied()
        .unwrap_or(f64::NAN)
}

/// Score one candidate series. NaN indicators contribute zero; short series
/// never error, they just score low.
pub fn compute_entry_score(candles: &[Candle], config: &TradingConfig) -> EntryEvaluation {
    let close = closes(candles);
    let volume = volumes(candles);

    let ema_fast = nth_back(&ema(&close, config.ema_fast), 0);
    let ema_mid = nth_back(&ema(&close, config.ema_mid), 0);
    let ema_slow = nth_back(&ema(&close, config.ema_slow), 0);

    let m = macd(&close, 12, 26, 9);
    let hist_now = nth_back(&m.histogram, 0);
    let hist_prev = nth_back(&m.histogram, 1);
    let hist_prev2 = nth_back(&m.histogram, 2);

    let rsi_val = nth_back(&rsi(&close, config.rsi_period), 0);
    let adx_val = nth_back(&adx(candles, config.adx_period), 0);
    let bb_mid = nth_back(&bollinger(&close, 20, 2.0).mid, 0);
    let atr_val = nth_back(&atr(candles, config.atr_period), 0);
    let current_price = nth_back(&close, 0);

    // Entry-side volume ratio uses the rolling mean *including* the current
    // candle; the scanner's surge ratio excludes it.
    let vol_avg = nth_back(&sma(&volume, config.volume_surge_window), 0);
    let vol_now = nth_back(&volume, 0);
    let volume_ratio = if vol_avg > 0.0 { vol_now / vol_avg } else { 0.0 };

    let bullish_candle = candles.last().map(Candle::is_bullish).unwrap_or(false);

    let indicators = IndicatorSet {
        ema_fast,
        ema_mid,
        ema_slow,
        macd_hist: hist_now,
        rsi: rsi_val,
        adx: adx_val,
        atr: atr_val,
        bb_mid,
        volume_ratio,
        current_price,
    };

    let (score, signals) = score_signals(&indicators, hist_prev, hist_prev2, bullish_candle, config);

    EntryEvaluation {
        score,
        entry_recommended: score >= config.entry_score_threshold,
        signals,
        indicators,
    }
}

/// The additive scoring table. Pure; every comparison is NaN-safe (a NaN
/// operand fails the comparison and the category scores zero).
fn score_signals(
    ind: &IndicatorSet,
    hist_prev: f64,
    hist_prev2: f64,
    bullish_candle: bool,
    config: &TradingConfig,
) -> (u32, EntrySignals) {
    let mut score = 0u32;
    let mut signals = EntrySignals::default();

    // 1. EMA alignment (25)
    if ind.ema_fast > ind.ema_mid && ind.ema_mid > ind.ema_slow {
        score += 25;
        signals.ema_aligned = true;
    } else if ind.ema_fast > ind.ema_mid {
        score += 10;
    }

    // 2. MACD histogram (20)
    let hist = ind.macd_hist;
    if hist > 0.0 && hist_prev <= 0.0 {
        // Fresh cross above zero, the strongest form
        score += 20;
        signals.macd_bullish = true;
    } else if hist > 0.0 && hist > hist_prev {
        score += 15;
        signals.macd_bullish = true;
    } else if hist > hist_prev && hist_prev > hist_prev2 {
        // Three-bar expansion, any sign
        score += 8;
    }

    // 3. RSI band (15)
    if ind.rsi >= config.rsi_entry_min && ind.rsi <= config.rsi_entry_max {
        score += 15;
        signals.rsi_ok = true;
    } else if ind.rsi < config.rsi_entry_min {
        // Oversold recovery attempt
        score += 8;
    }

    // 4. ADX trend strength (15)
    if ind.adx > config.adx_threshold {
        score += 15;
        signals.adx_trending = true;
    } else if ind.adx > 15.0 {
        score += 7;
    }

    // 5. Close above the Bollinger mid band (10)
    if ind.current_price > ind.bb_mid {
        score += 10;
        signals.above_bb_mid = true;
    }

    // 6. Volume surge (10)
    if ind.volume_ratio >= config.volume_surge_min_ratio {
        score += 10;
        signals.volume_confirmed = true;
    }

    // 7. Bullish candle (5)
    if bullish_candle {
        score += 5;
        signals.bullish_candle = true;
    }

    (score, signals)
}

/// Combine the leader score with the technical entry score into a final
/// decision. The stop-loss price here is advisory; the authoritative stop is
/// fixed when the position opens.
pub fn should_enter(
    ticker: &str,
    candles: &[Candle],
    leader_score: f64,
    config: &TradingConfig,
) -> EntryDecision {
    let evaluation = compute_entry_score(candles, config);
    let combined_confidence = leader_score * 0.4 + evaluation.score as f64 * 0.6;
    let entry_price = evaluation.indicators.current_price;

    info!(
        ticker,
        score = evaluation.score,
        leader = format!("{leader_score:.1}"),
        combined = format!("{combined_confidence:.1}"),
        signals = evaluation.signals.active_labels(),
        decision = if evaluation.entry_recommended {
            "enter"
        } else {
            "wait"
        },
        "entry evaluation"
    );

    EntryDecision {
        enter: evaluation.entry_recommended,
        ticker: ticker.to_string(),
        entry_score: evaluation.score,
        leader_score,
        combined_confidence,
        entry_price,
        stop_loss_price: entry_price * (1.0 + config.stop_loss_rate),
        evaluation,
    }
}
