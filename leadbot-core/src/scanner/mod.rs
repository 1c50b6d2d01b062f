//! Market leader identification.
//!
//! Composite ranking over the KRW universe:
//!   Leader Score = Volume(35%) + Momentum(30%) + RS vs BTC(20%) + Liquidity(15%)
//!
//! Hard filters before scoring: stable-asset pairs, 24h turnover below the
//! configured floor, and volume surge below the minimum ratio.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::TradingConfig;
use crate::data::{MarketData, OrderBook};
use crate::domain::{closes, volumes, Candle};

/// Stable-asset pairs are never trade candidates.
pub const EXCLUDED_TICKERS: [&str; 3] = ["KRW-USDT", "KRW-USDC", "KRW-DAI"];

/// Benchmark for relative strength.
pub const RS_BENCHMARK: &str = "KRW-BTC";

/// Pacing between per-candidate requests (exchange rate limit).
const REQUEST_DELAY: Duration = Duration::from_millis(120);

/// Relative-strength lookback in candles.
const RS_PERIOD: usize = 20;

/// One scored candidate from a scan cycle.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderCandidate {
    pub ticker: String,
    pub composite_score: f64,
    pub volume_score: f64,
    pub momentum_score: f64,
    pub rs_score: f64,
    pub liquidity_score: f64,
    pub volume_ratio: f64,
    pub latest_close: f64,
}

/// Fetch a candidate's series, requiring at least 80% of the requested
/// count. Anything less is treated as missing data for this cycle.
pub fn fetch_ohlcv(
    market: &dyn MarketData,
    ticker: &str,
    config: &TradingConfig,
) -> Option<Vec<Candle>> {
    match market.candles(ticker, &config.candle_interval, config.candle_count) {
        Ok(candles) => {
            if candles.len() as f64 >= config.candle_count as f64 * 0.8 {
                Some(candles)
            } else {
                debug!(ticker, got = candles.len(), "candle series too short");
                None
            }
        }
        Err(e) => {
            debug!(ticker, error = %e, "candle fetch failed");
            None
        }
    }
}

/// Volume surge score (0-100) and the surge ratio itself.
///
/// Ratio = current volume / mean volume over the preceding `window` candles
/// (current excluded). A 3.0x surge maps to 100 on a linear scale.
pub fn volume_score(candles: &[Candle], window: usize) -> (f64, f64) {
    let volume = volumes(candles);
    let n = volume.len();
    if n < window + 1 {
        return (0.0, 0.0);
    }

    let current = volume[n - 1];
    let avg: f64 = volume[n - 1 - window..n - 1].iter().sum::<f64>() / window as f64;
    if avg <= 0.0 {
        return (0.0, 0.0);
    }

    let ratio = current / avg;
    let score = (ratio / 3.0 * 100.0).clamp(0.0, 100.0);
    (score, ratio)
}

/// Price momentum score (0-100): 0.6 x 5-candle ROC + 0.4 x 20-candle ROC,
/// both in percent, with the +/-30% range mapped linearly onto 0-100.
pub fn momentum_score(close: &[f64]) -> f64 {
    let n = close.len();
    if n < 22 {
        return 0.0;
    }

    let short_roc = (close[n - 1] / close[n - 6] - 1.0) * 100.0;
    let long_roc = (close[n - 1] / close[n - 21] - 1.0) * 100.0;
    let combined = short_roc * 0.6 + long_roc * 0.4;
    ((combined + 30.0) / 60.0 * 100.0).clamp(0.0, 100.0)
}

/// Relative strength vs the benchmark (0-100): return difference over
/// `RS_PERIOD` candles in percentage points, +/-20pp mapped onto 0-100.
/// Neutral 50 when either series is too short.
pub fn rs_score(close: &[f64], benchmark_close: &[f64]) -> f64 {
    let n = close.len();
    let b = benchmark_close.len();
    if n < RS_PERIOD + 1 || b < RS_PERIOD + 1 {
        return 50.0;
    }

    let coin_ret = close[n - 1] / close[n - 1 - RS_PERIOD] - 1.0;
    let bench_ret = benchmark_close[b - 1] / benchmark_close[b - 1 - RS_PERIOD] - 1.0;
    let diff = (coin_ret - bench_ret) * 100.0;
    ((diff + 20.0) / 40.0 * 100.0).clamp(0.0, 100.0)
}

/// Order book liquidity score (0-100): tight spread plus deep top-5 levels.
pub fn liquidity_score(book: &OrderBook) -> f64 {
    let spread_pct = match book.spread_pct() {
        Some(s) => s,
        None => return 0.0,
    };
    let spread_score = ((1.0 - spread_pct) / 0.9 * 100.0).clamp(0.0, 100.0);

    let depth = book.depth_notional(5);
    let depth_score = ((depth.max(1.0).log10() - 7.0) / 3.0 * 100.0).clamp(0.0, 100.0);

    spread_score * 0.5 + depth_score * 0.5
}

fn fetch_liquidity_score(market: &dyn MarketData, ticker: &str) -> f64 {
    match market.order_book(ticker) {
        Ok(book) => liquidity_score(&book),
        Err(e) => {
            debug!(ticker, error = %e, "order book fetch failed");
            0.0
        }
    }
}

/// Scan the whole KRW universe and return the top-N leaders by composite
/// score. Empty on a universe fetch failure; individual candidate failures
/// only drop that candidate.
pub fn scan_market_leaders(market: &dyn MarketData, config: &TradingConfig) -> Vec<LeaderCandidate> {
    info!("scanning for market leaders");

    let universe = match market.krw_markets() {
        Ok(markets) => markets,
        Err(e) => {
            error!(error = %e, "KRW market list unavailable");
            return Vec::new();
        }
    };
    let mut tickers: Vec<String> = universe
        .into_iter()
        .filter(|t| !EXCLUDED_TICKERS.contains(&t.as_str()))
        .collect();

    // Benchmark series for relative strength; a missing benchmark only
    // neutralizes the RS component.
    let benchmark = fetch_ohlcv(market, RS_BENCHMARK, config).map(|c| closes(&c));
    if benchmark.is_none() {
        error!("benchmark series unavailable, RS scoring neutralized");
    }

    // 24h turnover pre-filter via the batch ticker endpoint. If the batch
    // fails we scan the unfiltered universe rather than skip the cycle.
    match market.ticker_quotes(&tickers) {
        Ok(quotes) => {
            let before = tickers.len();
            tickers = quotes
                .into_iter()
                .filter(|q| q.acc_trade_price_24h >= config.min_volume_krw_24h)
                .map(|q| q.market)
                .collect();
            info!(passed = tickers.len(), total = before, "24h turnover filter");
        }
        Err(e) => {
            warn!(error = %e, "turnover filter failed, scanning full universe");
        }
    }

    let mut results = Vec::new();
    for ticker in &tickers {
        let candles = match fetch_ohlcv(market, ticker, config) {
            Some(c) => c,
            None => continue,
        };

        let (vol_score, vol_ratio) = volume_score(&candles, config.volume_surge_window);
        if vol_ratio < config.volume_surge_min_ratio {
            continue;
        }

        let close = closes(&candles);
        let mom_score = momentum_score(&close);
        let rs = match &benchmark {
            Some(bench) => rs_score(&close, bench),
            None => 50.0,
        };
        let liq_score = fetch_liquidity_score(market, ticker);

        let composite =
            vol_score * 0.35 + mom_score * 0.30 + rs * 0.20 + liq_score * 0.15;

        results.push(LeaderCandidate {
            ticker: ticker.clone(),
            composite_score: composite,
            volume_score: vol_score,
            momentum_score: mom_score,
            rs_score: rs,
            liquidity_score: liq_score,
            volume_ratio: vol_ratio,
            latest_close: *close.last().unwrap_or(&f64::NAN),
        });

        std::thread::sleep(REQUEST_DELAY);
    }

    // Stable sort: composite descending, scan order breaks ties.
    results.sort_by(|a, b| {
        b.composite_score
            .partial_cmp(&a.composite_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(config.leader_top_n);

    for (rank, leader) in results.iter().enumerate() {
        info!(
            rank = rank + 1,
            ticker = leader.ticker,
            composite = format!("{:.1}", leader.composite_score),
            vol = format!("{:.0}", leader.volume_score),
            mom = format!("{:.0}", leader.momentum_score),
            rs = format!("{:.0}", leader.rs_score),
            liq = format!("{:.0}", leader.liquidity_score),
            surge = format!("{:.1}x", leader.volume_ratio),
            "leader"
        );
    }

    results
}
