//! Market data contract and structured error types.
//!
//! The `MarketData` trait abstracts the exchange's public endpoints (candles,
//! batch prices, order books, 24h turnover) so the scanner and exit monitor
//! can be driven by a mock in tests. Providers may return partial or missing
//! data; callers degrade to neutral scores or skip the tick, never abort.

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::Candle;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("network unreachable: {0}")]
    Network(String),

    #[error("rate limited by exchange")]
    RateLimited,

    #[error("response format changed: {0}")]
    MalformedResponse(String),

    #[error("unknown market: {0}")]
    UnknownMarket(String),

    #[error("request refused: circuit breaker open")]
    CircuitOpen,

    #[error("unsupported candle interval: {0}")]
    UnsupportedInterval(String),

    #[error("market data error: {0}")]
    Other(String),
}

/// One price level of an order book; best level first in the snapshot.
#[derive(Debug, Clone)]
pub struct OrderBookLevel {
    pub ask_price: f64,
    pub bid_price: f64,
    pub ask_size: f64,
    pub bid_size: f64,
}

/// Order book snapshot for a single market.
#[derive(Debug, Clone)]
pub struct OrderBook {
    pub market: String,
    pub levels: Vec<OrderBookLevel>,
}

impl OrderBook {
    /// Best ask/bid spread as a percentage of the best bid.
    pub fn spread_pct(&self) -> Option<f64> {
        let best = self.levels.first()?;
        if best.bid_price <= 0.0 {
            return None;
        }
        Some((best.ask_price - best.bid_price) / best.bid_price * 100.0)
    }

    /// Quote-currency notional across the top `depth` levels, both sides.
    pub fn depth_notional(&self, depth: usize) -> f64 {
        self.levels
            .iter()
            .take(depth)
            .map(|u| u.bid_price * u.bid_size + u.ask_price * u.ask_size)
            .sum()
    }
}

/// 24h snapshot row from the batch ticker endpoint.
#[derive(Debug, Clone)]
pub struct TickerQuote {
    pub market: String,
    pub trade_price: f64,
    pub acc_trade_price_24h: f64,
}

/// Read-only market data source.
pub trait MarketData: Send + Sync {
    /// OHLCV series, ascending by time. May come back shorter than `count`.
    fn candles(&self, market: &str, interval: &str, count: usize)
        -> Result<Vec<Candle>, MarketDataError>;

    /// Current prices for many markets in a single batch call. Markets the
    /// exchange does not report are simply absent from the map.
    fn current_prices(&self, markets: &[String]) -> Result<HashMap<String, f64>, MarketDataError>;

    /// Order book snapshot, best level first.
    fn order_book(&self, market: &str) -> Result<OrderBook, MarketDataError>;

    /// The tradable KRW market universe.
    fn krw_markets(&self) -> Result<Vec<String>, MarketDataError>;

    /// 24h snapshot for the given markets, batched server-side.
    fn ticker_quotes(&self, markets: &[String]) -> Result<Vec<TickerQuote>, MarketDataError>;
}
