//! Market data: provider contract, the Upbit implementation, and the
//! circuit breaker guarding it.

pub mod circuit_breaker;
pub mod provider;
pub mod upbit;

pub use circuit_breaker::CircuitBreaker;
pub use provider::{MarketData, MarketDataError, OrderBook, OrderBookLevel, TickerQuote};
pub use upbit::UpbitMarketData;
