//! Upbit public REST API provider.
//!
//! Covers the read-only endpoints the engine needs: candles, batch tickers,
//! and order books. None of these require signing. Transient failures are
//! surfaced as `MarketDataError` and the caller skips the affected candidate
//! for that tick — there is no in-tick retry, only the circuit breaker
//! guarding against sustained throttling.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::circuit_breaker::CircuitBreaker;
use super::provider::{MarketData, MarketDataError, OrderBook, OrderBookLevel, TickerQuote};
use crate::domain::Candle;

const DEFAULT_BASE_URL: &str = "https://api.upbit.com";
/// Upbit caps candle requests at 200 rows.
const MAX_CANDLE_COUNT: usize = 200;
/// The batch ticker endpoint accepts at most 100 markets per call.
const TICKER_CHUNK: usize = 100;
/// Pacing between chunked requests (exchange allows ~10 req/s).
const CHUNK_DELAY: Duration = Duration::from_millis(120);

/// Map a config interval name to the candle endpoint path.
pub fn candle_path(interval: &str) -> Result<String, MarketDataError> {
    if let Some(unit) = interval.strip_prefix("minute") {
        const UNITS: [&str; 8] = ["1", "3", "5", "10", "15", "30", "60", "240"];
        if UNITS.contains(&unit) {
            return Ok(format!("v1/candles/minutes/{unit}"));
        }
        return Err(MarketDataError::UnsupportedInterval(interval.to_string()));
    }
    match interval {
        "day" => Ok("v1/candles/days".to_string()),
        "week" => Ok("v1/candles/weeks".to_string()),
        "month" => Ok("v1/candles/months".to_string()),
        _ => Err(MarketDataError::UnsupportedInterval(interval.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct UpbitCandle {
    candle_date_time_utc: String,
    opening_price: f64,
    high_price: f64,
    low_price: f64,
    trade_price: f64,
    candle_acc_trade_volume: f64,
}

#[derive(Debug, Deserialize)]
struct UpbitTicker {
    market: String,
    trade_price: f64,
    #[serde(default)]
    acc_trade_price_24h: f64,
}

#[derive(Debug, Deserialize)]
struct UpbitMarket {
    market: String,
}

#[derive(Debug, Deserialize)]
struct UpbitOrderBook {
    market: String,
    orderbook_units: Vec<UpbitOrderBookUnit>,
}

#[derive(Debug, Deserialize)]
struct UpbitOrderBookUnit {
    ask_price: f64,
    bid_price: f64,
    ask_size: f64,
    bid_size: f64,
}

fn parse_candles(rows: Vec<UpbitCandle>) -> Result<Vec<Candle>, MarketDataError> {
    // The API returns newest-first; the engine wants ascending time.
    let mut candles = Vec::with_capacity(rows.len());
    for row in rows.into_iter().rev() {
        let timestamp = NaiveDateTime::parse_from_str(&row.candle_date_time_utc, "%Y-%m-%dT%H:%M:%S")
            .map_err(|e| {
                MarketDataError::MalformedResponse(format!(
                    "bad candle timestamp {:?}: {e}",
                    row.candle_date_time_utc
                ))
            })?
            .and_utc();
        candles.push(Candle {
            timestamp,
            open: row.opening_price,
            high: row.high_price,
            low: row.low_price,
            close: row.trade_price,
            volume: row.candle_acc_trade_volume,
        });
    }
    Ok(candles)
}

/// Upbit market data over blocking HTTP.
pub struct UpbitMarketData {
    client: reqwest::blocking::Client,
    base_url: String,
    breaker: CircuitBreaker,
}

impl UpbitMarketData {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            breaker: CircuitBreaker::default_public_api(),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, MarketDataError> {
        if !self.breaker.is_allowed() {
            return Err(MarketDataError::CircuitOpen);
        }

        let url = format!("{}/{path_and_query}", self.base_url);
        let resp = self.client.get(&url).send().map_err(|e| {
            self.breaker.record_failure();
            MarketDataError::Network(e.to_string())
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            self.breaker.record_failure();
            return Err(MarketDataError::RateLimited);
        }
        if status == reqwest::StatusCode::FORBIDDEN {
            // The exchange has blocked us outright; stop asking for a while.
            self.breaker.open();
            return Err(MarketDataError::RateLimited);
        }
        if !status.is_success() {
            self.breaker.record_failure();
            return Err(MarketDataError::Other(format!(
                "HTTP {status} for {path_and_query}"
            )));
        }

        let parsed = resp
            .json::<T>()
            .map_err(|e| MarketDataError::MalformedResponse(e.to_string()))?;
        self.breaker.record_success();
        Ok(parsed)
    }
}

impl Default for UpbitMarketData {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketData for UpbitMarketData {
    fn candles(
        &self,
        market: &str,
        interval: &str,
        count: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let path = candle_path(interval)?;
        let count = count.min(MAX_CANDLE_COUNT);
        let rows: Vec<UpbitCandle> =
            self.get_json(&format!("{path}?market={market}&count={count}"))?;
        if rows.is_empty() {
            return Err(MarketDataError::UnknownMarket(market.to_string()));
        }
        parse_candles(rows)
    }

    fn current_prices(&self, markets: &[String]) -> Result<HashMap<String, f64>, MarketDataError> {
        if markets.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<UpbitTicker> =
            self.get_json(&format!("v1/ticker?markets={}", markets.join(",")))?;
        Ok(rows
            .into_iter()
            .map(|t| (t.market, t.trade_price))
            .collect())
    }

    fn order_book(&self, market: &str) -> Result<OrderBook, MarketDataError> {
        let mut rows: Vec<UpbitOrderBook> =
            self.get_json(&format!("v1/orderbook?markets={market}"))?;
        let book = rows
            .drain(..)
            .next()
            .ok_or_else(|| MarketDataError::UnknownMarket(market.to_string()))?;
        Ok(OrderBook {
            market: book.market,
            levels: book
                .orderbook_units
                .into_iter()
                .map(|u| OrderBookLevel {
                    ask_price: u.ask_price,
                    bid_price: u.bid_price,
                    ask_size: u.ask_size,
                    bid_size: u.bid_size,
                })
                .collect(),
        })
    }

    fn krw_markets(&self) -> Result<Vec<String>, MarketDataError> {
        let all: Vec<UpbitMarket> = self.get_json("v1/market/all?isDetails=false")?;
        let krw: Vec<String> = all
            .into_iter()
            .map(|m| m.market)
            .filter(|m| m.starts_with("KRW-"))
            .collect();
        debug!(markets = krw.len(), "fetched KRW market list");
        Ok(krw)
    }

    fn ticker_quotes(&self, markets: &[String]) -> Result<Vec<TickerQuote>, MarketDataError> {
        let mut quotes = Vec::with_capacity(markets.len());
        for (i, chunk) in markets.chunks(TICKER_CHUNK).enumerate() {
            if i > 0 {
                std::thread::sleep(CHUNK_DELAY);
            }
            let rows: Vec<UpbitTicker> =
                self.get_json(&format!("v1/ticker?markets={}", chunk.join(",")))?;
            quotes.extend(rows.into_iter().map(|t| TickerQuote {
                market: t.market,
                trade_price: t.trade_price,
                acc_trade_price_24h: t.acc_trade_price_24h,
            }));
        }
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_path_minutes() {
        assert_eq!(candle_path("minute60").unwrap(), "v1/candles/minutes/60");
        assert_eq!(candle_path("minute1").unwrap(), "v1/candles/minutes/1");
        assert_eq!(candle_path("day").unwrap(), "v1/candles/days");
    }

    #[test]
    fn candle_path_rejects_unknown() {
        assert!(candle_path("minute42").is_err());
        assert!(candle_path("hourly").is_err());
    }

    #[test]
    fn parse_candles_reverses_to_ascending() {
        let rows: Vec<UpbitCandle> = serde_json::from_str(
            r#"[
                {"candle_date_time_utc":"2025-06-02T10:00:00","opening_price":102.0,
                 "high_price":103.0,"low_price":101.0,"trade_price":102.5,
                 "candle_acc_trade_volume":20.0},
                {"candle_date_time_utc":"2025-06-02T09:00:00","opening_price":100.0,
                 "high_price":102.0,"low_price":99.0,"trade_price":101.0,
                 "candle_acc_trade_volume":10.0}
            ]"#,
        )
        .unwrap();
        let candles = parse_candles(rows).unwrap();
        assert_eq!(candles.len(), 2);
        assert!(candles[0].timestamp < candles[1].timestamp);
        assert_eq!(candles[0].close, 101.0);
        assert_eq!(candles[1].volume, 20.0);
    }

    #[test]
    fn parse_candles_rejects_bad_timestamp() {
        let rows: Vec<UpbitCandle> = serde_json::from_str(
            r#"[{"candle_date_time_utc":"yesterday","opening_price":1.0,
                 "high_price":1.0,"low_price":1.0,"trade_price":1.0,
                 "candle_acc_trade_volume":1.0}]"#,
        )
        .unwrap();
        assert!(matches!(
            parse_candles(rows),
            Err(MarketDataError::MalformedResponse(_))
        ));
    }

    #[test]
    fn ticker_row_tolerates_extra_fields() {
        let row: UpbitTicker = serde_json::from_str(
            r#"{"market":"KRW-BTC","trade_price":100.0,
                "acc_trade_price_24h":5.0e9,"change":"RISE"}"#,
        )
        .unwrap();
        assert_eq!(row.market, "KRW-BTC");
        assert_eq!(row.acc_trade_price_24h, 5.0e9);
    }
}
