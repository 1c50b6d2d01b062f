//! Order executor: validation, bounded retry, exponential backoff.
//!
//! Every submission gets up to `MAX_RETRIES` attempts with delays of
//! base_delay * 2^(attempt-1) between them. Exhaustion yields a failed
//! `OrderResult` carrying the last error; nothing here panics or unwinds
//! through the trading loops.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::gateway::OrderGateway;
use crate::config::TradingConfig;
use crate::domain::{OrderResult, OrderSide};

const MAX_RETRIES: u32 = 3;
const BASE_DELAY: Duration = Duration::from_secs(1);

/// Delay before retry attempt `attempt` (1-based): base * 2^(attempt-1).
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.saturating_pow(attempt.saturating_sub(1))
}

pub struct OrderExecutor {
    gateway: Arc<dyn OrderGateway>,
    config: Arc<TradingConfig>,
    base_delay: Duration,
}

impl OrderExecutor {
    pub fn new(gateway: Arc<dyn OrderGateway>, config: Arc<TradingConfig>) -> Self {
        Self {
            gateway,
            config,
            base_delay: BASE_DELAY,
        }
    }

    /// Test hook: shrink the backoff base so retry tests run in milliseconds.
    #[cfg(test)]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn gateway(&self) -> &Arc<dyn OrderGateway> {
        &self.gateway
    }

    /// Market buy spending `notional_krw`, at an expected price of `price`.
    pub fn buy(&self, ticker: &str, notional_krw: f64, price: f64) -> OrderResult {
        let quantity = if price > 0.0 { notional_krw / price } else { 0.0 };

        if notional_krw < self.config.min_order_krw {
            return self.rejected(
                ticker,
                OrderSide::Buy,
                price,
                quantity,
                notional_krw,
                format!(
                    "below minimum order notional: {notional_krw:.0} < {:.0}",
                    self.config.min_order_krw
                ),
            );
        }

        self.submit(ticker, OrderSide::Buy, price, quantity, notional_krw)
    }

    /// Market sell of `quantity`, at an expected price of `price`.
    pub fn sell(&self, ticker: &str, quantity: f64, price: f64) -> OrderResult {
        let notional_krw = quantity * price;
        self.submit(ticker, OrderSide::Sell, price, quantity, notional_krw)
    }

    fn submit(
        &self,
        ticker: &str,
        side: OrderSide,
        price: f64,
        quantity: f64,
        notional_krw: f64,
    ) -> OrderResult {
        let simulated = self.gateway.simulated();
        let mut last_error = String::new();

        for attempt in 1..=MAX_RETRIES {
            let submitted = match side {
                OrderSide::Buy => self.gateway.market_buy(ticker, notional_krw),
                OrderSide::Sell => self.gateway.market_sell(ticker, quantity),
            };

            match submitted {
                Ok(fill) => {
                    info!(
                        ticker,
                        side = %side,
                        quantity = format!("{quantity:.8}"),
                        price = format!("{price:.4}"),
                        order_id = fill.order_id,
                        "order accepted"
                    );
                    return OrderResult {
                        success: true,
                        ticker: ticker.to_string(),
                        side,
                        price,
                        quantity,
                        notional_krw,
                        order_id: Some(fill.order_id),
                        error: None,
                        simulated,
                    };
                }
                Err(e) => {
                    last_error = e.to_string();
                    let delay = backoff_delay(self.base_delay, attempt);
                    warn!(
                        ticker,
                        side = %side,
                        attempt,
                        max = MAX_RETRIES,
                        error = %e,
                        "order attempt failed"
                    );
                    if attempt < MAX_RETRIES {
                        std::thread::sleep(delay);
                    }
                }
            }
        }

        self.rejected(
            ticker,
            side,
            price,
            quantity,
            notional_krw,
            format!("failed after {MAX_RETRIES} attempts: {last_error}"),
        )
    }

    fn rejected(
        &self,
        ticker: &str,
        side: OrderSide,
        price: f64,
        quantity: f64,
        notional_krw: f64,
        error: String,
    ) -> OrderResult {
        warn!(ticker, side = %side, error, "order not placed");
        OrderResult {
            success: false,
            ticker: ticker.to_string(),
            side,
            price,
            quantity,
            notional_krw,
            order_id: None,
            error: Some(error),
            simulated: self.gateway.simulated(),
        }
    }
}
