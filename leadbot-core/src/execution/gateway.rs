//! Order submission contract.
//!
//! The signing exchange client is an external collaborator; this trait is
//! its boundary. The simulated gateway ships here and performs no network
//! access at all — it answers every order with a deterministic synthetic
//! fill, which is what dry-run mode trades against.

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// Enumerated submission failures; the retry loop decides on these values,
/// not on unwinding.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("network fault: {0}")]
    Network(String),

    #[error("response carried no order id: {0}")]
    MalformedResponse(String),
}

/// Accepted order, identified by the exchange's order id.
#[derive(Debug, Clone)]
pub struct GatewayFill {
    pub order_id: String,
}

/// Market order submission plus the account views the engine needs.
pub trait OrderGateway: Send + Sync {
    /// Market buy spending `notional_krw` of quote currency.
    fn market_buy(&self, ticker: &str, notional_krw: f64) -> Result<GatewayFill, GatewayError>;

    /// Market sell of `quantity` base currency.
    fn market_sell(&self, ticker: &str, quantity: f64) -> Result<GatewayFill, GatewayError>;

    /// Spendable KRW balance.
    fn krw_balance(&self) -> Result<f64, GatewayError>;

    /// Total account value in KRW (cash plus holdings at market).
    fn total_portfolio_krw(&self) -> Result<f64, GatewayError>;

    /// True when fills are synthetic.
    fn simulated(&self) -> bool {
        false
    }
}

/// Dry-run gateway: deterministic fills, fixed balance, no network.
#[derive(Debug)]
pub struct SimulatedGateway {
    balance_krw: f64,
    sequence: AtomicU64,
}

impl SimulatedGateway {
    pub fn new(balance_krw: f64) -> Self {
        Self {
            balance_krw,
            sequence: AtomicU64::new(0),
        }
    }

    fn next_id(&self, side: &str) -> String {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("sim-{side}-{n}")
    }
}

impl OrderGateway for SimulatedGateway {
    fn market_buy(&self, _ticker: &str, _notional_krw: f64) -> Result<GatewayFill, GatewayError> {
        Ok(GatewayFill {
            order_id: self.next_id("buy"),
        })
    }

    fn market_sell(&self, _ticker: &str, _quantity: f64) -> Result<GatewayFill, GatewayError> {
        Ok(GatewayFill {
            order_id: self.next_id("sell"),
        })
    }

    fn krw_balance(&self) -> Result<f64, GatewayError> {
        Ok(self.balance_krw)
    }

    fn total_portfolio_krw(&self) -> Result<f64, GatewayError> {
        Ok(self.balance_krw)
    }

    fn simulated(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_fills_are_deterministic() {
        let gw = SimulatedGateway::new(10_000_000.0);
        assert_eq!(gw.market_buy("KRW-ETH", 5000.0).unwrap().order_id, "sim-buy-1");
        assert_eq!(gw.market_sell("KRW-ETH", 1.0).unwrap().order_id, "sim-sell-2");
        assert_eq!(gw.krw_balance().unwrap(), 10_000_000.0);
        assert!(gw.simulated());
    }
}
