//! Order submission results.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Outcome of one buy/sell request, immutable once produced.
///
/// Price and quantity are populated from the request; the system does not
/// reconcile against the actual fill beyond what the submission reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    pub success: bool,
    pub ticker: String,
    pub side: OrderSide,
    /// Expected fill price (the price observed when the order was placed).
    pub price: f64,
    pub quantity: f64,
    pub notional_krw: f64,
    pub order_id: Option<String>,
    pub error: Option<String>,
    pub simulated: bool,
}

impl std::fmt::Display for OrderResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = if self.simulated { "[SIM]" } else { "[LIVE]" };
        if self.success {
            write!(
                f,
                "Order{mode} OK | {} {} qty={:.8} price={:.4} total={:.0}KRW{}",
                self.side,
                self.ticker,
                self.quantity,
                self.price,
                self.notional_krw,
                self.order_id
                    .as_deref()
                    .map(|id| format!(" id={id}"))
                    .unwrap_or_default(),
            )
        } else {
            write!(
                f,
                "Order{mode} FAIL({}) | {} {} qty={:.8} price={:.4} total={:.0}KRW",
                self.error.as_deref().unwrap_or("unknown"),
                self.side,
                self.ticker,
                self.quantity,
                self.price,
                self.notional_krw,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_success_includes_id() {
        let r = OrderResult {
            success: true,
            ticker: "KRW-BTC".into(),
            side: OrderSide::Buy,
            price: 100.0,
            quantity: 1.5,
            notional_krw: 150.0,
            order_id: Some("abc".into()),
            error: None,
            simulated: true,
        };
        let s = r.to_string();
        assert!(s.contains("[SIM]"));
        assert!(s.contains("BUY KRW-BTC"));
        assert!(s.contains("id=abc"));
    }

    #[test]
    fn display_failure_includes_error() {
        let r = OrderResult {
            success: false,
            ticker: "KRW-BTC".into(),
            side: OrderSide::Sell,
            price: 100.0,
            quantity: 1.5,
            notional_krw: 150.0,
            order_id: None,
            error: Some("timeout".into()),
            simulated: false,
        };
        let s = r.to_string();
        assert!(s.contains("[LIVE]"));
        assert!(s.contains("FAIL(timeout)"));
    }
}
