//! Position — a single open holding with its stop state.
//!
//! The stop-loss price is fixed when the position opens and never moves.
//! `peak_price` ratchets upward with every observed price; the trailing stop
//! activates once (one-way false→true) after the activation gain is reached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An open position, keyed by ticker in the position book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub entry_price: f64,
    pub quantity: f64,
    pub entry_time: DateTime<Utc>,
    pub invested_krw: f64,
    /// Fixed at open: entry_price * (1 + stop_loss_rate). Immutable afterwards.
    pub stop_loss_price: f64,
    /// Highest price observed since entry. Never decreases.
    pub peak_price: f64,
    pub trailing_active: bool,
    pub entry_score: f64,
    pub leader_score: f64,
}

impl Position {
    /// Ratchet the peak and check trailing activation.
    ///
    /// Returns `true` when the trailing stop newly activated on this update.
    pub fn update_peak(&mut self, current_price: f64, activation_rate: f64) -> bool {
        if current_price > self.peak_price {
            self.peak_price = current_price;
        }
        if !self.trailing_active && self.unrealized_pnl_rate(current_price) >= activation_rate {
            self.trailing_active = true;
            return true;
        }
        false
    }

    /// Trailing stop level relative to the peak. Only meaningful once
    /// `trailing_active` is set.
    pub fn trailing_stop_price(&self, trailing_stop_rate: f64) -> f64 {
        self.peak_price * (1.0 + trailing_stop_rate)
    }

    pub fn unrealized_pnl_rate(&self, current_price: f64) -> f64 {
        current_price / self.entry_price - 1.0
    }

    /// Hours held as of `now`.
    pub fn hold_hours(&self, now: DateTime<Utc>) -> f64 {
        (now - self.entry_time).num_seconds() as f64 / 3600.0
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitReason {
    StopLoss,
    TrailingStop,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "stop-loss"),
            ExitReason::TrailingStop => write!(f, "trailing-stop"),
        }
    }
}

/// Realized result of a closed position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSummary {
    pub ticker: String,
    pub entry_price: f64,
    pub exit_price: f64,
    /// exit_price / entry_price - 1, exact.
    pub pnl_rate: f64,
    pub pnl_krw: f64,
    pub invested_krw: f64,
    pub peak_price: f64,
    pub hold_hours: f64,
    pub reason: ExitReason,
}
