//! Position book: sizing, stop tracking, open/close lifecycle.
//!
//! One instance is shared by the scan cycle and the exit monitor. All
//! read-modify-write goes through the internal lock; the lock is never held
//! across a network call. The store is rewritten after every open or close.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{error, info, warn};

use super::store::StateStore;
use crate::config::TradingConfig;
use crate::domain::{ExitReason, Position, TradeSummary};

/// A triggered exit for one position: the reason plus a snapshot taken after
/// the peak/trailing update.
#[derive(Debug, Clone)]
pub struct ExitSignal {
    pub reason: ExitReason,
    pub position: Position,
}

#[derive(Debug)]
pub struct PositionManager {
    positions: Mutex<HashMap<String, Position>>,
    store: StateStore,
    config: Arc<TradingConfig>,
}

impl PositionManager {
    /// Create the manager and restore any persisted positions, so in-flight
    /// risk state survives a restart.
    pub fn new(config: Arc<TradingConfig>) -> Self {
        let store = StateStore::new(Path::new(&config.state_dir));
        let positions = match store.load() {
            Ok(positions) => {
                if !positions.is_empty() {
                    info!(
                        tickers = ?positions.keys().collect::<Vec<_>>(),
                        "restored positions"
                    );
                }
                positions
            }
            Err(e) => {
                error!(error = %e, "failed to load position state, starting empty");
                HashMap::new()
            }
        };
        Self {
            positions: Mutex::new(positions),
            store,
            config,
        }
    }

    fn persist(&self, positions: &HashMap<String, Position>) {
        if let Err(e) = self.store.save(positions) {
            // Keep trading from memory; the next successful save catches up.
            warn!(error = %e, "failed to persist position state");
        }
    }

    pub fn has_position(&self, ticker: &str) -> bool {
        self.positions.lock().unwrap().contains_key(ticker)
    }

    pub fn count(&self) -> usize {
        self.positions.lock().unwrap().len()
    }

    pub fn is_full(&self) -> bool {
        self.count() >= self.config.max_concurrent_positions
    }

    /// Snapshot of all open positions.
    pub fn positions(&self) -> Vec<Position> {
        self.positions.lock().unwrap().values().cloned().collect()
    }

    /// Open a position after a successful buy. The stop-loss price is fixed
    /// here and never moves again.
    pub fn open_position(
        &self,
        ticker: &str,
        entry_price: f64,
        quantity: f64,
        invested_krw: f64,
        entry_score: f64,
        leader_score: f64,
    ) -> Position {
        let position = Position {
            ticker: ticker.to_string(),
            entry_price,
            quantity,
            entry_time: Utc::now(),
            invested_krw,
            stop_loss_price: entry_price * (1.0 + self.config.stop_loss_rate),
            peak_price: entry_price,
            trailing_active: false,
            entry_score,
            leader_score,
        };

        let mut positions = self.positions.lock().unwrap();
        positions.insert(ticker.to_string(), position.clone());
        self.persist(&positions);
        drop(positions);

        info!(
            ticker,
            entry_price = format!("{entry_price:.4}"),
            quantity = format!("{quantity:.8}"),
            invested = format!("{invested_krw:.0}"),
            stop_loss = format!("{:.4}", position.stop_loss_price),
            "position opened"
        );
        position
    }

    /// Close a position and produce its realized summary. `None` when the
    /// ticker is not held.
    pub fn close_position(
        &self,
        ticker: &str,
        exit_price: f64,
        reason: ExitReason,
    ) -> Option<TradeSummary> {
        let mut positions = self.positions.lock().unwrap();
        let position = positions.remove(ticker)?;
        self.persist(&positions);
        drop(positions);

        let pnl_rate = position.unrealized_pnl_rate(exit_price);
        let summary = TradeSummary {
            ticker: ticker.to_string(),
            entry_price: position.entry_price,
            exit_price,
            pnl_rate,
            pnl_krw: position.invested_krw * pnl_rate,
            invested_krw: position.invested_krw,
            peak_price: position.peak_price,
            hold_hours: position.hold_hours(Utc::now()),
            reason,
        };

        info!(
            ticker,
            exit_price = format!("{exit_price:.4}"),
            pnl = format!("{:.2}%", pnl_rate * 100.0),
            pnl_krw = format!("{:.0}", summary.pnl_krw),
            reason = %reason,
            "position closed"
        );
        Some(summary)
    }

    /// ATR-risk position size in KRW. Zero means no entry:
    ///
    ///   base_size = portfolio * max_risk_per_trade / atr_pct
    ///   size      = min(base_size * confidence_mult,
    ///                   portfolio * max_single_position_ratio,
    ///                   available headroom)
    pub fn calc_position_size(
        &self,
        ticker: &str,
        current_price: f64,
        atr: f64,
        total_portfolio_krw: f64,
        combined_confidence: f64,
    ) -> f64 {
        if self.is_full() {
            info!(
                count = self.count(),
                max = self.config.max_concurrent_positions,
                "position limit reached"
            );
            return 0.0;
        }
        if self.has_position(ticker) {
            info!(ticker, "already holding");
            return 0.0;
        }

        let invested: f64 = self
            .positions
            .lock()
            .unwrap()
            .values()
            .map(|p| p.invested_krw)
            .sum();
        let available = total_portfolio_krw * self.config.max_invested_ratio - invested;
        if available < self.config.min_order_krw {
            info!(available = format!("{available:.0}"), "no investable headroom");
            return 0.0;
        }

        let mut atr_pct = if current_price > 0.0 {
            atr / current_price
        } else {
            0.05
        };
        if !(atr_pct > 0.0) {
            atr_pct = 0.05;
        }

        let base_size = total_portfolio_krw * self.config.max_risk_per_trade / atr_pct;

        let confidence_mult = if combined_confidence >= 85.0 {
            1.0
        } else if combined_confidence >= 75.0 {
            0.75
        } else {
            0.50
        };

        let max_single = total_portfolio_krw * self.config.max_single_position_ratio;
        let size = (base_size * confidence_mult).min(max_single).min(available).max(0.0);

        if size < self.config.min_order_krw {
            return 0.0;
        }

        info!(
            ticker,
            size = format!("{size:.0}"),
            atr_pct = format!("{:.2}%", atr_pct * 100.0),
            confidence = format!("{combined_confidence:.0}"),
            mult = confidence_mult,
            "position size"
        );
        size.round()
    }

    /// Run the stop state machine for one held ticker against a live price.
    ///
    /// Mutates the stored position (peak ratchet, one-way trailing
    /// activation) under the lock. Stop-loss takes priority over the
    /// trailing stop. `None` when the ticker is not held or no stop fired.
    pub fn check_exit(&self, ticker: &str, current_price: f64) -> Option<ExitSignal> {
        let mut positions = self.positions.lock().unwrap();
        let position = positions.get_mut(ticker)?;

        if position.update_peak(current_price, self.config.trailing_activation_rate) {
            info!(
                ticker,
                gain = format!("{:.1}%", position.unrealized_pnl_rate(current_price) * 100.0),
                peak = format!("{:.4}", position.peak_price),
                "trailing stop armed"
            );
        }

        if current_price <= position.stop_loss_price {
            return Some(ExitSignal {
                reason: ExitReason::StopLoss,
                position: position.clone(),
            });
        }

        if position.trailing_active
            && current_price <= position.trailing_stop_price(self.config.trailing_stop_rate)
        {
            return Some(ExitSignal {
                reason: ExitReason::TrailingStop,
                position: position.clone(),
            });
        }

        None
    }

    /// One log line per holding, for the scan-cycle header.
    pub fn log_holdings(&self) {
        let positions = self.positions.lock().unwrap();
        if positions.is_empty() {
            info!("no open positions");
            return;
        }
        info!(
            count = positions.len(),
            max = self.config.max_concurrent_positions,
            "open positions"
        );
        for p in positions.values() {
            info!(
                ticker = p.ticker,
                entry = format!("{:.4}", p.entry_price),
                peak = format!("{:.4}", p.peak_price),
                stop = format!("{:.4}", p.stop_loss_price),
                trailing = p.trailing_active,
                "holding"
            );
        }
    }
}
