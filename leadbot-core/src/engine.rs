//! Engine: ties the periodic scan-and-trade cycle to the exit monitor.
//!
//! Two long-lived flows share the position book: the slow scan loop
//! (rank -> score -> size -> order) and the fast exit monitor. Both observe
//! the shared shutdown signal within one polling interval. The position lock
//! is only ever taken around book mutation, never across a network call.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::TradingConfig;
use crate::data::MarketData;
use crate::entry::should_enter;
use crate::execution::{OrderExecutor, OrderGateway};
use crate::monitor::run_exit_monitor;
use crate::positions::{PositionManager, TradeLog};
use crate::scanner::{fetch_ohlcv, scan_market_leaders};
use crate::shutdown::Shutdown;

/// Pause after a fill before evaluating the next candidate.
const POST_ORDER_DELAY: Duration = Duration::from_millis(300);

pub struct Engine {
    config: Arc<TradingConfig>,
    market: Arc<dyn MarketData>,
    executor: Arc<OrderExecutor>,
    positions: Arc<PositionManager>,
    trade_log: TradeLog,
    shutdown: Arc<Shutdown>,
}

impl Engine {
    /// Build the engine, restoring persisted positions.
    pub fn new(
        config: Arc<TradingConfig>,
        market: Arc<dyn MarketData>,
        gateway: Arc<dyn OrderGateway>,
    ) -> Self {
        let executor = Arc::new(OrderExecutor::new(gateway, config.clone()));
        let positions = Arc::new(PositionManager::new(config.clone()));
        let trade_log = TradeLog::new(Path::new(&config.state_dir));
        Self {
            config,
            market,
            executor,
            positions,
            trade_log,
            shutdown: Arc::new(Shutdown::new()),
        }
    }

    /// Handle for external stop requests; both loops observe it within one
    /// polling interval.
    pub fn shutdown_handle(&self) -> Arc<Shutdown> {
        self.shutdown.clone()
    }

    pub fn position_manager(&self) -> &PositionManager {
        &self.positions
    }

    /// One scan cycle: rank the market, score each leader, size and submit
    /// entries. Every failure affects only the current candidate.
    pub fn scan_and_trade(&self) {
        info!("scan cycle started");
        self.positions.log_holdings();

        if self.positions.is_full() {
            info!(
                count = self.positions.count(),
                max = self.config.max_concurrent_positions,
                "positions full, skipping scan"
            );
            return;
        }

        let gateway = self.executor.gateway();
        let total_portfolio = match gateway.total_portfolio_krw() {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "portfolio valuation failed, skipping cycle");
                return;
            }
        };
        let mut krw_balance = match gateway.krw_balance() {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "balance fetch failed, skipping cycle");
                return;
            }
        };
        if krw_balance < self.config.min_order_krw {
            warn!(balance = format!("{krw_balance:.0}"), "insufficient KRW balance");
            return;
        }

        let leaders = scan_market_leaders(self.market.as_ref(), &self.config);
        if leaders.is_empty() {
            info!("no leader candidates this cycle");
            return;
        }

        let mut entered = 0usize;
        for leader in &leaders {
            if self.positions.is_full() {
                break;
            }
            if self.positions.has_position(&leader.ticker) {
                continue;
            }

            let candles = match fetch_ohlcv(self.market.as_ref(), &leader.ticker, &self.config) {
                Some(c) => c,
                None => continue,
            };

            let decision = should_enter(
                &leader.ticker,
                &candles,
                leader.composite_score,
                &self.config,
            );
            if !decision.enter {
                continue;
            }

            let size_krw = self.positions.calc_position_size(
                &leader.ticker,
                decision.entry_price,
                decision.evaluation.indicators.atr,
                total_portfolio,
                decision.combined_confidence,
            );
            if size_krw <= 0.0 {
                continue;
            }

            // Never spend the whole balance; leave slack for fees and drift.
            let size_krw = size_krw.min(krw_balance * 0.95);
            if size_krw < self.config.min_order_krw {
                info!(ticker = leader.ticker, "balance too low for entry, skipping");
                continue;
            }

            info!(
                ticker = leader.ticker,
                score = decision.entry_score,
                confidence = format!("{:.1}", decision.combined_confidence),
                size = format!("{size_krw:.0}"),
                "entry decision"
            );
            let order = self.executor.buy(&leader.ticker, size_krw, decision.entry_price);
            info!("{order}");

            if order.success {
                self.positions.open_position(
                    &leader.ticker,
                    order.price,
                    order.quantity,
                    order.notional_krw,
                    decision.entry_score as f64,
                    leader.composite_score,
                );
                krw_balance -= order.notional_krw;
                entered += 1;
                std::thread::sleep(POST_ORDER_DELAY);
            }
        }

        if entered == 0 {
            info!("scan cycle complete: no entries");
        } else {
            info!(entered, "scan cycle complete");
        }
    }

    /// Run both loops until shutdown: the exit monitor on its own thread and
    /// the scan cycle here, starting with an immediate first scan.
    pub fn run(&self) {
        info!(
            mode = if self.config.dry_run { "dry-run" } else { "live" },
            stop_loss = format!("{:.0}%", self.config.stop_loss_rate * 100.0),
            trailing = format!("{:.0}%", self.config.trailing_stop_rate * 100.0),
            activation = format!("+{:.0}%", self.config.trailing_activation_rate * 100.0),
            max_positions = self.config.max_concurrent_positions,
            scan_interval_secs = self.config.scan_interval_secs,
            exit_check_secs = self.config.exit_check_interval_secs,
            "trading engine starting"
        );

        let scan_interval = Duration::from_secs(self.config.scan_interval_secs);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                run_exit_monitor(
                    &self.positions,
                    self.market.as_ref(),
                    |ticker: &str, quantity: f64, price: f64| {
                        let result = self.executor.sell(ticker, quantity, price);
                        info!("{result}");
                        if result.success {
                            Some(result.price)
                        } else {
                            None
                        }
                    },
                    &self.trade_log,
                    &self.shutdown,
                    &self.config,
                );
            });

            info!("initial scan");
            self.scan_and_trade();

            while !self.shutdown.wait_timeout(scan_interval) {
                self.scan_and_trade();
            }
        });

        info!("trading engine stopped");
    }
}
