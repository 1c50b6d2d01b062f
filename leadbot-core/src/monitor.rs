//! Exit monitor: the fast loop that polls live prices for open positions
//! and forces exits when a stop fires.
//!
//! Each tick batch-fetches prices for every open ticker in one call.
//! Positions with no quoted price are skipped for that tick only; any other
//! failure is logged and the loop continues on the next interval. A failed
//! sell leaves the position open for re-evaluation on the next tick.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::TradingConfig;
use crate::data::MarketData;
use crate::positions::{PositionManager, TradeLog};
use crate::shutdown::Shutdown;

/// Run the monitor until shutdown. `sell_fn(ticker, quantity, price)`
/// submits the exit order and returns the fill price on success, `None` on
/// failure.
pub fn run_exit_monitor<F>(
    positions: &PositionManager,
    market: &dyn MarketData,
    sell_fn: F,
    trade_log: &TradeLog,
    shutdown: &Shutdown,
    config: &TradingConfig,
) where
    F: Fn(&str, f64, f64) -> Option<f64>,
{
    let interval = Duration::from_secs(config.exit_check_interval_secs);
    info!(interval_secs = config.exit_check_interval_secs, "exit monitor started");

    while !shutdown.is_signalled() {
        tick(positions, market, &sell_fn, trade_log);
        if shutdown.wait_timeout(interval) {
            break;
        }
    }

    info!("exit monitor stopped");
}

fn tick<F>(positions: &PositionManager, market: &dyn MarketData, sell_fn: &F, trade_log: &TradeLog)
where
    F: Fn(&str, f64, f64) -> Option<f64>,
{
    let open = positions.positions();
    if open.is_empty() {
        return;
    }

    let tickers: Vec<String> = open.iter().map(|p| p.ticker.clone()).collect();
    let prices = match market.current_prices(&tickers) {
        Ok(prices) => prices,
        Err(e) => {
            error!(error = %e, "price fetch failed, skipping tick");
            return;
        }
    };

    for position in &open {
        let current_price = match prices.get(&position.ticker) {
            Some(&p) => p,
            None => {
                warn!(ticker = position.ticker, "no current price, skipping");
                continue;
            }
        };

        let exit = match positions.check_exit(&position.ticker, current_price) {
            Some(exit) => exit,
            None => {
                debug!(
                    ticker = position.ticker,
                    price = format!("{current_price:.4}"),
                    pnl = format!("{:.2}%", position.unrealized_pnl_rate(current_price) * 100.0),
                    "holding"
                );
                continue;
            }
        };

        warn!(
            ticker = exit.position.ticker,
            reason = %exit.reason,
            price = format!("{current_price:.4}"),
            "exit triggered"
        );

        let fill_price = match sell_fn(&exit.position.ticker, exit.position.quantity, current_price)
        {
            Some(price) if price > 0.0 => price,
            Some(_) => current_price,
            None => {
                warn!(
                    ticker = exit.position.ticker,
                    "exit sell failed, keeping position for next tick"
                );
                continue;
            }
        };

        if let Some(summary) = positions.close_position(&exit.position.ticker, fill_price, exit.reason)
        {
            info!(
                ticker = summary.ticker,
                pnl = format!("{:.2}%", summary.pnl_rate * 100.0),
                pnl_krw = format!("{:.0}", summary.pnl_krw),
                held = format!("{:.2}h", summary.hold_hours),
                "exit complete"
            );
            if let Err(e) = trade_log.append(&summary) {
                warn!(error = %e, "failed to append trade history");
            }
        }
    }
}
