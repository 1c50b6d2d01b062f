//! Leadbot CLI — scan, score, and run commands.
//!
//! Commands:
//! - `scan` — one leader scan over the KRW universe, printed as a table
//! - `score <ticker>` — one entry evaluation for a single market
//! - `run` — the trading engine (scan cycle + exit monitor) until stopped

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use leadbot_core::config::TradingConfig;
use leadbot_core::data::UpbitMarketData;
use leadbot_core::engine::Engine;
use leadbot_core::entry::compute_entry_score;
use leadbot_core::execution::SimulatedGateway;
use leadbot_core::scanner::{fetch_ohlcv, scan_market_leaders};

#[derive(Parser)]
#[command(name = "leadbot", about = "Live market-leader trading engine for Upbit KRW markets")]
struct Cli {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the market once and print the leader ranking.
    Scan,
    /// Compute the entry score for one market (e.g. KRW-ETH).
    Score { ticker: String },
    /// Run the trading engine until stopped.
    Run {
        /// Execute a single scan cycle and exit (no exit monitor).
        #[arg(long, default_value_t = false)]
        once: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = TradingConfig::load(cli.config.as_deref()).context("loading config")?;
    config.validate().context("validating config")?;
    let config = Arc::new(config);

    match cli.command {
        Commands::Scan => scan(&config),
        Commands::Score { ticker } => score(&config, &ticker),
        Commands::Run { once } => run(config, once),
    }
}

fn scan(config: &TradingConfig) -> Result<()> {
    let market = UpbitMarketData::new();
    let leaders = scan_market_leaders(&market, config);
    if leaders.is_empty() {
        println!("No leader candidates this cycle.");
        return Ok(());
    }

    println!(
        "{:<4} {:<12} {:>9} {:>6} {:>6} {:>6} {:>6} {:>8}",
        "#", "ticker", "composite", "vol", "mom", "rs", "liq", "surge"
    );
    for (rank, l) in leaders.iter().enumerate() {
        println!(
            "{:<4} {:<12} {:>9.1} {:>6.0} {:>6.0} {:>6.0} {:>6.0} {:>7.1}x",
            rank + 1,
            l.ticker,
            l.composite_score,
            l.volume_score,
            l.momentum_score,
            l.rs_score,
            l.liquidity_score,
            l.volume_ratio,
        );
    }
    Ok(())
}

fn score(config: &TradingConfig, ticker: &str) -> Result<()> {
    let market = UpbitMarketData::new();
    let candles = fetch_ohlcv(&market, ticker, config)
        .with_context(|| format!("no usable candle series for {ticker}"))?;
    let eval = compute_entry_score(&candles, config);

    println!(
        "{ticker}: score {} / 100 ({})",
        eval.score,
        if eval.entry_recommended { "entry recommended" } else { "wait" }
    );
    println!(
        "  signals: {}",
        if eval.signals.active_labels().is_empty() {
            "none".to_string()
        } else {
            eval.signals.active_labels()
        }
    );
    let ind = &eval.indicators;
    println!(
        "  ema {:.2}/{:.2}/{:.2}  macd_hist {:.4}  rsi {:.1}  adx {:.1}",
        ind.ema_fast, ind.ema_mid, ind.ema_slow, ind.macd_hist, ind.rsi, ind.adx
    );
    println!(
        "  atr {:.4}  bb_mid {:.2}  volume {:.2}x  price {:.2}",
        ind.atr, ind.bb_mid, ind.volume_ratio, ind.current_price
    );
    Ok(())
}

fn run(config: Arc<TradingConfig>, once: bool) -> Result<()> {
    if !config.dry_run {
        // The signing exchange client is an external collaborator; this
        // binary only wires the simulated gateway.
        bail!("live mode needs an order gateway wired in; only dry-run is available here");
    }

    let market = Arc::new(UpbitMarketData::new());
    let gateway = Arc::new(SimulatedGateway::new(config.sim_balance_krw));
    let engine = Engine::new(config, market, gateway);

    if once {
        engine.scan_and_trade();
    } else {
        engine.run();
    }
    Ok(())
}
