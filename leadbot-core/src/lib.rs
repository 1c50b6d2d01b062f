//! Leadbot core — live market-leader trading engine.
//!
//! The decision pipeline, leaves first:
//! - Indicator library: pure series math (EMA, RSI, MACD, ADX, ATR, Bollinger)
//! - Entry scoring: bounded composite score plus signal flags per candidate
//! - Leader scanner: volume/momentum/relative-strength/liquidity ranking
//!   over the KRW universe
//! - Position manager: ATR-risk sizing, fixed stop + trailing stop state
//!   machine, JSON persistence across restarts
//! - Order execution: bounded retry with exponential backoff over a
//!   gateway trait (simulated gateway included)
//! - Exit monitor: fast price-polling loop forcing stop exits
//! - Engine: the scan cycle and the monitor wired to one shared position
//!   book and one shutdown signal

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod entry;
pub mod execution;
pub mod indicators;
pub mod monitor;
pub mod positions;
pub mod scanner;
pub mod shutdown;
