//! Trading configuration.
//!
//! Every numeric threshold the engine uses lives here, loaded from an
//! optional TOML file over built-in defaults. Exchange credentials are taken
//! from the environment only (`UPBIT_ACCESS_KEY` / `UPBIT_SECRET_KEY`), never
//! from the config file; `DRY_RUN` in the environment overrides the file.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("live mode requires UPBIT_ACCESS_KEY and UPBIT_SECRET_KEY in the environment")]
    MissingCredentials,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TradingConfig {
    /// Simulation mode: no live orders are placed.
    pub dry_run: bool,
    /// Synthetic KRW balance used by the simulated gateway.
    pub sim_balance_krw: f64,

    // Risk management
    /// Fixed stop as a rate from entry, e.g. -0.10 for -10%.
    pub stop_loss_rate: f64,
    /// Trailing stop as a rate from the peak, e.g. -0.10 for -10%.
    pub trailing_stop_rate: f64,
    /// Unrealized gain required before the trailing stop arms.
    pub trailing_activation_rate: f64,

    // Position sizing
    pub max_concurrent_positions: usize,
    pub max_single_position_ratio: f64,
    pub max_invested_ratio: f64,
    pub max_risk_per_trade: f64,
    /// Exchange minimum order notional.
    pub min_order_krw: f64,

    // Leader scanner
    pub leader_top_n: usize,
    pub volume_surge_window: usize,
    pub volume_surge_min_ratio: f64,
    pub min_volume_krw_24h: f64,

    // Technical indicators
    pub candle_interval: String,
    pub candle_count: usize,
    pub ema_fast: usize,
    pub ema_mid: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub rsi_entry_min: f64,
    pub rsi_entry_max: f64,
    pub adx_period: usize,
    pub adx_threshold: f64,
    pub atr_period: usize,
    pub entry_score_threshold: u32,

    // Scheduling
    pub scan_interval_secs: u64,
    pub exit_check_interval_secs: u64,

    // Persistence
    pub state_dir: String,

    #[serde(skip)]
    pub access_key: String,
    #[serde(skip)]
    pub secret_key: String,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            sim_balance_krw: 10_000_000.0,

            stop_loss_rate: -0.10,
            trailing_stop_rate: -0.10,
            trailing_activation_rate: 0.05,

            max_concurrent_positions: 5,
            max_single_position_ratio: 0.20,
            max_invested_ratio: 0.80,
            max_risk_per_trade: 0.02,
            min_order_krw: 5_000.0,

            leader_top_n: 5,
            volume_surge_window: 20,
            volume_surge_min_ratio: 1.5,
            min_volume_krw_24h: 5_000_000_000.0,

            candle_interval: "minute60".to_string(),
            candle_count: 200,
            ema_fast: 9,
            ema_mid: 21,
            ema_slow: 50,
            rsi_period: 14,
            rsi_entry_min: 35.0,
            rsi_entry_max: 65.0,
            adx_period: 14,
            adx_threshold: 20.0,
            atr_period: 14,
            entry_score_threshold: 70,

            scan_interval_secs: 300,
            exit_check_interval_secs: 5,

            state_dir: "state".to_string(),

            access_key: String::new(),
            secret_key: String::new(),
        }
    }
}

impl TradingConfig {
    /// Load the config: defaults, overlaid by the TOML file when given,
    /// overlaid by the environment (credentials, `DRY_RUN`).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)?;
                toml::from_str(&text)?
            }
            None => Self::default(),
        };

        config.access_key = std::env::var("UPBIT_ACCESS_KEY").unwrap_or_default();
        config.secret_key = std::env::var("UPBIT_SECRET_KEY").unwrap_or_default();
        if let Ok(v) = std::env::var("DRY_RUN") {
            config.dry_run = v.eq_ignore_ascii_case("true") || v == "1";
        }

        Ok(config)
    }

    /// Startup validation. Any error here is fatal before trading begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dry_run && (self.access_key.is_empty() || self.secret_key.is_empty()) {
            return Err(ConfigError::MissingCredentials);
        }
        if !(-1.0 < self.stop_loss_rate && self.stop_loss_rate < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "stop_loss_rate must be in (-1, 0), got {}",
                self.stop_loss_rate
            )));
        }
        if !(-1.0 < self.trailing_stop_rate && self.trailing_stop_rate < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "trailing_stop_rate must be in (-1, 0), got {}",
                self.trailing_stop_rate
            )));
        }
        if self.trailing_activation_rate <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "trailing_activation_rate must be > 0, got {}",
                self.trailing_activation_rate
            )));
        }
        if self.max_concurrent_positions < 1 {
            return Err(ConfigError::Invalid(
                "max_concurrent_positions must be >= 1".to_string(),
            ));
        }
        if self.min_order_krw <= 0.0 {
            return Err(ConfigError::Invalid(
                "min_order_krw must be > 0".to_string(),
            ));
        }
        crate::data::upbit::candle_path(&self.candle_interval)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = TradingConfig::default();
        cfg.validate().unwrap();
    }

    #[test]
    fn live_mode_without_credentials_is_fatal() {
        let cfg = TradingConfig {
            dry_run: false,
            ..TradingConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MissingCredentials)
        ));
    }

    #[test]
    fn rejects_positive_stop_loss_rate() {
        let cfg = TradingConfig {
            stop_loss_rate: 0.10,
            ..TradingConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_unknown_candle_interval() {
        let cfg = TradingConfig {
            candle_interval: "fortnight".to_string(),
            ..TradingConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn toml_overlay_keeps_defaults_for_missing_fields() {
        let cfg: TradingConfig =
            toml::from_str("stop_loss_rate = -0.05\nleader_top_n = 3\n").unwrap();
        assert_eq!(cfg.stop_loss_rate, -0.05);
        assert_eq!(cfg.leader_top_n, 3);
        assert_eq!(cfg.max_concurrent_positions, 5);
        assert_eq!(cfg.candle_interval, "minute60");
    }

    #[test]
    fn toml_rejects_unknown_fields() {
        let parsed: Result<TradingConfig, _> = toml::from_str("stop_loss = -0.05\n");
        assert!(parsed.is_err());
    }
}
