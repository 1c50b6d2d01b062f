//! End-to-end lifecycle of a position: open, stop tracking, exit, restart.

use std::sync::Arc;

use leadbot_core::config::TradingConfig;
use leadbot_core::domain::ExitReason;
use leadbot_core::positions::PositionManager;

fn config_in(dir: &tempfile::TempDir) -> Arc<TradingConfig> {
    Arc::new(TradingConfig {
        state_dir: dir.path().to_string_lossy().into_owned(),
        ..TradingConfig::default()
    })
}

#[test]
fn full_trailing_stop_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let mgr = PositionManager::new(config_in(&dir));

    mgr.open_position("KRW-ETH", 100.0, 10.0, 1_000_000.0, 80.0, 65.0);

    // Below activation: peak ratchets, nothing fires.
    assert!(mgr.check_exit("KRW-ETH", 104.0).is_none());

    // +6%: trailing arms, peak 106.
    assert!(mgr.check_exit("KRW-ETH", 106.0).is_none());

    // Pullback above the trailing level: still held.
    assert!(mgr.check_exit("KRW-ETH", 100.0).is_none());

    // At peak * 0.9 the trailing stop fires; the peak must still be 106.
    let trigger = 106.0 * 0.9;
    let exit = mgr.check_exit("KRW-ETH", trigger).unwrap();
    assert_eq!(exit.reason, ExitReason::TrailingStop);
    assert_eq!(exit.position.peak_price, 106.0);
    assert!(exit.position.trailing_active);

    let summary = mgr
        .close_position("KRW-ETH", trigger, exit.reason)
        .unwrap();
    assert_eq!(summary.pnl_rate, trigger / 100.0 - 1.0);
    assert_eq!(summary.pnl_krw, 1_000_000.0 * summary.pnl_rate);
    assert_eq!(summary.peak_price, 106.0);
    assert_eq!(summary.reason, ExitReason::TrailingStop);
    assert_eq!(mgr.count(), 0);
}

#[test]
fn stop_loss_beats_trailing_stop() {
    let dir = tempfile::tempdir().unwrap();
    let mgr = PositionManager::new(config_in(&dir));

    mgr.open_position("KRW-ETH", 100.0, 10.0, 1_000_000.0, 80.0, 65.0);
    assert!(mgr.check_exit("KRW-ETH", 120.0).is_none()); // trailing armed, peak 120

    // 89 is below both the trailing level (108) and the hard stop (90):
    // the hard stop wins.
    let exit = mgr.check_exit("KRW-ETH", 89.0).unwrap();
    assert_eq!(exit.reason, ExitReason::StopLoss);
}

#[test]
fn restart_preserves_risk_state() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    {
        let mgr = PositionManager::new(config.clone());
        mgr.open_position("KRW-ETH", 100.0, 10.0, 1_000_000.0, 80.0, 65.0);
        mgr.open_position("KRW-XRP", 700.0, 3.0, 2_100.0, 72.0, 55.0);
        // A close rewrites the file with the surviving set.
        mgr.close_position("KRW-XRP", 700.0, ExitReason::StopLoss);
    }

    let restored = PositionManager::new(config);
    assert_eq!(restored.count(), 1);
    assert!(restored.has_position("KRW-ETH"));
    assert!(!restored.has_position("KRW-XRP"));

    let position = &restored.positions()[0];
    assert_eq!(position.entry_price, 100.0);
    assert_eq!(position.quantity, 10.0);
    assert_eq!(position.invested_krw, 1_000_000.0);
    assert_eq!(position.peak_price, 100.0);
    assert!(!position.trailing_active);
    assert!((position.stop_loss_price - 90.0).abs() < 1e-9);

    // The restored book keeps enforcing stops where it left off.
    let exit = restored.check_exit("KRW-ETH", 89.0).unwrap();
    assert_eq!(exit.reason, ExitReason::StopLoss);
}
