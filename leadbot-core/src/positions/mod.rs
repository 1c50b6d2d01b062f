//! Position book, its durable store, and the closed-trade history.

pub mod history;
pub mod manager;
pub mod store;

pub use history::TradeLog;
pub use manager::{ExitSignal, PositionManager};
pub use store::{StateError, StateStore};
