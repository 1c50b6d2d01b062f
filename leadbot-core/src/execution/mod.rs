//! Order execution: the gateway contract and the retrying executor.

pub mod executor;
pub mod gateway;

pub use executor::{backoff_delay, OrderExecutor};
pub use gateway::{GatewayError, GatewayFill, OrderGateway, SimulatedGateway};
