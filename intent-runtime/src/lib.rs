pub mod error;
pub mod types;
pub mod config;
pub mod contracts;
pub mod encoders;
pub mod decimals;
pub mod fees;
pub mod intent;
pub mod batch;
pub mod chain;
pub mod spoke;
pub mod evm_spoke;
pub mod hub;
pub mod relay;
pub mod solver_client;
pub mod allowance;
mod settlement;
pub mod money_market;
pub mod swap;

pub use config::ConfigService;
pub use error::{ActionError, IntentError, RelayError, RelayErrorCode};
pub use types::*;
pub use intent::{ActionParamsBuilder, SwapParams, SwapParamsBuilder};
pub use money_market::MoneyMarketService;
pub use swap::{SwapOutcome, SwapService};
