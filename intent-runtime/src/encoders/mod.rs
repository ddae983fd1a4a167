//! Pure calldata encoders. Each function returns a [`ContractCall`] ready to
//! be placed in a hub call batch, or raw calldata for a spoke transaction.
//!
//! [`ContractCall`]: crate::types::ContractCall

pub mod asset_manager;
pub mod erc20;
pub mod intents;
pub mod pool;
pub mod vault_token;

pub use pool::PoolEncoder;
