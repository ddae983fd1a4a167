use std::fmt;

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::error::IntentError;

/// Opaque chain identifier, e.g. `"sonic"` or `"0xa4b1.arbitrum"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Execution model of a chain. `Hub` is the EVM chain that hosts the lending
/// pool and the vaults; it executes calls through per-user routers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainFamily {
    Hub,
    Evm,
    Solana,
    Sui,
    Stellar,
    Injective,
    Icon,
    Near,
}

impl ChainFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainFamily::Hub => "hub",
            ChainFamily::Evm => "evm",
            ChainFamily::Solana => "solana",
            ChainFamily::Sui => "sui",
            ChainFamily::Stellar => "stellar",
            ChainFamily::Injective => "injective",
            ChainFamily::Icon => "icon",
            ChainFamily::Near => "near",
        }
    }

    /// Encode an account address of this family into the byte form used by
    /// the wallet factory, the asset managers and swap intents.
    ///
    /// EVM families use the raw 20 bytes, Sui the hex-decoded 32 bytes; the
    /// remaining families carry their canonical string form as UTF-8.
    pub fn encode_address(&self, address: &str) -> Result<Bytes, IntentError> {
        if address.trim().is_empty() {
            return Err(IntentError::EncodingError("empty address".into()));
        }
        match self {
            ChainFamily::Hub | ChainFamily::Evm => {
                let addr = parse_address(address)?;
                Ok(Bytes::copy_from_slice(addr.as_slice()))
            }
            ChainFamily::Sui => {
                let stripped = address.strip_prefix("0x").unwrap_or(address);
                let raw = hex::decode(stripped).map_err(|e| {
                    IntentError::EncodingError(format!("Invalid Sui address '{address}': {e}"))
                })?;
                Ok(Bytes::from(raw))
            }
            ChainFamily::Solana
            | ChainFamily::Stellar
            | ChainFamily::Injective
            | ChainFamily::Icon
            | ChainFamily::Near => Ok(Bytes::copy_from_slice(address.as_bytes())),
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a hex address string into an alloy Address.
pub fn parse_address(addr: &str) -> Result<Address, IntentError> {
    addr.parse::<Address>()
        .map_err(|e| IntentError::EncodingError(format!("Invalid address '{addr}': {e}")))
}

/// Token metadata as configured for one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub address: String,
    pub decimals: u8,
    pub chain_id: ChainId,
}

/// Hub-side representation of a spoke token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubAssetInfo {
    /// Bridged hub asset (same decimals as the spoke token).
    pub asset: Address,
    /// Vault token used for pool accounting (18 decimals).
    pub vault: Address,
    /// Decimal exponent of `asset`.
    pub decimals: u8,
}

impl HubAssetInfo {
    /// The asset is already the vault token; no wrap/unwrap calls are emitted.
    pub fn is_vault_denominated(&self) -> bool {
        self.asset == self.vault
    }
}

/// Economic action of an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Supply,
    Borrow,
    Withdraw,
    Repay,
    Swap,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Supply => "supply",
            Action::Borrow => "borrow",
            Action::Withdraw => "withdraw",
            Action::Repay => "repay",
            Action::Swap => "swap",
        }
    }

    /// Upper-case name used in error codes.
    pub fn code_name(&self) -> &'static str {
        match self {
            Action::Supply => "SUPPLY",
            Action::Borrow => "BORROW",
            Action::Withdraw => "WITHDRAW",
            Action::Repay => "REPAY",
            Action::Swap => "SWAP",
        }
    }

    /// Actions that move funds from the spoke into the hub (submitted as a
    /// deposit). The others act on an existing hub balance.
    pub fn is_value_bearing(&self) -> bool {
        matches!(self, Action::Supply | Action::Repay | Action::Swap)
    }

    /// Actions that deliver funds to a destination account.
    pub fn delivers_funds(&self) -> bool {
        matches!(self, Action::Borrow | Action::Withdraw | Action::Swap)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a money-market intent.
///
/// `token` is a spoke token address on the relevant chain: the destination
/// chain for borrow/withdraw, the source chain otherwise. `amount` is in that
/// token's native decimals. `from_*` overrides are honoured for borrow only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionParams {
    pub action: Action,
    pub token: String,
    pub amount: U256,
    pub to_chain_id: Option<ChainId>,
    pub to_address: Option<String>,
    pub from_chain_id: Option<ChainId>,
    pub from_address: Option<String>,
}

/// One atomic call executed by a hub wallet or a router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub address: Address,
    pub value: U256,
    pub data: Bytes,
}

/// Unsigned transaction payload handed back to callers that sign themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub from: String,
    pub to: String,
    pub value: U256,
    pub data: Bytes,
}

pub type TxHash = String;

/// Either an unsigned payload or the hash of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxResult {
    Raw(RawTransaction),
    Submitted(TxHash),
}

impl TxResult {
    pub fn tx_hash(&self) -> Option<&str> {
        match self {
            TxResult::Submitted(hash) => Some(hash),
            TxResult::Raw(_) => None,
        }
    }

    pub fn raw(&self) -> Option<&RawTransaction> {
        match self {
            TxResult::Raw(tx) => Some(tx),
            TxResult::Submitted(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketStatus {
    Pending,
    Validating,
    Executing,
    Executed,
    Failed,
}

impl PacketStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PacketStatus::Executed | PacketStatus::Failed)
    }
}

/// Cross-chain packet reported by the relay network for a source transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPacket {
    pub src_chain_id: u64,
    pub src_tx_hash: String,
    pub dst_chain_id: u64,
    #[serde(default)]
    pub dst_tx_hash: String,
    pub status: PacketStatus,
    #[serde(default)]
    pub signatures: Vec<String>,
}

/// Final hashes of a settled intent. Equal when execution happened on the hub
/// without a relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettledIntent {
    pub spoke_tx_hash: TxHash,
    pub hub_tx_hash: TxHash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEstimate {
    pub gas_limit: u64,
}
