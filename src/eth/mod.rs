pub mod contract;
pub mod gateway;

pub use gateway::{Bootstrap, EthGateway};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Invalid ledger configuration: {0}")]
    Config(String),
}

/// The most recent transfer recorded on the ledger contract.
#[derive(Debug, Clone, Serialize)]
pub struct LastTransaction {
    pub sender: String,
    pub recipient: String,
    pub amount: String,
    pub timestamp: String,
}

/// Address and ABI the frontend needs to talk to the contract directly.
#[derive(Debug, Clone, Serialize)]
pub struct ContractDescriptor {
    pub address: String,
    pub abi: serde_json::Value,
}

/// Boundary to the blockchain-resident ledger. Handlers depend on this trait
/// so tests can substitute a stub for the live chain client.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn last_transaction(&self) -> Result<LastTransaction, GatewayError>;

    fn descriptor(&self) -> ContractDescriptor;

    /// Transfers the configured faucet amount from the operator key to
    /// `target`. Best-effort; callers degrade failures to a result code.
    async fn request_funds(&self, target: &str) -> Result<(), GatewayError>;
}
