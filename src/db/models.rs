use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: Vec<u8>,
    #[serde(skip_serializing)]
    pub password_salt: Vec<u8>,
    /// Blockchain address; empty until the user saves one.
    pub address: String,
    /// Encryption public key the frontend publishes for this address.
    pub public_key: Option<String>,
    pub created_at: i64,
}

/// One stored chat message. Contents are duplicated because the client
/// encrypts a copy for each participant.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub recv_address: String,
    pub send_address: String,
    pub recv_name: String,
    pub send_name: String,
    pub timestamp: String,
    pub recv_contents: String,
    pub send_contents: String,
    pub created_at: i64,
}

/// Counterparty derived from the message history of one address.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Contact {
    pub address: String,
    pub name: String,
}

/// The deployed ledger contract, persisted so restarts can reuse it.
#[derive(Debug, Clone, FromRow)]
pub struct ContractRecord {
    pub address: String,
    pub abi: String,
    pub deployed_at: i64,
}
