use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::middleware::CurrentUser;
use crate::api::require;
use crate::api::state::AppState;
use crate::db::messages::NewMessage;
use crate::db::{MessageRepository, UserRepository};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SaveAddressRequest {
    pub address: Option<String>,
    #[serde(rename = "public")]
    pub public_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMessageRequest {
    pub recv_address: Option<String>,
    pub send_address: Option<String>,
    pub recv_name: Option<String>,
    pub send_name: Option<String>,
    // Clients send numeric or string timestamps; both are kept verbatim
    pub timestamp: Option<Value>,
    pub recv_contents: Option<String>,
    pub send_contents: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMessagesRequest {
    pub recv_address: Option<String>,
    pub send_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PublicKeyRequest {
    pub address: Option<String>,
    pub username: Option<String>,
}

/// POST /api/saveAddress (requires auth) - sets the caller's address and key
pub async fn save_address(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<SaveAddressRequest>,
) -> Result<Json<Value>, AppError> {
    let mut missing = Vec::new();
    let address = require(&mut missing, "address", req.address);
    let public_key = require(&mut missing, "public", req.public_key);
    let (Some(address), Some(public_key)) = (address, public_key) else {
        return Err(AppError::Validation(missing));
    };

    UserRepository::save_address(&state.db, &user.id, &address, &public_key).await?;

    Ok(Json(json!({ "result": "success" })))
}

/// POST /api/contacts (requires auth)
pub async fn contacts(
    State(state): State<AppState>,
    Json(req): Json<AddressRequest>,
) -> Result<Json<Value>, AppError> {
    let mut missing = Vec::new();
    let Some(address) = require(&mut missing, "address", req.address) else {
        return Err(AppError::Validation(missing));
    };

    let contacts = MessageRepository::contacts(&state.db, &address).await?;
    Ok(Json(json!({ "result": contacts })))
}

/// POST /api/savemessage (requires auth)
pub async fn save_message(
    State(state): State<AppState>,
    Json(req): Json<SaveMessageRequest>,
) -> Result<Json<Value>, AppError> {
    let mut missing = Vec::new();
    let recv_address = require(&mut missing, "recvAddress", req.recv_address);
    let send_address = require(&mut missing, "sendAddress", req.send_address);
    let recv_name = require(&mut missing, "recvName", req.recv_name);
    let send_name = require(&mut missing, "sendName", req.send_name);
    let timestamp = require(&mut missing, "timestamp", req.timestamp);
    let recv_contents = require(&mut missing, "recvContents", req.recv_contents);
    let send_contents = require(&mut missing, "sendContents", req.send_contents);

    let (
        Some(recv_address),
        Some(send_address),
        Some(recv_name),
        Some(send_name),
        Some(timestamp),
        Some(recv_contents),
        Some(send_contents),
    ) = (
        recv_address,
        send_address,
        recv_name,
        send_name,
        timestamp,
        recv_contents,
        send_contents,
    )
    else {
        return Err(AppError::Validation(missing));
    };

    let timestamp = match timestamp {
        Value::String(s) => s,
        other => other.to_string(),
    };

    MessageRepository::create(
        &state.db,
        NewMessage {
            recv_address,
            send_address,
            recv_name,
            send_name,
            timestamp,
            recv_contents,
            send_contents,
        },
    )
    .await?;

    Ok(Json(json!({ "result": "success" })))
}

/// POST /api/getmessages (requires auth) - history between two addresses,
/// matched in either direction
pub async fn get_messages(
    State(state): State<AppState>,
    Json(req): Json<GetMessagesRequest>,
) -> Result<Json<Value>, AppError> {
    let mut missing = Vec::new();
    let recv_address = require(&mut missing, "recvAddress", req.recv_address);
    let send_address = require(&mut missing, "sendAddress", req.send_address);
    let (Some(recv_address), Some(send_address)) = (recv_address, send_address) else {
        return Err(AppError::Validation(missing));
    };

    let messages = MessageRepository::get_between(&state.db, &recv_address, &send_address).await?;
    Ok(Json(json!({ "result": messages })))
}

/// POST /api/public (requires auth) - public key stored for an address, or 0
pub async fn public_key(
    State(state): State<AppState>,
    Json(req): Json<PublicKeyRequest>,
) -> Result<Json<Value>, AppError> {
    let mut missing = Vec::new();
    let address = require(&mut missing, "address", req.address);
    require(&mut missing, "username", req.username);
    let Some(address) = address else {
        return Err(AppError::Validation(missing));
    };
    if !missing.is_empty() {
        return Err(AppError::Validation(missing));
    }

    let result = match UserRepository::public_key_by_address(&state.db, &address)
        .await?
        .flatten()
    {
        Some(key) => json!({ "result": key }),
        None => json!({ "result": 0 }),
    };

    Ok(Json(result))
}
