use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::middleware::CurrentUser;
use crate::api::require;
use crate::api::state::AppState;
use crate::error::AppError;
use crate::eth::LastTransaction;

#[derive(Debug, Deserialize)]
pub struct FundsRequest {
    pub address: Option<String>,
}

/// GET /api/ - last transaction recorded on the ledger contract
pub async fn home(State(state): State<AppState>) -> Result<Json<LastTransaction>, AppError> {
    let last = state.gateway.last_transaction().await?;
    Ok(Json(last))
}

/// POST /api/info (requires auth) - contract descriptor plus caller identity
pub async fn info(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<Value> {
    let descriptor = state.gateway.descriptor();
    Json(json!({
        "address": descriptor.address,
        "abi": descriptor.abi,
        "userAddr": user.address,
        "username": user.username,
    }))
}

/// POST /api/poor (requires auth) - best-effort faucet transfer; failure is a
/// degraded result code, never an error response
pub async fn poor(
    State(state): State<AppState>,
    Json(req): Json<FundsRequest>,
) -> Result<Json<Value>, AppError> {
    let mut missing = Vec::new();
    let Some(address) = require(&mut missing, "address", req.address) else {
        return Err(AppError::Validation(missing));
    };

    match state.gateway.request_funds(&address).await {
        Ok(()) => Ok(Json(json!({ "result": 1 }))),
        Err(e) => {
            tracing::warn!("Funds request for {} failed: {}", address, e);
            Ok(Json(json!({ "result": 0 })))
        }
    }
}

/// POST /api/provider - RPC endpoint the frontend should connect to
pub async fn provider(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "result": state.config.rpc_url }))
}
