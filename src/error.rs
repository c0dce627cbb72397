use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: missing required fields: {}", .0.join(", "))]
    Validation(Vec<&'static str>),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<crate::auth::TokenError> for AppError {
    fn from(err: crate::auth::TokenError) -> Self {
        AppError::Auth(err.to_string())
    }
}

impl From<crate::eth::GatewayError> for AppError {
    fn from(err: crate::eth::GatewayError) -> Self {
        AppError::Gateway(err.to_string())
    }
}

// Axum IntoResponse implementation for HTTP errors
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, body) = match self {
            AppError::Validation(missing) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": "missing required fields",
                    "missing": missing,
                }),
            ),
            AppError::Auth(msg) => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": msg }),
            ),
            AppError::Gateway(msg) => (
                StatusCode::BAD_GATEWAY,
                serde_json::json!({ "error": msg }),
            ),
            AppError::Database(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": format!("Database error: {}", err) }),
            ),
            AppError::Crypto(msg) | AppError::Config(msg) | AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": msg }),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
