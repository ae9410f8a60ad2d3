//! Error taxonomy for cart operations
//!
//! Every failure a handler can produce ends up as a `CartError`, which knows
//! its HTTP status and the machine-readable `code` sent to clients.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ai::AiError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl CartError {
    pub fn status(&self) -> StatusCode {
        match self {
            CartError::Validation(_) => StatusCode::BAD_REQUEST,
            CartError::NotFound(_) => StatusCode::NOT_FOUND,
            CartError::AlreadyExists(_) => StatusCode::CONFLICT,
            CartError::Upstream(_) => StatusCode::BAD_GATEWAY,
            CartError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CartError::Validation(_) => "VALIDATION_ERROR",
            CartError::NotFound(_) => "NOT_FOUND",
            CartError::AlreadyExists(_) => "ALREADY_EXISTS",
            CartError::Upstream(_) => "UPSTREAM_ERROR",
            CartError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub(crate) fn cart_not_found(conversation_id: &str) -> Self {
        CartError::NotFound(format!(
            "Cart not found for conversation ID: {}",
            conversation_id
        ))
    }

    pub(crate) fn item_not_found(item_id: &str) -> Self {
        CartError::NotFound(format!("Item not found in cart: {}", item_id))
    }
}

/// Body sent for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::warn!(code = self.code(), error = %self, "request rejected");
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for CartError {
    fn from(rejection: JsonRejection) -> Self {
        CartError::Validation(rejection.body_text())
    }
}

impl From<AiError> for CartError {
    fn from(err: AiError) -> Self {
        CartError::Upstream(err.to_string())
    }
}

pub type Result<T, E = CartError> = std::result::Result<T, E>;
