use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::handoff::HandoffError;
use crate::quiz::generator::GenerationError;

pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate questions. Please try again later.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant leaves the client in a navigable state: the body names a recovery
/// action (`retry` or `return_home`) where one applies.
#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The model call failed or its output was unusable.
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// A handoff entry a view depends on is absent or unreadable.
    #[error("Missing state: {0}")]
    MissingState(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The requested action is not allowed in the current session phase.
    #[error("Invalid state: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Handoff(#[from] HandoffError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// What the client should offer the user after an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    Retry,
    ReturnHome,
}

impl RecoveryAction {
    fn as_str(&self) -> &'static str {
        match self {
            RecoveryAction::Retry => "retry",
            RecoveryAction::ReturnHome => "return_home",
        }
    }
}

impl AppError {
    /// The message shown to end users. Generation and storage details are never exposed.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::MissingState(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Generation(_) => GENERATION_FAILED_MESSAGE.to_string(),
            AppError::Handoff(_) => "A storage error occurred".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    pub fn recovery(&self) -> Option<RecoveryAction> {
        match self {
            AppError::Generation(_) | AppError::Handoff(_) => Some(RecoveryAction::Retry),
            AppError::MissingState(_) | AppError::NotFound(_) => Some(RecoveryAction::ReturnHome),
            AppError::Validation(_) | AppError::Conflict(_) | AppError::Internal(_) => None,
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Generation(_) => (StatusCode::BAD_GATEWAY, "GENERATION_ERROR"),
            AppError::MissingState(_) => (StatusCode::NOT_FOUND, "MISSING_STATE"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "INVALID_STATE"),
            AppError::Handoff(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            // Generation causes are logged where they happen.
            AppError::Handoff(e) => tracing::error!("Handoff storage error: {e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            _ => {}
        }

        let (status, code) = self.status_and_code();
        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.user_message(),
                "action": self.recovery().map(|a| a.as_str()),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_generation_error_hides_cause() {
        let (status, body) = body_json(AppError::Generation(GenerationError::NoJsonArray)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "GENERATION_ERROR");
        assert_eq!(body["error"]["message"], GENERATION_FAILED_MESSAGE);
        assert_eq!(body["error"]["action"], "retry");
    }

    #[tokio::test]
    async fn test_missing_state_offers_return_home() {
        let (status, body) =
            body_json(AppError::MissingState("No test results found.".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "MISSING_STATE");
        assert_eq!(body["error"]["message"], "No test results found.");
        assert_eq!(body["error"]["action"], "return_home");
    }

    #[tokio::test]
    async fn test_validation_has_no_action() {
        let (status, body) = body_json(AppError::Validation("too long".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["action"].is_null());
    }
}
