use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

/// Errors surfaced by every food, entry and goal operation.
///
/// Missing foods during aggregation are not errors; they are skipped.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            CoreError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Sign in required".to_string(),
            ),
            CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            CoreError::InvalidArgument(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", msg.clone())
            }
            CoreError::Upstream(msg) => {
                tracing::warn!(error = %msg, "upstream failure");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
            }
            CoreError::Store(err) => {
                tracing::error!(error = ?err, "store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        let cases = [
            (CoreError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (CoreError::not_found("food", Uuid::nil()), StatusCode::NOT_FOUND),
            (CoreError::invalid("quantity must be positive"), StatusCode::BAD_REQUEST),
            (CoreError::Upstream("USDA API error: 401".into()), StatusCode::BAD_GATEWAY),
            (
                CoreError::Store(anyhow::anyhow!("connection reset")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn not_found_message_names_the_entity() {
        let id = Uuid::new_v4();
        let msg = CoreError::not_found("entry", id).to_string();
        assert_eq!(msg, format!("entry not found: {id}"));
    }
}
