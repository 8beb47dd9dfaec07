use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::nutrition::NutritionError;

/// Shown to the user whenever photo analysis or recipe suggestion fails.
pub const AI_FAILURE_MESSAGE: &str = "could not identify food, please try a clearer photo";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Nutrition(#[from] NutritionError),

    #[error("could not identify food, please try a clearer photo")]
    AiUnavailable(#[source] anyhow::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Nutrition(NutritionError::InvalidArgument(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Nutrition(NutritionError::InvalidMealData(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::AiUnavailable(e) => {
                error!(error = %e, "ai request failed");
                (StatusCode::BAD_GATEWAY, AI_FAILURE_MESSAGE.to_string())
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
            (AppError::Conflict("taken".into()), StatusCode::CONFLICT),
            (AppError::NotFound("meal"), StatusCode::NOT_FOUND),
            (
                NutritionError::InvalidArgument("bad index".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                NutritionError::InvalidMealData("no ingredients".into()).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::AiUnavailable(anyhow::anyhow!("timeout")),
                StatusCode::BAD_GATEWAY,
            ),
            (anyhow::anyhow!("db down").into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn ai_failure_uses_fixed_message() {
        let err = AppError::AiUnavailable(anyhow::anyhow!("quota exceeded"));
        assert_eq!(err.to_string(), AI_FAILURE_MESSAGE);
    }
}
