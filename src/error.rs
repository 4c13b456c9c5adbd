use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::database::StoreError;

/// 业务错误，每个变体对应一个 HTTP 状态码
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            StoreError::Conflict(what) => AppError::Conflict(what),
            StoreError::Reference(what) => {
                AppError::NotFound(format!("referenced record is missing: {what}"))
            }
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
            StoreError::Query(msg) => AppError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 5xx 不向客户端暴露内部细节
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::validation("bad"), StatusCode::BAD_REQUEST)]
    #[case(AppError::unauthenticated("who"), StatusCode::UNAUTHORIZED)]
    #[case(AppError::forbidden("no"), StatusCode::FORBIDDEN)]
    #[case(AppError::not_found("gone"), StatusCode::NOT_FOUND)]
    #[case(AppError::Conflict("dup".into()), StatusCode::CONFLICT)]
    #[case(AppError::StoreUnavailable("down".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_mapping(#[case] err: AppError, #[case] expected: StatusCode) {
        assert_eq!(err.status(), expected);
        assert_eq!(err.into_response().status(), expected);
    }

    #[test]
    fn test_store_error_conversion() {
        let err: AppError = StoreError::Conflict("review already exists".into()).into();
        assert_eq!(err, AppError::Conflict("review already exists".into()));

        let err: AppError = StoreError::Reference("reviews_recipe_id_fkey".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: AppError = StoreError::Unavailable("timeout".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
