use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

/// The full vocabulary of client-visible failures. Every handler reports
/// errors through this enum; no numeric status code appears anywhere else.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// Carries internal detail for the logs; the wire response is generic.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(%status, detail = %self, "request failed");
            "На сервере произошла ошибка".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

/// Default translation of persistence failures. Handlers that need a
/// context-specific message match on the `StoreError` themselves and fall
/// back to this for the rest; once an `ApiError` exists it is never
/// converted again.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(_) | StoreError::Cast(_) => {
                ApiError::BadRequest("Данные не прошли валидацию".into())
            }
            StoreError::Duplicate(_) => {
                ApiError::Conflict("Такой емейл уже зарегистрирован".into())
            }
            StoreError::NotFound => {
                ApiError::NotFound("Запрашиваемый ресурс не найден".into())
            }
            StoreError::Other(e) => ApiError::Internal(e.to_string()),
        }
    }
}
