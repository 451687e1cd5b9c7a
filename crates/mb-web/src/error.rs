//! エラー型定義 (mb-web)

use axum::http::StatusCode;
use axum::Json;
use thiserror::Error;

use crate::handlers::ErrorResponse;

/// mb-web のエラー型
#[derive(Error, Debug)]
pub enum WebError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] mb_core::Error),
}

impl WebError {
    /// HTTP ステータスコードへの対応
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::SessionNotFound(_) | WebError::Core(mb_core::Error::SessionNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            WebError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<WebError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: WebError) -> Self {
        (
            err.status_code(),
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WebError::Core(mb_core::Error::SessionNotFound("x".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WebError::InvalidRequest("empty".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebError::Unavailable("no key".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            WebError::Server("bind".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
