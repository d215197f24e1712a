use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use estate_common::validation::ValidationError;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to API callers as a status code plus `{"message", "error"?}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied. No token provided.")]
    Unauthorized,

    #[error("Invalid token.")]
    InvalidToken,

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(&'static str),

    /// Body, query or path that could not be parsed
    #[error("{0}")]
    MalformedRequest(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Not allowed")]
    Forbidden,

    #[error("Upload failed")]
    UploadFailed(String),

    /// Store or other infrastructure failure; `context` is the public message
    #[error("{context}")]
    Upstream {
        context: &'static str,
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn upstream(context: &'static str, source: anyhow::Error) -> Self {
        ApiError::Upstream { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken
            | ApiError::Validation(_)
            | ApiError::BadRequest(_)
            | ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::UploadFailed(_) | ApiError::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

macro_rules! malformed_from {
    ($($rejection:ty),+) => {
        $(impl From<$rejection> for ApiError {
            fn from(rejection: $rejection) -> Self {
                tracing::debug!("Rejected request: {}", rejection);
                ApiError::MalformedRequest(rejection.body_text())
            }
        })+
    };
}

malformed_from!(JsonRejection, QueryRejection, PathRejection, MultipartRejection);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::UploadFailed(detail) => {
                json!({"message": self.to_string(), "error": detail})
            }
            ApiError::Upstream { context, source } => {
                tracing::error!("{}: {:#}", context, source);
                json!({"message": context, "error": format!("{:#}", source)})
            }
            _ => json!({"message": self.to_string()}),
        };
        (status, Json(body)).into_response()
    }
}
