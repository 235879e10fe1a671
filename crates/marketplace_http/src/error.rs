//! Error mapping from repository outcomes to HTTP responses.
//!
//! Body shape: `{"error": {"code": "...", "message": "..."}}`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use marketplace_core::RepoError;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ApiResult<T> = Result<T, ApiError>;

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug)]
pub enum ApiError {
    Repo(RepoError),
    /// Body or path could not be decoded.
    InvalidRequest(String),
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable code carried in the error body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Repo(RepoError::NotFound { .. }) => "not_found",
            Self::Repo(RepoError::Validation(_)) => "validation_error",
            Self::Repo(RepoError::ForeignKey { .. }) => "foreign_key_error",
            Self::Repo(RepoError::UniqueViolation { .. }) => "unique_violation",
            Self::Repo(RepoError::Db(_) | RepoError::InvalidData(_)) | Self::Internal(_) => {
                "internal_error"
            }
            Self::InvalidRequest(_) => "invalid_request",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Repo(RepoError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Repo(RepoError::Validation(_) | RepoError::ForeignKey { .. })
            | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Repo(RepoError::UniqueViolation { .. }) => StatusCode::CONFLICT,
            Self::Repo(RepoError::Db(_) | RepoError::InvalidData(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::InvalidRequest(message) | Self::Internal(message) => f.write_str(message),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::InvalidRequest(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::InvalidRequest(value.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(
                "event=http_error module=http status=error error_code={} error={self}",
                self.code()
            );
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}
