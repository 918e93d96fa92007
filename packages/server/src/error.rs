//! API error type and its HTTP mapping.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use lead_forge_database::DbError;
use lead_forge_server_models::{ErrorBody, FieldError};

/// Every failure a handler can report.
///
/// Internal errors carry detail for the log only; clients see a generic
/// message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Input failed validation.
    #[error("{message}")]
    Invalid {
        message: String,
        errors: Vec<FieldError>,
    },

    /// Malformed request that has no per-field detail.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// A validation failure with the standard message.
    #[must_use]
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Invalid {
            message: "Validation error".to_string(),
            errors,
        }
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Conflict { .. } => Self::Conflict("Resource already exists".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Invalid { .. } | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Internal(detail) = self {
            log::error!("Internal error: {detail}");
        }

        let errors = match self {
            Self::Invalid { errors, .. } => Some(errors.clone()),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            message: self.to_string(),
            errors,
        })
    }
}
