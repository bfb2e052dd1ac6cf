use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error on field '{field}': {message}")]
    FieldValidation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Masked credential failure. Unknown email, wrong password and claim
    /// resolution problems all collapse into this variant so the response
    /// never distinguishes them.
    #[error("Username / password problem")]
    AuthenticationError,

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("No valid refresh token for user")]
    NoValidToken,

    #[error("More than one refresh token record matched")]
    AmbiguousTokenState,

    #[error("Concurrent update conflict")]
    ConcurrencyConflict,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

#[derive(Debug, Serialize)]
pub struct FieldErrorResponse {
    pub errors: HashMap<String, Vec<String>>,
    pub code: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::FieldValidation { .. } => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationError => StatusCode::UNAUTHORIZED,
            AppError::MalformedToken(_) => StatusCode::BAD_REQUEST,
            AppError::NoValidToken => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::AmbiguousTokenState => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConcurrencyConflict => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::FieldValidation { field, message } => {
                let mut errors = HashMap::new();
                errors.insert(field.clone(), vec![message.clone()]);
                HttpResponse::build(self.status_code()).json(FieldErrorResponse {
                    errors,
                    code: self.status_code().as_u16(),
                })
            }
            // Either of these means the refresh-token relation broke an
            // internal invariant. The caller gets a generic body; the
            // specifics stay in the server log.
            AppError::NoValidToken | AppError::AmbiguousTokenState => {
                log::error!("refresh token state problem: {}", self);
                HttpResponse::build(self.status_code()).json(ErrorResponse {
                    error: "Refresh token problem".to_string(),
                    code: self.status_code().as_u16(),
                })
            }
            _ => HttpResponse::build(self.status_code()).json(ErrorResponse {
                error: self.to_string(),
                code: self.status_code().as_u16(),
            }),
        }
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::InternalError(format!("BSON serialization error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
