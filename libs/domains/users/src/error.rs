use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::hasher::HashingError;

/// Message shown for duplicate usernames or emails.
pub const CONFLICT_MESSAGE: &str = "username or email already exists";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Hashing error: {0}")]
    Hashing(#[from] HashingError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UserError {
    pub fn conflict() -> Self {
        Self::Conflict(CONFLICT_MESSAGE.to_string())
    }
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            UserError::Conflict(msg) => AppError::Conflict(msg),
            UserError::InvalidCredentials => {
                AppError::Unauthorized("Invalid username or password".to_string())
            }
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::Hashing(e @ HashingError::PasswordTooLong(_)) => {
                AppError::BadRequest(e.to_string())
            }
            UserError::Hashing(e) => AppError::InternalServerError(format!("Hashing error: {}", e)),
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
