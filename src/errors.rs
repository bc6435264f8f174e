// ABOUTME: Unified error handling system with classified error codes and HTTP responses
// ABOUTME: Defines AppError, AppResult, and the ErrorCode taxonomy used across the crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Convenient result alias used across the crate
pub type AppResult<T> = Result<T, AppError>;

/// Classified error kinds
///
/// Authentication failures keep the classification the auth provider exposes
/// to clients: wrong password, user not found, invalid email, email already
/// in use, and a generic invalid-credential kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// No credentials were supplied where they are required
    AuthRequired,
    /// Credentials were supplied but are not valid (generic invalid-credential)
    AuthInvalid,
    /// Password did not match the stored hash
    AuthWrongPassword,
    /// No account exists for the given email
    AuthUserNotFound,
    /// Email address is syntactically invalid
    AuthInvalidEmail,
    /// Email address is already registered to another account
    AuthEmailInUse,
    /// Authenticated user is not allowed to perform the operation
    PermissionDenied,
    /// Requested document does not exist
    ResourceNotFound,
    /// Request payload or parameters failed validation
    InvalidInput,
    /// Database operation failed
    DatabaseError,
    /// Blob storage operation failed
    StorageError,
    /// Third-party content API call failed
    ExternalServiceError,
    /// Server configuration is missing or malformed
    ConfigError,
    /// Unexpected internal failure
    InternalError,
}

impl ErrorCode {
    /// HTTP status used when the error reaches the routes layer
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::AuthRequired
            | Self::AuthInvalid
            | Self::AuthWrongPassword
            | Self::AuthUserNotFound
            | Self::AuthInvalidEmail => StatusCode::UNAUTHORIZED,
            Self::AuthEmailInUse => StatusCode::CONFLICT,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::ResourceNotFound => StatusCode::NOT_FOUND,
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::ExternalServiceError => StatusCode::BAD_GATEWAY,
            Self::DatabaseError
            | Self::StorageError
            | Self::ConfigError
            | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application error carrying a classified code and a human-readable message
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    /// Classified error kind
    pub code: ErrorCode,
    /// Human-readable description, safe to surface to the user
    pub message: String,
}

impl AppError {
    /// Create an error with an explicit code
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Missing credentials
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthRequired, message)
    }

    /// Generic invalid-credential failure
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Password mismatch
    pub fn wrong_password(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthWrongPassword, message)
    }

    /// No account for the email
    pub fn user_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthUserNotFound, message)
    }

    /// Syntactically invalid email
    pub fn invalid_email(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalidEmail, message)
    }

    /// Email already registered
    pub fn email_in_use(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthEmailInUse, message)
    }

    /// Operation not allowed for the authenticated user
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Document does not exist
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceNotFound, message)
    }

    /// Validation failure
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Database failure
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Blob storage failure
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Third-party API failure
    pub fn external(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalServiceError, message)
    }

    /// Configuration failure
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Unexpected internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON serialization failed: {err}"))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        Self::internal(format!("Invalid UUID: {err}"))
    }
}

/// Wire shape for error responses
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        let body = ErrorBody {
            error: self.code,
            message: self.message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn auth_kinds_map_to_unauthorized() {
        assert_eq!(
            AppError::wrong_password("bad").code.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::user_not_found("missing").code.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::email_in_use("taken").code.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn display_uses_message() {
        let err = AppError::not_found("Post");
        assert_eq!(err.to_string(), "Post");
    }
}
