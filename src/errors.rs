// ABOUTME: Unified error handling for the Ellara server
// ABOUTME: Defines error codes, HTTP status mapping, and the structured error response body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

//! # Unified Error Handling
//!
//! Centralized error types for the whole application. Every failure is
//! expressed as an [`AppError`] carrying an [`ErrorCode`]; the code maps
//! to an HTTP status and a user-facing description. Errors surface to
//! clients either as an HTTP error body or as a `bot_error` event on the
//! realtime channel, and are never retried automatically.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Malformed inbound request (missing question, bad payload shape)
    #[serde(rename = "INVALID_REQUEST")]
    InvalidRequest,
    /// Referential lookup miss: chat id does not resolve for this user
    #[serde(rename = "CHAT_NOT_FOUND")]
    ChatNotFound,
    /// Referential lookup miss: user record does not exist
    #[serde(rename = "USER_NOT_FOUND")]
    UserNotFound,
    /// Generic resource lookup miss (transactions, etc.)
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    NotFound,
    /// Bearer token missing from the request
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired,
    /// Bearer token expired
    #[serde(rename = "AUTH_EXPIRED")]
    AuthExpired,
    /// Bearer token present but invalid
    #[serde(rename = "AUTH_INVALID")]
    AuthInvalid,
    /// LLM backend call failed outside the stream (thread creation, title)
    #[serde(rename = "VENDOR_ERROR")]
    VendorError,
    /// Failure during an active streaming run; partial turn discarded
    #[serde(rename = "STREAM_ERROR")]
    StreamError,
    /// Blockchain settlement write failed
    #[serde(rename = "SETTLEMENT_ERROR")]
    SettlementError,
    /// Database operation failed
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError,
    /// Configuration missing or invalid
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError,
    /// Unclassified internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    /// HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::AuthRequired => StatusCode::UNAUTHORIZED,
            Self::AuthExpired | Self::AuthInvalid => StatusCode::FORBIDDEN,
            Self::ChatNotFound | Self::UserNotFound | Self::NotFound => StatusCode::NOT_FOUND,
            Self::VendorError | Self::StreamError => StatusCode::BAD_GATEWAY,
            Self::SettlementError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing description of this error class
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidRequest => "The request is malformed",
            Self::ChatNotFound => "Chat not found",
            Self::UserNotFound => "User not found",
            Self::NotFound => "The requested resource was not found",
            Self::AuthRequired => "Authentication failed, token is missing",
            Self::AuthExpired => "Token expired",
            Self::AuthInvalid => "Invalid Token",
            Self::VendorError => "The assistant backend call failed",
            Self::StreamError => "The assistant stream failed",
            Self::SettlementError => "Settlement write failed",
            Self::DatabaseError => "Database operation failed",
            Self::ConfigError => "Configuration error",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error classification
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new error with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach a source error for chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// HTTP status for this error
    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// Malformed inbound request
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Chat id did not resolve to a chat owned by the caller
    #[must_use]
    pub fn chat_not_found() -> Self {
        Self::new(ErrorCode::ChatNotFound, "Chat not found")
    }

    /// User record missing
    #[must_use]
    pub fn user_not_found() -> Self {
        Self::new(ErrorCode::UserNotFound, "User not found")
    }

    /// Generic resource miss
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, format!("{} not found", resource.into()))
    }

    /// Bearer token missing
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(
            ErrorCode::AuthRequired,
            "Authentication failed, token is missing",
        )
    }

    /// Bearer token expired
    #[must_use]
    pub fn auth_expired() -> Self {
        Self::new(ErrorCode::AuthExpired, "Token expired")
    }

    /// Bearer token invalid
    #[must_use]
    pub fn auth_invalid() -> Self {
        Self::new(ErrorCode::AuthInvalid, "Invalid Token")
    }

    /// Non-stream vendor call failure
    pub fn vendor(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::VendorError, message)
    }

    /// Mid-stream failure
    pub fn stream(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StreamError, message)
    }

    /// Settlement write failure
    pub fn settlement(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SettlementError, message)
    }

    /// Database failure
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration failure
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Unclassified internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorResponseDetails,
}

/// The `error` object of an [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        Self::database(error.to_string()).with_source(error)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(error.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn error_code_http_status() {
        assert_eq!(ErrorCode::AuthRequired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::AuthExpired.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::ChatNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::VendorError.http_status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ErrorCode::InvalidRequest.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn auth_messages_match_http_contract() {
        assert_eq!(AppError::auth_expired().message, "Token expired");
        assert_eq!(AppError::auth_invalid().message, "Invalid Token");
    }

    #[test]
    fn error_response_serialization() {
        let error = AppError::chat_not_found();
        let response = ErrorResponse::from(error);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("CHAT_NOT_FOUND"));
        assert!(json.contains("Chat not found"));
    }
}
