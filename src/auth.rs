// ABOUTME: JWT authentication manager for wallet-authenticated users
// ABOUTME: Issues short-lived HS256 bearer tokens and validates them with expiry distinction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

//! Bearer-token authentication.
//!
//! Users authenticate by wallet public key via `POST /api/v1/auth/me`,
//! which issues a one-hour HS256 JWT. Every protected handler and the
//! realtime channel validate tokens through [`AuthManager`], which
//! distinguishes an expired token (403 "Token expired") from an otherwise
//! invalid one (403 "Invalid Token").

use crate::errors::{AppError, AppResult};
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims carried by every issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Result of a successful authentication
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user id
    pub user_id: String,
}

/// Issues and validates bearer tokens
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a manager from the shared HS256 secret
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
        }
    }

    /// Generate a bearer token for a user
    ///
    /// # Errors
    ///
    /// Returns an internal error if JWT encoding fails.
    pub fn generate_token(&self, user_id: &str) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user_id.to_owned(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a bearer token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` for an expired token and `AuthInvalid` for
    /// any other validation failure.
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(AppError::auth_expired()),
                _ => {
                    tracing::debug!(error = %e, "JWT validation failed");
                    Err(AppError::auth_invalid())
                }
            },
        }
    }

    /// Authenticate an HTTP request from its headers
    ///
    /// Expects `Authorization: Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when the header is missing or not a bearer
    /// scheme, and the `validate_token` errors otherwise.
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let token = bearer_token(headers).ok_or_else(AppError::auth_required)?;
        let claims = self.validate_token(token)?;
        Ok(AuthResult {
            user_id: claims.sub,
        })
    }
}

/// Extract the token part of an `Authorization: Bearer ...` header
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use axum::http::header::AUTHORIZATION;

    fn manager() -> AuthManager {
        AuthManager::new(b"test-secret", 1)
    }

    #[test]
    fn round_trips_valid_token() {
        let auth = manager();
        let token = auth.generate_token("user-1").unwrap();
        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_expired_token() {
        let auth = AuthManager::new(b"test-secret", -1);
        let token = auth.generate_token("user-1").unwrap();
        let err = manager().validate_token(&token).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthExpired);
        assert_eq!(err.message, "Token expired");
    }

    #[test]
    fn rejects_garbage_token() {
        let err = manager().validate_token("not.a.jwt").unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
        assert_eq!(err.message, "Invalid Token");
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let other = AuthManager::new(b"other-secret", 1);
        let token = other.generate_token("user-1").unwrap();
        let err = manager().validate_token(&token).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
    }

    #[test]
    fn extracts_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc123"));

        let mut bad = HeaderMap::new();
        bad.insert(AUTHORIZATION, "Basic abc123".parse().unwrap());
        assert_eq!(bearer_token(&bad), None);
    }

    #[test]
    fn missing_header_is_auth_required() {
        let err = manager().authenticate(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
    }
}
