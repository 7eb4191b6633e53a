// ABOUTME: Wallet authentication route issuing bearer tokens
// ABOUTME: Upserts the user by wallet public key and returns a signed JWT
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Request to authenticate with a wallet public key
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    /// The wallet's public key
    #[serde(rename = "publicKey", default)]
    pub public_key: Option<String>,
}

/// Authenticated user with a fresh token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The user's id
    pub id: String,
    /// The wallet public key the user is bound to
    #[serde(rename = "publicKey")]
    pub public_key: String,
    /// Signed bearer token
    pub token: String,
}

/// Auth routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all auth routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/auth/me", post(Self::authenticate_wallet))
            .with_state(resources)
    }

    /// Find or create the user for a wallet and issue a token
    async fn authenticate_wallet(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<AuthRequest>,
    ) -> Result<Json<AuthResponse>, AppError> {
        let public_key = request
            .public_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::invalid_request("publicKey is required"))?;

        let user = resources.database.users().get_or_create(public_key).await?;
        let token = resources.auth.generate_token(&user.id)?;
        info!(user_id = %user.id, "Issued wallet token");

        Ok(Json(AuthResponse {
            id: user.id,
            public_key: user.public_key,
            token,
        }))
    }
}
