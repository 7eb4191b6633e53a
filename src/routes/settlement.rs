// ABOUTME: Settlement route bridging the API to the payment contract
// ABOUTME: Validates the request and delegates to the settlement client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::settlement::SettlementReceipt;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

/// Request to settle one QR order
#[derive(Debug, Deserialize)]
pub struct SettleRequest {
    /// Merchant address receiving the settlement
    #[serde(default)]
    pub beneficiary: Option<String>,
    /// 32-byte order identifier, hex encoded
    #[serde(rename = "orderHash", default)]
    pub order_hash: Option<String>,
}

/// Settlement routes handler
pub struct SettlementRoutes;

impl SettlementRoutes {
    /// Create all settlement routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/settlement/settle", post(Self::settle_order))
            .with_state(resources)
    }

    /// Submit a settlement on behalf of the contract owner
    async fn settle_order(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<SettleRequest>,
    ) -> Result<Json<SettlementReceipt>, AppError> {
        resources.auth.authenticate(&headers)?;

        let beneficiary = request
            .beneficiary
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| AppError::invalid_request("beneficiary is required"))?;
        let order_hash = request
            .order_hash
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| AppError::invalid_request("orderHash is required"))?;

        let receipt = resources
            .settlement
            .settle_order(beneficiary, order_hash)
            .await?;
        Ok(Json(receipt))
    }
}
