// ABOUTME: Transaction CRUD routes for payment bookkeeping
// ABOUTME: Creation defaults to PENDING; updates set status and optionally the chain hash
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

use crate::errors::AppError;
use crate::models::{Transaction, TransactionStatus, TransactionType};
use crate::pagination::{PageRequest, Paginated, PaginationQuery};
use crate::resources::ServerResources;
use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Sort columns accepted by the transaction listing
const TX_SORTS: &[&str] = &["createdAt", "updatedAt", "amount", "status"];

/// Request to record a new transaction
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Transaction amount
    pub amount: f64,
    /// "NATIVE" or "USDT"
    #[serde(rename = "type")]
    pub tx_type: String,
}

/// Request to update a transaction's outcome
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionRequest {
    /// New status, "PENDING", "SUCCESS", or "FAILED"
    pub status: String,
    /// Chain transaction hash, kept unchanged when absent
    #[serde(rename = "txHash", default)]
    pub tx_hash: Option<String>,
}

/// Response for a transaction update
#[derive(Debug, Serialize)]
pub struct UpdateTransactionResponse {
    /// Always "OK"
    pub status: &'static str,
    /// Human-readable outcome
    pub message: String,
}

/// Transaction routes handler
pub struct TransactionRoutes;

impl TransactionRoutes {
    /// Create all transaction routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/v1/tx",
                get(Self::list_transactions).post(Self::create_transaction),
            )
            .route("/api/v1/tx/:tx_id", put(Self::update_transaction))
            .with_state(resources)
    }

    /// Record a new pending transaction
    async fn create_transaction(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<CreateTransactionRequest>,
    ) -> Result<Json<Transaction>, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let tx_type = TransactionType::parse(&request.tx_type).ok_or_else(|| {
            AppError::invalid_request(format!("Unknown transaction type: {}", request.tx_type))
        })?;
        if !request.amount.is_finite() || request.amount <= 0.0 {
            return Err(AppError::invalid_request("Amount must be positive"));
        }

        let transaction = resources
            .database
            .transactions()
            .create(&auth.user_id, request.amount, tx_type)
            .await?;
        info!(tx_id = %transaction.id, user_id = %auth.user_id, "Recorded transaction");
        Ok(Json(transaction))
    }

    /// List the caller's transactions, newest first by default
    async fn list_transactions(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Query(query): Query<PaginationQuery>,
    ) -> Result<Json<Paginated<Transaction>>, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let request = PageRequest::resolve(&query, "createdAt", false, TX_SORTS);
        let page = resources
            .database
            .transactions()
            .list(&auth.user_id, &request)
            .await?;
        Ok(Json(page))
    }

    /// Update the status (and chain hash) of a transaction
    async fn update_transaction(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(tx_id): Path<String>,
        Json(request): Json<UpdateTransactionRequest>,
    ) -> Result<Json<UpdateTransactionResponse>, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let status = TransactionStatus::parse(&request.status).ok_or_else(|| {
            AppError::invalid_request(format!("Unknown transaction status: {}", request.status))
        })?;

        resources
            .database
            .transactions()
            .update(&tx_id, &auth.user_id, status, request.tx_hash.as_deref())
            .await?;
        info!(tx_id = %tx_id, status = status.as_str(), "Updated transaction");
        Ok(Json(UpdateTransactionResponse {
            status: "OK",
            message: "Transaction updated successfully".to_owned(),
        }))
    }
}
