// ABOUTME: HTTP route registration for the merchant API surface
// ABOUTME: Combines auth, chat, transaction, settlement, health, and the realtime channel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

pub mod auth;
pub mod chat;
pub mod health;
pub mod settlement;
pub mod transactions;

use crate::resources::ServerResources;
use crate::websocket::websocket_handler;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(auth::AuthRoutes::routes(resources.clone()))
        .merge(chat::ChatRoutes::routes(resources.clone()))
        .merge(transactions::TransactionRoutes::routes(resources.clone()))
        .merge(settlement::SettlementRoutes::routes(resources.clone()))
        .merge(health::HealthRoutes::routes(resources.clone()))
        .route("/ws", get(websocket_handler).with_state(resources))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
