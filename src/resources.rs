// ABOUTME: Shared server resources handed to every route and connection handler
// ABOUTME: One Arc of this struct is the whole application state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

use crate::auth::AuthManager;
use crate::chat::ChatSessionController;
use crate::database::Database;
use crate::llm::AssistantBackend;
use crate::settlement::SettlementClient;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Long-lived dependencies shared across the server
pub struct ServerResources {
    /// Relational store
    pub database: Database,
    /// Token issuance and validation
    pub auth: AuthManager,
    /// Assistant vendor backend
    pub backend: Arc<dyn AssistantBackend>,
    /// Settlement bridge
    pub settlement: Arc<dyn SettlementClient>,
    /// Chat turn controller
    pub sessions: Arc<ChatSessionController>,
    /// Process start time, reported by the health endpoint
    pub started_at: DateTime<Utc>,
}

impl ServerResources {
    /// Assemble the shared state
    #[must_use]
    pub fn new(
        database: Database,
        auth: AuthManager,
        backend: Arc<dyn AssistantBackend>,
        settlement: Arc<dyn SettlementClient>,
    ) -> Self {
        let sessions = Arc::new(ChatSessionController::new(database.clone(), backend.clone()));
        Self {
            database,
            auth,
            backend,
            settlement,
            sessions,
            started_at: Utc::now(),
        }
    }

    /// Seconds since the server started
    #[must_use]
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
