// ABOUTME: Shared fixtures for integration tests
// ABOUTME: Builds server resources over a temporary database with scripted backend and settlement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

use async_trait::async_trait;
use ellara_server::auth::AuthManager;
use ellara_server::database::Database;
use ellara_server::errors::{AppError, AppResult};
use ellara_server::llm::{AssistantBackend, CompletionRequest, RunEvent, RunStream};
use ellara_server::resources::ServerResources;
use ellara_server::settlement::{SettlementClient, SettlementReceipt};
use std::sync::Arc;

/// Backend stub for tests that never reach the assistant
pub struct StubBackend;

#[async_trait]
impl AssistantBackend for StubBackend {
    async fn create_thread(&self) -> AppResult<String> {
        Ok("thread-stub".to_owned())
    }

    async fn append_turn(&self, _thread_id: &str, _content: &str) -> AppResult<()> {
        Ok(())
    }

    async fn stream_run(&self, _thread_id: &str) -> AppResult<RunStream> {
        Ok(Box::pin(futures_util::stream::iter(vec![Ok(
            RunEvent::RunCompleted,
        )])))
    }

    async fn generate(&self, _request: &CompletionRequest) -> AppResult<String> {
        Ok("Stub Title".to_owned())
    }
}

/// Settlement stub returning a fixed receipt
pub struct StubSettlement {
    pub fail: bool,
}

#[async_trait]
impl SettlementClient for StubSettlement {
    async fn settle_order(
        &self,
        _beneficiary: &str,
        _order_hash: &str,
    ) -> AppResult<SettlementReceipt> {
        if self.fail {
            return Err(AppError::settlement("Settlement transaction reverted"));
        }
        Ok(SettlementReceipt {
            success: true,
            tx_hash: "0xstub".to_owned(),
            message: "Order settled successfully".to_owned(),
        })
    }
}

/// Resources over a fresh temporary database
///
/// The returned `TempDir` must be kept alive for the database file to
/// survive the test.
pub async fn create_test_resources() -> (tempfile::TempDir, Arc<ServerResources>) {
    create_test_resources_with_settlement(false).await
}

pub async fn create_test_resources_with_settlement(
    settlement_fails: bool,
) -> (tempfile::TempDir, Arc<ServerResources>) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let database = Database::connect(&url).await.unwrap();

    let auth = AuthManager::new(b"test-secret", 1);
    let resources = Arc::new(ServerResources::new(
        database,
        auth,
        Arc::new(StubBackend),
        Arc::new(StubSettlement {
            fail: settlement_fails,
        }),
    ));
    (dir, resources)
}

/// Create a user and a valid token for them
pub async fn create_test_user(resources: &ServerResources) -> (String, String) {
    let user = resources
        .database
        .users()
        .get_or_create("0xtest-wallet")
        .await
        .unwrap();
    let token = resources.auth.generate_token(&user.id).unwrap();
    (user.id, token)
}
