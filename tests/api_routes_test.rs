// ABOUTME: Integration tests for the HTTP API surface
// ABOUTME: Covers wallet auth, chat CRUD, transactions, settlement, and the health endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{create_test_resources, create_test_resources_with_settlement, create_test_user};
use ellara_server::models::MessageRole;
use ellara_server::routes;
use helpers::axum_test::TestRequest;
use serde_json::json;

#[tokio::test]
async fn wallet_auth_issues_token_and_is_idempotent() {
    let (_dir, resources) = create_test_resources().await;
    let app = routes::router(resources);

    let first = TestRequest::post("/api/v1/auth/me")
        .json(&json!({"publicKey": "0xabc123"}))
        .send(app.clone())
        .await;
    assert_eq!(first.status(), StatusCode::OK);
    let body = first.json();
    assert_eq!(body["publicKey"], "0xabc123");
    assert!(!body["token"].as_str().unwrap().is_empty());

    // Same wallet resolves to the same user
    let second = TestRequest::post("/api/v1/auth/me")
        .json(&json!({"publicKey": "0xabc123"}))
        .send(app)
        .await;
    assert_eq!(second.json()["id"], body["id"]);
}

#[tokio::test]
async fn wallet_auth_requires_public_key() {
    let (_dir, resources) = create_test_resources().await;
    let app = routes::router(resources);

    let response = TestRequest::post("/api/v1/auth/me")
        .json(&json!({}))
        .send(app)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn chat_list_requires_token() {
    let (_dir, resources) = create_test_resources().await;
    let app = routes::router(resources);

    let response = TestRequest::get("/api/v1/chat").send(app).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_forbidden() {
    let (_dir, resources) = create_test_resources().await;
    let app = routes::router(resources);

    let response = TestRequest::get("/api/v1/chat")
        .bearer("not-a-jwt")
        .send(app)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.json()["error"]["message"], "Invalid Token");
}

#[tokio::test]
async fn chat_listing_paginates_and_searches() {
    let (_dir, resources) = create_test_resources().await;
    let (user_id, token) = create_test_user(&resources).await;

    let chats = resources.database.chats();
    for (n, title) in ["Refunds", "Greeting", "Settling orders"].iter().enumerate() {
        chats
            .create_chat(&user_id, &format!("thread-{n}"), title)
            .await
            .unwrap();
    }

    let app = routes::router(resources);

    let page = TestRequest::get("/api/v1/chat?take=2&page=1")
        .bearer(&token)
        .send(app.clone())
        .await;
    assert_eq!(page.status(), StatusCode::OK);
    let body = page.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["meta"]["take"], 2);
    // Default sort is title ascending
    assert_eq!(body["data"][0]["title"], "Greeting");

    let filtered = TestRequest::get("/api/v1/chat?search=settl")
        .bearer(&token)
        .send(app)
        .await;
    let body = filtered.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Settling orders");
}

#[tokio::test]
async fn chat_history_is_owner_scoped() {
    let (_dir, resources) = create_test_resources().await;
    let (user_id, token) = create_test_user(&resources).await;

    let chats = resources.database.chats();
    let chat = chats.create_chat(&user_id, "thread-h", "History").await.unwrap();
    chats
        .add_message(&chat.id, MessageRole::User, "hello")
        .await
        .unwrap();
    chats
        .add_message(&chat.id, MessageRole::Assistant, "hi there")
        .await
        .unwrap();

    let stranger = resources
        .database
        .users()
        .get_or_create("0xother")
        .await
        .unwrap();
    let stranger_token = resources.auth.generate_token(&stranger.id).unwrap();

    let app = routes::router(resources);

    let history = TestRequest::get(&format!("/api/v1/chat/{}", chat.id))
        .bearer(&token)
        .send(app.clone())
        .await;
    assert_eq!(history.status(), StatusCode::OK);
    let body = history.json();
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["role"], "user");
    assert_eq!(body[1]["role"], "assistant");

    // Someone else's chat behaves as missing
    let foreign = TestRequest::get(&format!("/api/v1/chat/{}", chat.id))
        .bearer(&stranger_token)
        .send(app)
        .await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
    assert_eq!(foreign.json()["error"]["code"], "CHAT_NOT_FOUND");
}

#[tokio::test]
async fn chat_deletion_removes_messages() {
    let (_dir, resources) = create_test_resources().await;
    let (user_id, token) = create_test_user(&resources).await;

    let chats = resources.database.chats();
    let chat = chats.create_chat(&user_id, "thread-d", "Doomed").await.unwrap();
    chats
        .add_message(&chat.id, MessageRole::User, "bye")
        .await
        .unwrap();

    let app = routes::router(resources.clone());
    let response = TestRequest::delete(&format!("/api/v1/chat/{}", chat.id))
        .bearer(&token)
        .send(app.clone())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json()["status"], "OK");

    assert!(resources
        .database
        .chats()
        .get_chat(&chat.id, &user_id)
        .await
        .unwrap()
        .is_none());

    // Deleting again reports not found
    let again = TestRequest::delete(&format!("/api/v1/chat/{}", chat.id))
        .bearer(&token)
        .send(app)
        .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn transaction_lifecycle() {
    let (_dir, resources) = create_test_resources().await;
    let (_user_id, token) = create_test_user(&resources).await;
    let app = routes::router(resources);

    let created = TestRequest::post("/api/v1/tx")
        .bearer(&token)
        .json(&json!({"amount": 12.5, "type": "USDT"}))
        .send(app.clone())
        .await;
    assert_eq!(created.status(), StatusCode::OK);
    let body = created.json();
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["type"], "USDT");
    assert!(body["txHash"].is_null());
    let tx_id = body["id"].as_str().unwrap().to_owned();

    let updated = TestRequest::put(&format!("/api/v1/tx/{tx_id}"))
        .bearer(&token)
        .json(&json!({"status": "SUCCESS", "txHash": "0xdeadbeef"}))
        .send(app.clone())
        .await;
    assert_eq!(updated.status(), StatusCode::OK);

    let listed = TestRequest::get("/api/v1/tx")
        .bearer(&token)
        .send(app)
        .await;
    let body = listed.json();
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["status"], "SUCCESS");
    assert_eq!(body["data"][0]["txHash"], "0xdeadbeef");
}

#[tokio::test]
async fn transaction_rejects_unknown_type_and_bad_amount() {
    let (_dir, resources) = create_test_resources().await;
    let (_user_id, token) = create_test_user(&resources).await;
    let app = routes::router(resources);

    let bad_type = TestRequest::post("/api/v1/tx")
        .bearer(&token)
        .json(&json!({"amount": 5.0, "type": "DOGE"}))
        .send(app.clone())
        .await;
    assert_eq!(bad_type.status(), StatusCode::BAD_REQUEST);

    let bad_amount = TestRequest::post("/api/v1/tx")
        .bearer(&token)
        .json(&json!({"amount": -1.0, "type": "NATIVE"}))
        .send(app)
        .await;
    assert_eq!(bad_amount.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settlement_round_trip_and_validation() {
    let (_dir, resources) = create_test_resources().await;
    let (_user_id, token) = create_test_user(&resources).await;
    let app = routes::router(resources);

    let ok = TestRequest::post("/api/v1/settlement/settle")
        .bearer(&token)
        .json(&json!({
            "beneficiary": "0x000000000000000000000000000000000000dEaD",
            "orderHash": format!("0x{}", "ab".repeat(32)),
        }))
        .send(app.clone())
        .await;
    assert_eq!(ok.status(), StatusCode::OK);
    let body = ok.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["txHash"], "0xstub");

    let missing = TestRequest::post("/api/v1/settlement/settle")
        .bearer(&token)
        .json(&json!({"beneficiary": "0xabc"}))
        .send(app)
        .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settlement_failure_maps_to_server_error() {
    let (_dir, resources) = create_test_resources_with_settlement(true).await;
    let (_user_id, token) = create_test_user(&resources).await;
    let app = routes::router(resources);

    let response = TestRequest::post("/api/v1/settlement/settle")
        .bearer(&token)
        .json(&json!({
            "beneficiary": "0x000000000000000000000000000000000000dEaD",
            "orderHash": format!("0x{}", "ab".repeat(32)),
        }))
        .send(app)
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"]["code"], "SETTLEMENT_ERROR");
}

#[tokio::test]
async fn health_reports_ok_without_auth() {
    let (_dir, resources) = create_test_resources().await;
    let app = routes::router(resources);

    let response = TestRequest::get("/health").send(app).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["uptime_secs"].as_i64().unwrap() >= 0);
}
