// ABOUTME: Chat CRUD routes for the merchant dashboard
// ABOUTME: Listing is paginated and searchable; history and deletion are owner-scoped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

//! Chat listing, history, and deletion. All handlers require a bearer
//! token; a chat another user owns behaves as if it does not exist.

use crate::database::{ChatRecord, MessageRecord};
use crate::errors::AppError;
use crate::pagination::{PageRequest, Paginated, PaginationQuery};
use crate::resources::ServerResources;
use axum::extract::{Path, Query, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Sort columns accepted by the chat listing
const CHAT_SORTS: &[&str] = &["title", "createdAt", "updatedAt"];

/// Response for chat deletion
#[derive(Debug, Serialize)]
pub struct DeleteChatResponse {
    /// Always "OK"
    pub status: &'static str,
    /// Human-readable outcome
    pub message: String,
}

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/chat", get(Self::list_chats))
            .route("/api/v1/chat/:chat_id", get(Self::get_history))
            .route("/api/v1/chat/:chat_id", delete(Self::delete_chat))
            .with_state(resources)
    }

    /// List the caller's chats, paginated and searchable by title
    async fn list_chats(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Query(query): Query<PaginationQuery>,
    ) -> Result<Json<Paginated<ChatRecord>>, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let request = PageRequest::resolve(&query, "title", true, CHAT_SORTS);
        let page = resources
            .database
            .chats()
            .list_chats(&auth.user_id, &request)
            .await?;
        Ok(Json(page))
    }

    /// Full message history of one chat, oldest first
    async fn get_history(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(chat_id): Path<String>,
    ) -> Result<Json<Vec<MessageRecord>>, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        resources
            .database
            .chats()
            .get_chat(&chat_id, &auth.user_id)
            .await?
            .ok_or_else(AppError::chat_not_found)?;

        let messages = resources.database.chats().get_messages(&chat_id).await?;
        Ok(Json(messages))
    }

    /// Delete a chat and its messages
    async fn delete_chat(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(chat_id): Path<String>,
    ) -> Result<Json<DeleteChatResponse>, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let deleted = resources
            .database
            .chats()
            .delete_chat(&chat_id, &auth.user_id)
            .await?;
        if !deleted {
            return Err(AppError::chat_not_found());
        }

        info!(chat_id = %chat_id, user_id = %auth.user_id, "Deleted chat");
        Ok(Json(DeleteChatResponse {
            status: "OK",
            message: "Chat deleted successfully".to_owned(),
        }))
    }
}
