// ABOUTME: Chat and message persistence with ownership-scoped queries
// ABOUTME: Each chat maps one-to-one to an external assistant thread id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

use crate::errors::{AppError, AppResult};
use crate::models::MessageRole;
use crate::pagination::{PageMeta, PageRequest, Paginated};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Database representation of a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    /// Unique chat id
    pub id: String,
    /// Owning user id
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Opaque external thread id, unique per chat
    #[serde(rename = "threadId")]
    pub thread_id: String,
    /// Derived title, at most 50 characters
    pub title: String,
    /// Creation timestamp (RFC 3339)
    #[serde(rename = "createdAt")]
    pub created_at: String,
    /// Last update timestamp (RFC 3339)
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Database representation of one turn in a chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Unique message id
    pub id: String,
    /// Owning chat id
    #[serde(rename = "chatId")]
    pub chat_id: String,
    /// `user` or `assistant`
    pub role: String,
    /// Message text
    pub content: String,
    /// Creation timestamp (RFC 3339)
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

fn chat_from_row(row: &sqlx::sqlite::SqliteRow) -> ChatRecord {
    ChatRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        thread_id: row.get("thread_id"),
        title: row.get("title"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn message_from_row(row: &sqlx::sqlite::SqliteRow) -> MessageRecord {
    MessageRecord {
        id: row.get("id"),
        chat_id: row.get("chat_id"),
        role: row.get("role"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

/// Maps API sort names to chat table columns
fn chat_sort_column(api_name: &str) -> &'static str {
    match api_name {
        "createdAt" => "created_at",
        "updatedAt" => "updated_at",
        _ => "title",
    }
}

/// Chat and message database operations
#[derive(Clone)]
pub struct ChatManager {
    pool: SqlitePool,
}

impl ChatManager {
    /// Create a new manager over the shared pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a chat bound to an external thread id
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails, including a
    /// uniqueness violation on the thread id.
    pub async fn create_chat(
        &self,
        user_id: &str,
        thread_id: &str,
        title: &str,
    ) -> AppResult<ChatRecord> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO chats (id, user_id, thread_id, title, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ",
        )
        .bind(&id)
        .bind(user_id)
        .bind(thread_id)
        .bind(title)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create chat: {e}")))?;

        Ok(ChatRecord {
            id,
            user_id: user_id.to_owned(),
            thread_id: thread_id.to_owned(),
            title: title.to_owned(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get a chat by id, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn get_chat(&self, chat_id: &str, user_id: &str) -> AppResult<Option<ChatRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, thread_id, title, created_at, updated_at
            FROM chats
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get chat: {e}")))?;

        Ok(row.as_ref().map(chat_from_row))
    }

    /// Find the chat bound to an external thread id
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn get_chat_by_thread(&self, thread_id: &str) -> AppResult<Option<ChatRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, thread_id, title, created_at, updated_at
            FROM chats
            WHERE thread_id = $1
            ",
        )
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get chat by thread: {e}")))?;

        Ok(row.as_ref().map(chat_from_row))
    }

    /// List a user's chats with pagination and title search
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn list_chats(
        &self,
        user_id: &str,
        request: &PageRequest,
    ) -> AppResult<Paginated<ChatRecord>> {
        let column = chat_sort_column(&request.sort_by);
        let query = format!(
            r"
            SELECT id, user_id, thread_id, title, created_at, updated_at
            FROM chats
            WHERE user_id = $1 AND LOWER(title) LIKE $2
            ORDER BY {column} {direction}
            LIMIT $3 OFFSET $4
            ",
            direction = request.direction(),
        );

        let pattern = format!("%{}%", request.search);
        let rows = sqlx::query(&query)
            .bind(user_id)
            .bind(&pattern)
            .bind(request.take)
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list chats: {e}")))?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM chats WHERE user_id = $1 AND LOWER(title) LIKE $2",
        )
        .bind(user_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count chats: {e}")))?
        .get("count");

        Ok(Paginated {
            data: rows.iter().map(chat_from_row).collect(),
            meta: PageMeta {
                page: request.page,
                take: request.take,
                total,
            },
        })
    }

    /// Update a chat's timestamp after a new turn
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn touch_chat(&self, chat_id: &str) -> AppResult<()> {
        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query("UPDATE chats SET updated_at = $1 WHERE id = $2")
            .bind(&now)
            .bind(chat_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to touch chat: {e}")))?;
        Ok(())
    }

    /// Delete an owned chat and its messages
    ///
    /// Returns false when the chat does not exist or belongs to another
    /// user.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn delete_chat(&self, chat_id: &str, user_id: &str) -> AppResult<bool> {
        // Ownership check before the cascade
        let Some(chat) = self.get_chat(chat_id, user_id).await? else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM messages WHERE chat_id = $1")
            .bind(&chat.id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete chat messages: {e}")))?;

        let result = sqlx::query("DELETE FROM chats WHERE id = $1 AND user_id = $2")
            .bind(&chat.id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete chat: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Append a turn to a chat and bump its updated timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn add_message(
        &self,
        chat_id: &str,
        role: MessageRole,
        content: &str,
    ) -> AppResult<MessageRecord> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO messages (id, chat_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&id)
        .bind(chat_id)
        .bind(role.as_str())
        .bind(content)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to add message: {e}")))?;

        sqlx::query("UPDATE chats SET updated_at = $1 WHERE id = $2")
            .bind(&now)
            .bind(chat_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update chat timestamp: {e}")))?;

        Ok(MessageRecord {
            id,
            chat_id: chat_id.to_owned(),
            role: role.as_str().to_owned(),
            content: content.to_owned(),
            created_at: now,
        })
    }

    /// All messages of a chat in chronological order
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn get_messages(&self, chat_id: &str) -> AppResult<Vec<MessageRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, chat_id, role, content, created_at
            FROM messages
            WHERE chat_id = $1
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get messages: {e}")))?;

        Ok(rows.iter().map(message_from_row).collect())
    }
}
