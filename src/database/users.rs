// ABOUTME: User persistence operations keyed by wallet public key
// ABOUTME: Lazy find-or-create on first authentication, lookup by id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

use crate::errors::{AppError, AppResult};
use crate::models::User;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// User database operations
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new manager over the shared pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user by wallet public key, creating one if absent
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn get_or_create(&self, public_key: &str) -> AppResult<User> {
        if let Some(user) = self.find_by_public_key(public_key).await? {
            return Ok(user);
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO users (id, public_key, created_at) VALUES ($1, $2, $3)")
            .bind(&id)
            .bind(public_key)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create user: {e}")))?;

        Ok(User {
            id,
            public_key: public_key.to_owned(),
            created_at: now,
        })
    }

    /// Find a user by wallet public key
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn find_by_public_key(&self, public_key: &str) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT id, public_key, created_at FROM users WHERE public_key = $1")
            .bind(public_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to look up user: {e}")))?;

        Ok(row.map(|r| User {
            id: r.get("id"),
            public_key: r.get("public_key"),
            created_at: r.get("created_at"),
        }))
    }

    /// Look up a user by internal id
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn get(&self, user_id: &str) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT id, public_key, created_at FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to look up user: {e}")))?;

        Ok(row.map(|r| User {
            id: r.get("id"),
            public_key: r.get("public_key"),
            created_at: r.get("created_at"),
        }))
    }

    /// Look up a user by id, failing with `UserNotFound` when absent
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` when the id does not resolve.
    pub async fn require(&self, user_id: &str) -> AppResult<User> {
        self.get(user_id)
            .await?
            .ok_or_else(AppError::user_not_found)
    }
}
