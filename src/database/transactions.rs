// ABOUTME: Transaction ledger persistence with ownership-scoped updates
// ABOUTME: Rows start PENDING and are mutated once with a status and optional tx hash
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

use crate::errors::{AppError, AppResult};
use crate::models::{Transaction, TransactionStatus, TransactionType};
use crate::pagination::{PageMeta, PageRequest, Paginated};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

fn transaction_from_row(row: &sqlx::sqlite::SqliteRow) -> AppResult<Transaction> {
    let type_raw: String = row.get("type");
    let status_raw: String = row.get("status");

    Ok(Transaction {
        id: row.get("id"),
        user_id: row.get("user_id"),
        amount: row.get("amount"),
        tx_type: TransactionType::parse(&type_raw)
            .ok_or_else(|| AppError::database(format!("Unknown transaction type: {type_raw}")))?,
        status: TransactionStatus::parse(&status_raw)
            .ok_or_else(|| AppError::database(format!("Unknown transaction status: {status_raw}")))?,
        tx_hash: row.get("tx_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Maps API sort names to transaction table columns
fn tx_sort_column(api_name: &str) -> &'static str {
    match api_name {
        "updatedAt" => "updated_at",
        "amount" => "amount",
        "status" => "status",
        _ => "created_at",
    }
}

/// Transaction database operations
#[derive(Clone)]
pub struct TransactionManager {
    pool: SqlitePool,
}

impl TransactionManager {
    /// Create a new manager over the shared pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a transaction in the `PENDING` state
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn create(
        &self,
        user_id: &str,
        amount: f64,
        tx_type: TransactionType,
    ) -> AppResult<Transaction> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO transactions (id, user_id, amount, type, status, tx_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'PENDING', NULL, $5, $5)
            ",
        )
        .bind(&id)
        .bind(user_id)
        .bind(amount)
        .bind(tx_type.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create transaction: {e}")))?;

        Ok(Transaction {
            id,
            user_id: user_id.to_owned(),
            amount,
            tx_type,
            status: TransactionStatus::Pending,
            tx_hash: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// List a user's transactions with pagination and tx-hash search
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn list(
        &self,
        user_id: &str,
        request: &PageRequest,
    ) -> AppResult<Paginated<Transaction>> {
        let column = tx_sort_column(&request.sort_by);
        let query = format!(
            r"
            SELECT id, user_id, amount, type, status, tx_hash, created_at, updated_at
            FROM transactions
            WHERE user_id = $1 AND LOWER(COALESCE(tx_hash, '')) LIKE $2
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
            .map_err(|e| AppError::database(format!("Failed to list transactions: {e}")))?;

        let total: i64 = sqlx::query(
            r"
            SELECT COUNT(*) AS count FROM transactions
            WHERE user_id = $1 AND LOWER(COALESCE(tx_hash, '')) LIKE $2
            ",
        )
        .bind(user_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count transactions: {e}")))?
        .get("count");

        let data = rows
            .iter()
            .map(transaction_from_row)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Paginated {
            data,
            meta: PageMeta {
                page: request.page,
                take: request.take,
                total,
            },
        })
    }

    /// Get a transaction by id, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn get(&self, tx_id: &str, user_id: &str) -> AppResult<Option<Transaction>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, amount, type, status, tx_hash, created_at, updated_at
            FROM transactions
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(tx_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get transaction: {e}")))?;

        row.as_ref().map(transaction_from_row).transpose()
    }

    /// Update an owned transaction's status and optional hash
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the id does not resolve for this user,
    /// or a database error.
    pub async fn update(
        &self,
        tx_id: &str,
        user_id: &str,
        status: TransactionStatus,
        tx_hash: Option<&str>,
    ) -> AppResult<()> {
        self.get(tx_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Transaction"))?;

        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query(
            r"
            UPDATE transactions
            SET status = $1, tx_hash = COALESCE($2, tx_hash), updated_at = $3
            WHERE id = $4 AND user_id = $5
            ",
        )
        .bind(status.as_str())
        .bind(tx_hash)
        .bind(&now)
        .bind(tx_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update transaction: {e}")))?;

        Ok(())
    }
}
