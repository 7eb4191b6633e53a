// ABOUTME: Core domain types shared across persistence, routes, and the session controller
// ABOUTME: Users, transactions, and message roles with their wire representations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

//! Domain model types.
//!
//! Chat and message records live with their manager in
//! [`crate::database::chats`]; this module holds the types shared across
//! module boundaries.

use serde::{Deserialize, Serialize};

/// A wallet-authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Internal id (uuid)
    pub id: String,
    /// Public wallet address, unique
    #[serde(rename = "publicKey")]
    pub public_key: String,
    /// Creation timestamp (RFC 3339)
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Role of a chat message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// End-user question
    User,
    /// Assistant answer
    Assistant,
}

impl MessageRole {
    /// String form used in the database and on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Settlement currency of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Chain-native currency
    Native,
    /// USDT token
    Usdt,
}

impl TransactionType {
    /// String form used in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "NATIVE",
            Self::Usdt => "USDT",
        }
    }

    /// Parse the database string form
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NATIVE" => Some(Self::Native),
            "USDT" => Some(Self::Usdt),
            _ => None,
        }
    }
}

/// Lifecycle status of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Created, not yet settled
    Pending,
    /// Settled on chain
    Success,
    /// Settlement failed
    Failed,
}

impl TransactionStatus {
    /// String form used in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }

    /// Parse the database string form
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(Self::Pending),
            "SUCCESS" => Some(Self::Success),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A ledger entry owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Internal id (uuid)
    pub id: String,
    /// Owning user id
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Amount in the transaction's currency
    pub amount: f64,
    /// Settlement currency
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// Lifecycle status
    pub status: TransactionStatus,
    /// On-chain transaction hash, set on settlement
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    /// Creation timestamp (RFC 3339)
    #[serde(rename = "createdAt")]
    pub created_at: String,
    /// Last update timestamp (RFC 3339)
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn transaction_enums_round_trip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Success,
            TransactionStatus::Failed,
        ] {
            assert_eq!(TransactionStatus::parse(status.as_str()), Some(status));
        }
        for tx_type in [TransactionType::Native, TransactionType::Usdt] {
            assert_eq!(TransactionType::parse(tx_type.as_str()), Some(tx_type));
        }
        assert_eq!(TransactionStatus::parse("UNKNOWN"), None);
    }

    #[test]
    fn transaction_serializes_with_camel_case_keys() {
        let tx = Transaction {
            id: "t1".to_owned(),
            user_id: "u1".to_owned(),
            amount: 1.5,
            tx_type: TransactionType::Native,
            status: TransactionStatus::Pending,
            tx_hash: None,
            created_at: "2025-01-01T00:00:00Z".to_owned(),
            updated_at: "2025-01-01T00:00:00Z".to_owned(),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "NATIVE");
        assert_eq!(json["status"], "PENDING");
        assert!(json.get("userId").is_some());
        assert!(json.get("txHash").is_some());
    }
}
