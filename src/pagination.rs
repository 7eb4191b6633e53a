// ABOUTME: Shared pagination query parameters and response envelope
// ABOUTME: Implements the take/page/sortBy/sortOrder/search listing contract
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

//! Pagination types shared by the chat and transaction listing endpoints.

use serde::{Deserialize, Serialize};

/// Largest page size a client may request
const MAX_TAKE: i64 = 100;

/// Query parameters accepted by listing endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationQuery {
    /// Page size
    pub take: Option<i64>,
    /// 1-based page number
    pub page: Option<i64>,
    /// Column to sort by
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    /// `asc` or `desc`
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
    /// Substring filter, endpoint-specific column
    pub search: Option<String>,
}

/// Resolved pagination parameters with endpoint defaults applied
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Page size, clamped to `1..=100`
    pub take: i64,
    /// 1-based page number, at least 1
    pub page: i64,
    /// Validated sort column
    pub sort_by: String,
    /// True for ascending order
    pub ascending: bool,
    /// Lowercased search term, empty when absent
    pub search: String,
}

impl PageRequest {
    /// Resolve raw query parameters against endpoint defaults
    ///
    /// `allowed_sorts` guards against SQL injection through `sortBy`;
    /// an unknown column falls back to `default_sort`.
    #[must_use]
    pub fn resolve(
        query: &PaginationQuery,
        default_sort: &str,
        default_ascending: bool,
        allowed_sorts: &[&str],
    ) -> Self {
        let sort_by = query
            .sort_by
            .as_deref()
            .filter(|column| allowed_sorts.contains(column))
            .unwrap_or(default_sort)
            .to_owned();

        let ascending = match query.sort_order.as_deref() {
            Some("asc") => true,
            Some("desc") => false,
            _ => default_ascending,
        };

        Self {
            take: query.take.unwrap_or(10).clamp(1, MAX_TAKE),
            page: query.page.unwrap_or(1).max(1),
            sort_by,
            ascending,
            search: query
                .search
                .as_deref()
                .unwrap_or_default()
                .to_lowercase(),
        }
    }

    /// Row offset for the resolved page
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.take)
    }

    /// SQL ORDER BY direction keyword
    #[must_use]
    pub const fn direction(&self) -> &'static str {
        if self.ascending {
            "ASC"
        } else {
            "DESC"
        }
    }
}

/// Pagination metadata returned with every listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// 1-based page number
    pub page: i64,
    /// Page size
    pub take: i64,
    /// Total matching rows
    pub total: i64,
}

/// A page of results with its metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// The page of rows
    pub data: Vec<T>,
    /// Pagination metadata
    pub meta: PageMeta,
}
