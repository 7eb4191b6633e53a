// ABOUTME: Structured logging initialization built on tracing-subscriber
// ABOUTME: Supports pretty, compact, and JSON formats with environment-driven filtering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

//! Logging setup.
//!
//! `RUST_LOG` controls the filter when set; otherwise `LOG_LEVEL`
//! (default `info`) applies. Noisy HTTP-stack crates are capped at `warn`
//! regardless of the chosen level. `LOG_FORMAT` selects `pretty`,
//! `compact` (default), or `json` output.

use anyhow::Result;
use std::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// Single-line output for terminals and log shippers
    Compact,
    /// Structured JSON output
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match env::var("LOG_FORMAT").as_deref() {
            Ok("pretty") => Self::Pretty,
            Ok("json") => Self::Json,
            _ => Self::Compact,
        }
    }
}

fn build_filter() -> EnvFilter {
    let base = env::var("RUST_LOG")
        .or_else(|_| env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| "info".to_owned());

    let mut filter = EnvFilter::new(base);
    for directive in ["hyper=warn", "reqwest=warn", "sqlx=warn", "tower_http=info"] {
        if let Ok(parsed) = directive.parse() {
            filter = filter.add_directive(parsed);
        }
    }
    filter
}

/// Initialize logging from the environment
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_from_env() -> Result<()> {
    let filter = build_filter();

    match LogFormat::from_env() {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_compact() {
        // LOG_FORMAT unset in the test environment
        assert_eq!(LogFormat::from_env(), LogFormat::Compact);
    }
}
