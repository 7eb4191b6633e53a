// ABOUTME: Environment-only server configuration
// ABOUTME: Collects HTTP, database, auth, LLM, and settlement settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

//! Server configuration loaded from environment variables.
//!
//! There is no configuration file; every setting comes from the process
//! environment with a sensible default where one exists. Secrets
//! (JWT secret, API keys, the settlement signer key) have no defaults.

use crate::errors::{AppError, AppResult};
use std::env;

/// Default HTTP port when `PORT` is unset
const DEFAULT_HTTP_PORT: u16 = 8000;
/// Default SQLite database when `DATABASE_URL` is unset
const DEFAULT_DATABASE_URL: &str = "sqlite:ellara.db?mode=rwc";
/// Default Sepolia RPC endpoint for the settlement bridge
const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// SQLite connection string
    pub database_url: String,
    /// Authentication settings
    pub auth: AuthConfig,
    /// Assistant backend settings
    pub openai: OpenAiConfig,
    /// Settlement bridge settings
    pub settlement: SettlementConfig,
}

/// JWT authentication settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
}

/// OpenAI assistant backend settings
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for the vendor backend
    pub api_key: String,
    /// Base URL, overridable for compatible gateways
    pub base_url: String,
    /// Model used for the streaming assistant
    pub assistant_model: String,
    /// Model used for one-shot title generation
    pub title_model: String,
}

/// Settlement bridge settings
#[derive(Debug, Clone)]
pub struct SettlementConfig {
    /// JSON-RPC endpoint of the chain
    pub rpc_url: String,
    /// Address of the QR payment contract
    pub contract_address: String,
    /// Private key of the contract owner (hex, with or without 0x)
    pub owner_private_key: String,
}

impl ServerConfig {
    /// Load configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns a config error if `JWT_SECRET` or `OPENAI_API_KEY` is
    /// missing, or if `PORT` is not a valid port number. Settlement
    /// settings are validated lazily when the bridge is first used, so a
    /// deployment without the settlement feature still boots.
    pub fn from_env() -> AppResult<Self> {
        let http_port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| AppError::config(format!("PORT is not a valid port: {raw}")))?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::config("JWT_SECRET environment variable is required"))?;

        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| AppError::config("OPENAI_API_KEY environment variable is required"))?;

        Ok(Self {
            http_port,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned()),
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: 1,
            },
            openai: OpenAiConfig {
                api_key,
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_owned()),
                assistant_model: env::var("ELLARA_ASSISTANT_MODEL")
                    .unwrap_or_else(|_| "gpt-4o".to_owned()),
                title_model: env::var("ELLARA_TITLE_MODEL")
                    .unwrap_or_else(|_| "gpt-3.5-turbo".to_owned()),
            },
            settlement: SettlementConfig {
                rpc_url: env::var("RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_owned()),
                contract_address: env::var("QR_PAYMENT_ADDRESS").unwrap_or_default(),
                owner_private_key: env::var("CONTRACT_OWNER_PRIVATE_KEY").unwrap_or_default(),
            },
        })
    }

    /// One-line startup summary (no secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} database={} assistant_model={} title_model={} rpc={}",
            self.http_port,
            self.database_url,
            self.openai.assistant_model,
            self.openai.title_model,
            self.settlement.rpc_url,
        )
    }
}
