// ABOUTME: Server binary wiring configuration, database, backend, and routes together
// ABOUTME: Serves the merchant API and the realtime chat channel on one port
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

//! # Ellara Server Binary
//!
//! Starts the merchant backend: wallet authentication, chat assistant
//! streaming over WebSocket, transaction bookkeeping, and the QR order
//! settlement bridge.

use anyhow::Result;
use clap::Parser;
use ellara_server::{
    auth::AuthManager,
    config::ServerConfig,
    database::Database,
    llm::OpenAiAssistantClient,
    logging,
    resources::ServerResources,
    routes,
    settlement::ChainSettlementClient,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "ellara-server")]
#[command(about = "Ellara - merchant backend with an AI payment assistant")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Starting Ellara server");
    info!("{}", config.summary());

    let database = Database::connect(&config.database_url).await?;
    info!("Database ready");

    let auth = AuthManager::new(
        config.auth.jwt_secret.as_bytes(),
        config.auth.jwt_expiry_hours,
    );
    let backend = Arc::new(OpenAiAssistantClient::new(config.openai.clone()));
    let settlement = Arc::new(ChainSettlementClient::new(config.settlement.clone()));

    let resources = Arc::new(ServerResources::new(database, auth, backend, settlement));
    let app = routes::router(resources);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.http_port));
    info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
