// ABOUTME: Library root for the Ellara merchant assistant server
// ABOUTME: Wires the chat session core, persistence, auth, routes, and settlement bridge
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

//! # Ellara Server
//!
//! Merchant-facing backend combining a streaming AI chat assistant, a
//! wallet-authenticated user system, chat/transaction persistence, and a
//! thin settlement bridge to an EVM smart contract.
//!
//! The core of the crate is [`chat::session::ChatSessionController`]: the
//! explicit `ResolvingThread -> AppendingTurn -> Streaming -> Done` state
//! machine that drives one inbound question through thread resolution,
//! turn persistence, streaming relay, and completion.

pub mod auth;
pub mod chat;
pub mod config;
pub mod database;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod resources;
pub mod routes;
pub mod settlement;
pub mod websocket;
