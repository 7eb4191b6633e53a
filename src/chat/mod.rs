// ABOUTME: Chat session core: inbound/outbound events, title heuristic, and the turn state machine
// ABOUTME: Everything here is transport-agnostic; the websocket layer adapts it to clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

//! The chat session core.

pub mod events;
pub mod session;
pub mod title;

pub use events::{ChatQuestion, EventSink, ServerEvent, TurnComplete};
pub use session::ChatSessionController;
pub use title::TitlePolicy;
