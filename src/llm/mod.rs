// ABOUTME: Assistant backend abstraction for pluggable vendor integration
// ABOUTME: Defines the thread/run/completion contract the session controller depends on
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

//! # Assistant Backend Interface
//!
//! The session controller never talks to a vendor SDK directly. It
//! receives an [`AssistantBackend`] capability offering four operations:
//! thread creation, turn append, a streaming run, and a one-shot text
//! completion (used for title generation). The production implementation
//! is [`OpenAiAssistantClient`]; tests substitute a scripted fake.

mod openai;

pub use openai::OpenAiAssistantClient;

use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;
use tokio_stream::Stream;

/// Role of a message sent to the completion endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionRole {
    /// System instruction
    System,
    /// User content
    User,
}

/// One message of a one-shot completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionMessage {
    /// Message role
    pub role: CompletionRole,
    /// Message text
    pub content: String,
}

impl CompletionMessage {
    /// Create a system instruction message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: CompletionRole::System,
            content: content.into(),
        }
    }

    /// Create a user content message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: CompletionRole::User,
            content: content.into(),
        }
    }
}

/// Configuration for a one-shot text completion
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Ordered messages
    pub messages: Vec<CompletionMessage>,
    /// Model override, backend default when `None`
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Output token cap
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Create a request with messages and backend defaults
    #[must_use]
    pub const fn new(messages: Vec<CompletionMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap the output tokens
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// One event of a streaming assistant run
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// An incremental fragment of the assistant's answer
    MessageDelta {
        /// Extracted text of this fragment
        text: String,
        /// The vendor-shaped fragment, relayed verbatim to clients
        fragment: Value,
    },
    /// The run reached its successful terminal state
    RunCompleted,
    /// The vendor reported a message-level error mid-run
    MessageError {
        /// Vendor-supplied error text
        message: String,
    },
}

/// Stream of run events; transport failures surface as `Err` items
pub type RunStream = Pin<Box<dyn Stream<Item = Result<RunEvent, AppError>> + Send>>;

/// The capability the session controller depends on
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Create a new conversation thread, returning its opaque id
    async fn create_thread(&self) -> AppResult<String>;

    /// Append a user turn to a thread
    async fn append_turn(&self, thread_id: &str, content: &str) -> AppResult<()>;

    /// Start a streaming run for a thread
    async fn stream_run(&self, thread_id: &str) -> AppResult<RunStream>;

    /// One-shot text completion (title generation)
    async fn generate(&self, request: &CompletionRequest) -> AppResult<String>;
}
