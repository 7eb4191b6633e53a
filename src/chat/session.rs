// ABOUTME: Session controller driving one question through its full turn lifecycle
// ABOUTME: Resolves the thread, appends the turn, relays the run stream, persists the outcome
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

//! The chat turn state machine.
//!
//! Every inbound question passes through the same four states:
//! `ResolvingThread` (validate, find or create the conversation),
//! `AppendingTurn` (hand the question to the backend and persist it),
//! `Streaming` (relay incremental fragments), and `Done`. Failures in
//! any state surface to the client as a single `bot_error` event and
//! never leave a half-persisted turn behind.

use crate::chat::events::{ChatQuestion, EventSink, ServerEvent, TurnComplete};
use crate::chat::title::TitlePolicy;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::llm::{AssistantBackend, RunEvent};
use crate::models::MessageRole;
use dashmap::DashMap;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Completion message of a successful `bot_end` event
const TURN_COMPLETE_MESSAGE: &str = "Response completed";

/// Lifecycle state of one in-flight turn, for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnState {
    ResolvingThread,
    AppendingTurn,
    Streaming,
    Done,
}

impl TurnState {
    const fn as_str(self) -> &'static str {
        match self {
            Self::ResolvingThread => "resolving_thread",
            Self::AppendingTurn => "appending_turn",
            Self::Streaming => "streaming",
            Self::Done => "done",
        }
    }
}

/// The resolved conversation a turn runs against
struct ResolvedThread {
    chat_id: Option<String>,
    thread_id: String,
    is_new_chat: bool,
}

/// Drives chat turns end to end
///
/// One controller is shared across all connections; per-thread mutexes
/// serialize turns that target the same conversation so the external
/// thread never sees interleaved appends.
pub struct ChatSessionController {
    database: Database,
    backend: Arc<dyn AssistantBackend>,
    title_policy: TitlePolicy,
    turn_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ChatSessionController {
    /// Create a controller over the shared database and backend
    #[must_use]
    pub fn new(database: Database, backend: Arc<dyn AssistantBackend>) -> Self {
        Self {
            database,
            backend,
            title_policy: TitlePolicy::default(),
            turn_locks: DashMap::new(),
        }
    }

    /// Override the title policy
    #[must_use]
    pub fn with_title_policy(mut self, policy: TitlePolicy) -> Self {
        self.title_policy = policy;
        self
    }

    /// Handle one inbound question, reporting every failure to the sink
    ///
    /// This is the connection-facing entry point: it never returns an
    /// error, because by the time a question reaches the controller the
    /// only remaining channel to the client is the event sink itself.
    pub async fn handle_question(&self, question: ChatQuestion, sink: &dyn EventSink) {
        if let Err(e) = self.run_turn(question, sink).await {
            warn!(error = %e, "Chat turn failed");
            sink.send(ServerEvent::BotError(e.to_string())).await;
        }
    }

    async fn run_turn(&self, question: ChatQuestion, sink: &dyn EventSink) -> AppResult<()> {
        debug!(state = TurnState::ResolvingThread.as_str(), "Turn state");

        let text = question
            .question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::invalid_request("Question is required"))?
            .to_owned();
        let user_id = question
            .user_id
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::invalid_request("userId is required"))?
            .to_owned();

        self.database.users().require(&user_id).await?;

        let resolved = self.resolve_thread(&user_id, question.chat_id.as_deref()).await?;

        // Serialize turns per external thread; the guard spans the rest
        // of the turn, including the stream relay.
        let thread_key = resolved.thread_id.clone();
        let lock = self
            .turn_locks
            .entry(thread_key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock().await;

        let outcome = self.run_locked_turn(&user_id, &text, resolved, sink).await;

        drop(guard);
        // Prune the entry once no other turn holds a handle to it
        self.turn_locks
            .remove_if(&thread_key, |_, v| Arc::strong_count(v) <= 2);

        outcome
    }

    async fn resolve_thread(
        &self,
        user_id: &str,
        chat_id: Option<&str>,
    ) -> AppResult<ResolvedThread> {
        if let Some(chat_id) = chat_id.filter(|c| !c.trim().is_empty()) {
            // Ownership is checked before anything reaches the backend
            let chat = self
                .database
                .chats()
                .get_chat(chat_id, user_id)
                .await?
                .ok_or_else(AppError::chat_not_found)?;
            return Ok(ResolvedThread {
                chat_id: Some(chat.id),
                thread_id: chat.thread_id,
                is_new_chat: false,
            });
        }

        let thread_id = self.backend.create_thread().await?;
        debug!(thread_id = %thread_id, "Created assistant thread");
        Ok(ResolvedThread {
            chat_id: None,
            thread_id,
            is_new_chat: true,
        })
    }

    async fn run_locked_turn(
        &self,
        user_id: &str,
        text: &str,
        resolved: ResolvedThread,
        sink: &dyn EventSink,
    ) -> AppResult<()> {
        let chat_id = if let Some(chat_id) = resolved.chat_id {
            chat_id
        } else {
            let title = self.title_policy.derive(self.backend.as_ref(), text).await;
            let chat = self
                .database
                .chats()
                .create_chat(user_id, &resolved.thread_id, &title)
                .await?;
            info!(chat_id = %chat.id, title = %title, "Created chat");

            // Both identity events precede any streamed content
            sink.send(ServerEvent::ChatTitle(title)).await;
            sink.send(ServerEvent::ChatId(chat.id.clone())).await;
            chat.id
        };

        debug!(state = TurnState::AppendingTurn.as_str(), chat_id = %chat_id, "Turn state");
        self.backend.append_turn(&resolved.thread_id, text).await?;
        self.database
            .chats()
            .add_message(&chat_id, MessageRole::User, text)
            .await?;

        debug!(state = TurnState::Streaming.as_str(), chat_id = %chat_id, "Turn state");
        let mut stream = self.backend.stream_run(&resolved.thread_id).await?;
        let mut answer = String::new();

        while let Some(item) = stream.next().await {
            match item {
                Ok(RunEvent::MessageDelta { text, fragment }) => {
                    answer.push_str(&text);
                    sink.send(ServerEvent::BotChunk(fragment)).await;
                }
                Ok(RunEvent::RunCompleted) => {
                    return self
                        .finish_turn(&chat_id, resolved.is_new_chat, &answer, sink)
                        .await;
                }
                Ok(RunEvent::MessageError { message }) => {
                    // Partial output is discarded; the persisted history
                    // keeps the user's question only.
                    warn!(chat_id = %chat_id, error = %message, "Assistant run reported an error");
                    sink.send(ServerEvent::BotError(message)).await;
                    return Ok(());
                }
                Err(e) => {
                    warn!(chat_id = %chat_id, error = %e, "Run stream failed");
                    sink.send(ServerEvent::BotError(e.to_string())).await;
                    return Ok(());
                }
            }
        }

        warn!(chat_id = %chat_id, "Run stream ended without a terminal event");
        sink.send(ServerEvent::BotError(
            "Stream ended unexpectedly".to_owned(),
        ))
        .await;
        Ok(())
    }

    async fn finish_turn(
        &self,
        chat_id: &str,
        is_new_chat: bool,
        answer: &str,
        sink: &dyn EventSink,
    ) -> AppResult<()> {
        if !answer.is_empty() {
            self.database
                .chats()
                .add_message(chat_id, MessageRole::Assistant, answer)
                .await?;
        }
        self.database.chats().touch_chat(chat_id).await?;

        debug!(state = TurnState::Done.as_str(), chat_id = %chat_id, "Turn state");
        sink.send(ServerEvent::BotEnd(TurnComplete {
            chat_id: Some(chat_id.to_owned()),
            is_new_chat,
            message: TURN_COMPLETE_MESSAGE.to_owned(),
        }))
        .await;
        Ok(())
    }
}
