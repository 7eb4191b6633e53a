// ABOUTME: OpenAI Assistants v2 backend: threads, streamed runs, and one-shot completions
// ABOUTME: Parses the named-event SSE run stream into RunEvent values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

use crate::config::OpenAiConfig;
use crate::errors::{AppError, AppResult};
use crate::llm::{AssistantBackend, CompletionRequest, RunEvent, RunStream};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Display name of the process-wide assistant
const ASSISTANT_NAME: &str = "Ellara";

/// Instructions for the streaming assistant
const ASSISTANT_INSTRUCTIONS: &str = "You are Ellara, an assistant for merchants accepting \
QR crypto payments. Help with payment questions, transaction lookups, and settlement \
status. Be concise and never invent transaction data.";

#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

/// OpenAI Assistants v2 client
///
/// One assistant is created per process on first use and its id cached;
/// every streamed run references it.
pub struct OpenAiAssistantClient {
    client: reqwest::Client,
    config: OpenAiConfig,
    assistant_id: OnceCell<String>,
}

impl OpenAiAssistantClient {
    /// Create a client from configuration
    #[must_use]
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            assistant_id: OnceCell::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .bearer_auth(&self.config.api_key)
            .header("OpenAI-Beta", "assistants=v2")
            .header("Content-Type", "application/json")
    }

    async fn post_json(&self, path: &str, body: Value) -> AppResult<Value> {
        let response = self
            .request(path)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::vendor(format!("Request to {path} failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::vendor(format!("Reading {path} response failed: {e}")))?;

        if !status.is_success() {
            return Err(AppError::vendor(format!(
                "{path} returned {status}: {text}"
            )));
        }

        serde_json::from_str(&text)
            .map_err(|e| AppError::vendor(format!("Malformed {path} response: {e}")))
    }

    /// Lazily create the process-wide assistant and cache its id
    async fn assistant_id(&self) -> AppResult<&str> {
        self.assistant_id
            .get_or_try_init(|| async {
                let body = json!({
                    "model": self.config.assistant_model,
                    "name": ASSISTANT_NAME,
                    "instructions": ASSISTANT_INSTRUCTIONS,
                });
                let created: CreatedObject =
                    serde_json::from_value(self.post_json("assistants", body).await?)
                        .map_err(|e| AppError::vendor(format!("Malformed assistant: {e}")))?;
                debug!(assistant_id = %created.id, "Created assistant");
                Ok::<_, AppError>(created.id)
            })
            .await
            .map(String::as_str)
    }
}

/// Extract the delta text from a `thread.message.delta` payload
fn delta_text(delta: &Value) -> String {
    delta
        .get("content")
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("text"))
        .and_then(|text| text.get("value"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Translate one named SSE event into a run event, `None` for events the
/// relay does not care about
fn map_run_event(event_name: &str, data: &str) -> Option<Result<RunEvent, AppError>> {
    match event_name {
        "thread.message.delta" => {
            let payload: Value = match serde_json::from_str(data) {
                Ok(value) => value,
                Err(e) => {
                    return Some(Err(AppError::stream(format!(
                        "Malformed delta event: {e}"
                    ))))
                }
            };
            let fragment = payload.get("delta").cloned().unwrap_or(Value::Null);
            let text = delta_text(&fragment);
            Some(Ok(RunEvent::MessageDelta { text, fragment }))
        }
        "thread.run.completed" => Some(Ok(RunEvent::RunCompleted)),
        "thread.message.error" => {
            let message = serde_json::from_str::<Value>(data)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
                .unwrap_or_else(|| "Unknown error".to_owned());
            Some(Ok(RunEvent::MessageError { message }))
        }
        "thread.run.failed" => {
            let message = serde_json::from_str::<Value>(data)
                .ok()
                .and_then(|v| {
                    v.pointer("/last_error/message")
                        .and_then(Value::as_str)
                        .map(str::to_owned)
                })
                .unwrap_or_else(|| "Run failed".to_owned());
            Some(Ok(RunEvent::MessageError { message }))
        }
        _ => None,
    }
}

#[async_trait]
impl AssistantBackend for OpenAiAssistantClient {
    async fn create_thread(&self) -> AppResult<String> {
        let created: CreatedObject =
            serde_json::from_value(self.post_json("threads", json!({})).await?)
                .map_err(|e| AppError::vendor(format!("Malformed thread: {e}")))?;
        Ok(created.id)
    }

    async fn append_turn(&self, thread_id: &str, content: &str) -> AppResult<()> {
        let body = json!({ "role": "user", "content": content });
        self.post_json(&format!("threads/{thread_id}/messages"), body)
            .await?;
        Ok(())
    }

    async fn stream_run(&self, thread_id: &str) -> AppResult<RunStream> {
        let assistant_id = self.assistant_id().await?.to_owned();

        let response = self
            .request(&format!("threads/{thread_id}/runs"))
            .header("Accept", "text/event-stream")
            .json(&json!({ "assistant_id": assistant_id, "stream": true }))
            .send()
            .await
            .map_err(|e| AppError::vendor(format!("Failed to start run: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::vendor(format!(
                "Run start returned {status}: {text}"
            )));
        }

        let mut events = response.bytes_stream().eventsource();

        let stream = async_stream::stream! {
            while let Some(item) = events.next().await {
                match item {
                    Ok(event) => {
                        if event.data.trim() == "[DONE]" {
                            break;
                        }
                        if let Some(mapped) = map_run_event(&event.event, &event.data) {
                            yield mapped;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Run stream transport error");
                        yield Err(AppError::stream(e.to_string()));
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn generate(&self, request: &CompletionRequest) -> AppResult<String> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.title_model.clone());

        let body = json!({
            "model": model,
            "messages": request.messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let response: CompletionResponse =
            serde_json::from_value(self.post_json("chat/completions", body).await?)
                .map_err(|e| AppError::vendor(format!("Malformed completion: {e}")))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(|content| content.trim().to_owned())
            .ok_or_else(|| AppError::vendor("Completion returned no content"))
    }
}
