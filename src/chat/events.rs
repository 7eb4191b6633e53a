// ABOUTME: Wire events of the realtime chat channel and the client sink seam
// ABOUTME: Inbound questions parse from object or JSON-string form; outbound events are tagged
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound question event from a client
#[derive(Debug, Clone, Deserialize)]
pub struct ChatQuestion {
    /// The question text
    #[serde(default)]
    pub question: Option<String>,
    /// The asking user's id
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    /// Existing chat to continue, absent for a new conversation
    #[serde(rename = "chatId", default)]
    pub chat_id: Option<String>,
}

impl ChatQuestion {
    /// Parse an inbound frame
    ///
    /// Clients may send either the JSON object directly or a JSON string
    /// containing the encoded object; both forms are accepted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when the frame is neither form.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| AppError::invalid_request(format!("Message must be valid JSON: {e}")))?;

        let object = match value {
            Value::String(inner) => serde_json::from_str(&inner).map_err(|e| {
                AppError::invalid_request(format!("Encoded message must be an object: {e}"))
            })?,
            Value::Object(_) => value,
            _ => {
                return Err(AppError::invalid_request(
                    "Message must be a valid string or object",
                ))
            }
        };

        serde_json::from_value(object)
            .map_err(|e| AppError::invalid_request(format!("Malformed message: {e}")))
    }
}

/// End-of-turn payload of a `bot_end` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnComplete {
    /// The chat this turn belongs to
    #[serde(rename = "chatId")]
    pub chat_id: Option<String>,
    /// True when this turn created the chat
    #[serde(rename = "isNewChat")]
    pub is_new_chat: bool,
    /// Completion message
    pub message: String,
}

/// Outbound events relayed to a connected client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Derived title of a brand-new chat, sent before streaming
    ChatTitle(String),
    /// Id of a brand-new chat, sent before streaming
    ChatId(String),
    /// Vendor-shaped incremental fragment
    BotChunk(Value),
    /// Successful end of turn
    BotEnd(TurnComplete),
    /// Any failure, in place of (or instead of reaching) `bot_end`
    BotError(String),
}

impl ServerEvent {
    /// Wire name of this event
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ChatTitle(_) => "chat_title",
            Self::ChatId(_) => "chat_id",
            Self::BotChunk(_) => "bot_chunk",
            Self::BotEnd(_) => "bot_end",
            Self::BotError(_) => "bot_error",
        }
    }
}

/// Delivery seam between the session controller and one connected client
///
/// Implementations must not block the controller; delivery failure
/// (a disconnected client) is reported but the controller ignores it so
/// an in-flight run is always consumed to its terminal event.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one event; returns false when the client is gone
    async fn send(&self, event: ServerEvent) -> bool;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_form() {
        let parsed =
            ChatQuestion::parse(r#"{"question":"hi","userId":"u1","chatId":"c1"}"#).unwrap();
        assert_eq!(parsed.question.as_deref(), Some("hi"));
        assert_eq!(parsed.user_id.as_deref(), Some("u1"));
        assert_eq!(parsed.chat_id.as_deref(), Some("c1"));
    }

    #[test]
    fn parses_json_string_form() {
        let inner = r#"{"question":"hi","userId":"u1"}"#;
        let framed = serde_json::to_string(inner).unwrap();
        let parsed = ChatQuestion::parse(&framed).unwrap();
        assert_eq!(parsed.question.as_deref(), Some("hi"));
        assert!(parsed.chat_id.is_none());
    }

    #[test]
    fn rejects_non_object_forms() {
        assert!(ChatQuestion::parse("42").is_err());
        assert!(ChatQuestion::parse("not json").is_err());
        assert!(ChatQuestion::parse(r#""not an object""#).is_err());
    }

    #[test]
    fn events_serialize_with_wire_names() {
        let event = ServerEvent::BotEnd(TurnComplete {
            chat_id: Some("c1".to_owned()),
            is_new_chat: true,
            message: "Response completed".to_owned(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "bot_end");
        assert_eq!(json["data"]["chatId"], "c1");
        assert_eq!(json["data"]["isNewChat"], true);
        assert_eq!(event.name(), "bot_end");
    }
}
