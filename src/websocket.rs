// ABOUTME: Realtime chat channel over WebSocket
// ABOUTME: Parses inbound question frames and forwards session events back to the client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

use crate::chat::{ChatQuestion, EventSink, ServerEvent};
use crate::resources::ServerResources;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Sink delivering session events to one connected client
///
/// Events go through an unbounded channel drained by the connection's
/// forwarder task, so the session controller never blocks on a slow
/// client. A send failure means the client is gone.
struct WsEventSink {
    connection_id: Uuid,
    tx: tokio::sync::mpsc::UnboundedSender<Message>,
}

#[async_trait]
impl EventSink for WsEventSink {
    async fn send(&self, event: ServerEvent) -> bool {
        let name = event.name();
        let Ok(json) = serde_json::to_string(&event) else {
            warn!(connection_id = %self.connection_id, event = name, "Failed to serialize event");
            return false;
        };
        let delivered = self.tx.send(Message::Text(json)).is_ok();
        if !delivered {
            debug!(
                connection_id = %self.connection_id,
                event = name,
                "Client disconnected, dropping event"
            );
        }
        delivered
    }
}

/// Axum handler upgrading `GET /ws`
pub async fn websocket_handler(
    State(resources): State<Arc<ServerResources>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(resources, socket))
}

/// Drive one client connection until it closes
///
/// Questions on the same connection are handled sequentially; a
/// disconnect mid-turn does not abort the turn, the remaining events
/// are simply dropped by the sink.
pub async fn handle_connection(resources: Arc<ServerResources>, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let connection_id = Uuid::new_v4();
    debug!(connection_id = %connection_id, "WebSocket connected");

    // Forward outbound events to the socket
    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if ws_tx.send(message).await.is_err() {
                break;
            }
        }
    });

    let sink = WsEventSink {
        connection_id,
        tx: tx.clone(),
    };

    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Text(text)) => match ChatQuestion::parse(&text) {
                Ok(question) => {
                    resources.sessions.handle_question(question, &sink).await;
                }
                Err(e) => {
                    warn!(connection_id = %connection_id, error = %e, "Rejected inbound frame");
                    sink.send(ServerEvent::BotError(e.to_string())).await;
                }
            },
            Ok(Message::Close(_)) | Err(_) => break,
            _ => {}
        }
    }

    send_task.abort();
    debug!(connection_id = %connection_id, "WebSocket disconnected");
}
