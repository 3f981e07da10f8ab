// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! WebSocket push channel.
//!
//! Each connection registers as an observer, gets a welcome line and then
//! one JSON text frame per changed field. Nothing is replayed on connect.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};

use crate::engine::ObserverRegistry;
use crate::state::AppState;

/// First frame sent to every observer
pub const WELCOME: &str = "Welcome new client!";

/// GET /ws - Upgrade to the push channel
pub async fn push_channel(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let observers = state.observers.clone();
    ws.on_upgrade(move |socket| push_session(socket, observers))
}

async fn push_session(socket: WebSocket, observers: ObserverRegistry) {
    let mut observer = observers.register();
    let id = observer.id;
    let (mut sender, mut receiver) = socket.split();

    if sender.send(Message::Text(WELCOME.to_string())).await.is_err() {
        observers.unregister(id);
        return;
    }

    loop {
        tokio::select! {
            message = observer.messages.recv() => {
                let Some(message) = message else { break };
                let text = match message.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!("Failed to encode {:?}: {}", message, e);
                        continue;
                    }
                };
                if sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Observers have nothing to say
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    observers.unregister(id);
}
