//! `GET /api/subscribe`: live content change feed over WebSocket.
//!
//! Each published `ContentEvent` goes out as one JSON text frame. Clients
//! treat a frame as "re-fetch this collection"; a lagging client silently
//! skips what it missed.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;

use super::{ApiResult, AppState};
use crate::events::{next_event, EventBus};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/subscribe", get(subscribe))
}

async fn subscribe(State(state): State<AppState>, ws: WebSocketUpgrade) -> ApiResult<Response> {
    let backend = state.backend()?;
    Ok(ws.on_upgrade(move |socket| forward_events(socket, backend.events)))
}

async fn forward_events(mut socket: WebSocket, bus: EventBus) {
    let mut rx = bus.subscribe();
    tracing::debug!("Content subscriber connected");

    loop {
        tokio::select! {
            event = next_event(&mut rx) => {
                let Some(event) = event else { break };
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to encode content event");
                        continue;
                    }
                };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!("Content subscriber disconnected");
}
