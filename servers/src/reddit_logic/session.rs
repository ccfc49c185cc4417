use crate::reddit_logic::state::AppState;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use lib_common::ingestors::{ConnectionSession, PayloadSink, PushError};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Write half of one client's WebSocket.
pub struct WsSink(SplitSink<WebSocket, Message>);

#[async_trait]
impl PayloadSink for WsSink {
    async fn push(&mut self, message: String) -> Result<(), PushError> {
        self.0
            .send(Message::Text(message.into()))
            .await
            .map_err(|e| PushError::Send(e.to_string()))
    }
}

/// Runs one client's session until the client goes away.
pub async fn handle_socket(socket: WebSocket, state: AppState) {
    let session_id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
    let (sender, mut receiver) = socket.split();

    let connected = state.session_opened();
    log::info!("Client {} connected ({} connected)", session_id, connected);
    let handle = ConnectionSession::new(session_id, state.source.clone(), WsSink(sender))
        .with_period(state.poll_interval)
        .with_observer(state.observer.clone())
        .activate();

    // Clients never send anything meaningful; we only watch for the close.
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    handle.disconnect();
    if let Err(e) = handle.join().await {
        log::error!("Session {} task ended abnormally: {}", session_id, e);
    }
    let connected = state.session_closed();
    log::info!("Client {} disconnected ({} connected)", session_id, connected);
}
