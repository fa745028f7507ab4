use std::sync::Arc;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{sink::SinkExt, stream::StreamExt};
use tracing::{debug, info, warn};
use crate::api::ApiState;
use crate::hub::{BroadcastMessage, ClientMessage};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ApiState>>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<ApiState>) {
    let init = BroadcastMessage::init(state.store.snapshot());
    let mut handle = match state.hub.subscribe_with(&init) {
        Ok(handle) => handle,
        Err(e) => {
            warn!(error = %e, "Could not register websocket subscriber");
            return;
        }
    };
    let id = handle.id();
    let (mut sender, mut receiver) = socket.split();

    // Forward hub messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = handle.recv().await {
            if sender.send(Message::Text(payload.to_string())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    // Broadcasts stay global; the intent is only recorded.
                    Ok(ClientMessage::SubscribeToken { address }) => {
                        info!(subscriber = %id, address = %address, "Client subscribed to token");
                    }
                    Err(e) => debug!(subscriber = %id, "Ignoring client message: {}", e),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    state.hub.unsubscribe(id);
}
