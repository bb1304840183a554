use crate::app::AppState;
use crate::error::ProtocolError;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, remote_addr, state))
}

async fn handle_socket(socket: WebSocket, remote_addr: SocketAddr, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let session_id = state.sessions.open(remote_addr, tx);
    info!("New WebSocket connection: {} from {}", session_id, remote_addr);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let coordinator = state.coordinator.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                let result = match msg {
                    Message::Text(text) => coordinator.handle_text(session_id, text.as_str()),
                    Message::Binary(_) => Err(ProtocolError::Binary),
                    Message::Close(_) => break,
                    _ => Ok(()),
                };
                if let Err(e) = result {
                    warn!("Dropping message from {}: {}", session_id, e);
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.coordinator.disconnect(session_id);
    state.sessions.close(&session_id);
    info!("WebSocket disconnected: {}", session_id);
}
