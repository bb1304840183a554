use crate::signaling::SignalingOutput;
use audiosync_core::{ServerMessage, SessionId};
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Connection-side record of one participant.
pub struct Session {
    pub id: SessionId,
    pub remote_addr: SocketAddr,
    pub connected_at: Instant,
    outbound: mpsc::UnboundedSender<Message>,
}

/// Live connections keyed by session id, each with its outbound queue.
#[derive(Default)]
pub struct SessionTable {
    sessions: DashMap<SessionId, Session>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh connection and returns its newly minted id.
    pub fn open(&self, remote_addr: SocketAddr, outbound: mpsc::UnboundedSender<Message>) -> SessionId {
        let id = SessionId::new();
        self.sessions.insert(
            id,
            Session {
                id,
                remote_addr,
                connected_at: Instant::now(),
                outbound,
            },
        );
        id
    }

    pub fn close(&self, id: &SessionId) -> Option<Session> {
        self.sessions.remove(id).map(|(_, session)| session)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn send_signal(&self, id: SessionId, msg: &ServerMessage) -> bool {
        let Some(session) = self.sessions.get(&id) else {
            warn!("Attempted to send signal to disconnected session {}", id);
            return false;
        };

        match serde_json::to_string(msg) {
            Ok(json) => match session.outbound.send(Message::Text(json.into())) {
                Ok(()) => true,
                Err(e) => {
                    error!("Failed to queue WS message to {}: {}", id, e);
                    false
                }
            },
            Err(e) => {
                error!("Failed to serialize signal message: {}", e);
                false
            }
        }
    }
}

impl SignalingOutput for SessionTable {
    fn send(&self, session: SessionId, msg: &ServerMessage) -> bool {
        self.send_signal(session, msg)
    }
}
