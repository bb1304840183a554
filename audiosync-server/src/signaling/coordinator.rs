use crate::error::{ProtocolError, RegistryError};
use crate::room::{BroadcasterElection, RoomRegistry};
use crate::signaling::{SignalingOutput, SignalingRouter};
use audiosync_core::{ClientMessage, ServerMessage, SessionId};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Entry point for inbound messages: one call handles one message from one
/// session to completion.
#[derive(Clone)]
pub struct Coordinator {
    registry: Arc<RoomRegistry>,
    router: SignalingRouter,
    election: Arc<BroadcasterElection>,
}

impl Coordinator {
    pub fn new(registry: Arc<RoomRegistry>, output: Arc<dyn SignalingOutput>) -> Self {
        let router = SignalingRouter::new(registry.clone(), output);
        let election = Arc::new(BroadcasterElection::new(registry.clone(), router.clone()));
        Self {
            registry,
            router,
            election,
        }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Decodes a text frame and handles it.
    pub fn handle_text(&self, session: SessionId, text: &str) -> Result<(), ProtocolError> {
        let msg = serde_json::from_str::<ClientMessage>(text)?;
        self.handle(session, msg);
        Ok(())
    }

    pub fn handle(&self, session: SessionId, msg: ClientMessage) {
        match msg {
            ClientMessage::Create { name } => {
                if let Err(e) = self.registry.create_room(session, &name, &self.router) {
                    error!("Room creation for {} failed: {}", session, e);
                    self.reject(session, e);
                }
            }

            ClientMessage::Join { name, room_code } => {
                if let Err(e) = self
                    .registry
                    .join_room(&room_code, session, &name, &self.router)
                {
                    info!("{} could not join {}: {}", session, room_code, e);
                    self.reject(session, e);
                }
            }

            ClientMessage::SetBroadcaster { target_id } => {
                self.election.set_broadcaster(session, target_id);
            }

            ClientMessage::Leave => {
                self.registry.leave_room(session, &self.router);
            }

            relayed @ (ClientMessage::Offer { .. }
            | ClientMessage::Answer { .. }
            | ClientMessage::Candidate { .. }) => match relayed.into_relay() {
                Ok((target, payload)) => {
                    self.router.relay(session, target, payload);
                }
                Err(other) => warn!("Unexpected relay message from {}: {:?}", session, other),
            },
        }
    }

    /// Removes a closed connection from its room.
    pub fn disconnect(&self, session: SessionId) {
        if let Some(code) = self.registry.leave_room(session, &self.router) {
            info!("{} disconnected from room {}", session, code);
        }
    }

    fn reject(&self, session: SessionId, e: RegistryError) {
        self.router.send_to(
            session,
            &ServerMessage::Error {
                message: e.to_string(),
            },
        );
    }
}
