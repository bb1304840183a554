use crate::room::{Room, RoomEvents, RoomRegistry};
use crate::signaling::SignalingOutput;
use audiosync_core::{ServerMessage, SessionId, SignalPayload};
use std::sync::Arc;
use tracing::debug;

/// Point-to-point relay of negotiation messages and roster fan-out.
#[derive(Clone)]
pub struct SignalingRouter {
    registry: Arc<RoomRegistry>,
    output: Arc<dyn SignalingOutput>,
}

impl SignalingRouter {
    pub fn new(registry: Arc<RoomRegistry>, output: Arc<dyn SignalingOutput>) -> Self {
        Self { registry, output }
    }

    /// Forwards `payload` from `sender` to `target` when both share a room.
    /// Anything else is dropped without telling the sender.
    pub fn relay(&self, sender: SessionId, target: SessionId, payload: SignalPayload) -> bool {
        let kind = payload.kind();
        let delivered = self.registry.with_room_of(sender, |room| {
            if !room.contains(&target) {
                return false;
            }
            self.output.send(target, &payload.into_delivery(sender))
        });

        match delivered {
            Some(true) => true,
            Some(false) => {
                debug!("Dropped {} from {}: {} is not in the room", kind, sender, target);
                false
            }
            None => {
                debug!("Dropped {} from {}: sender is not in a room", kind, sender);
                false
            }
        }
    }

    /// Sends the current roster to every member of `room`.
    pub fn broadcast_roster(&self, room: &Room) {
        let update = ServerMessage::RoomUpdate {
            peers: room.roster(),
        };
        for member in room.members() {
            self.output.send(member.id, &update);
        }
    }

    pub fn send_to(&self, session: SessionId, msg: &ServerMessage) -> bool {
        self.output.send(session, msg)
    }
}

impl RoomEvents for SignalingRouter {
    fn joined(&self, room: &Room, session: SessionId) {
        if let Some(member) = room.member(&session) {
            self.output.send(
                session,
                &ServerMessage::Joined {
                    id: session,
                    room_code: room.code().clone(),
                    is_admin: member.is_admin,
                },
            );
        }
        self.broadcast_roster(room);
    }

    fn changed(&self, room: &Room) {
        self.broadcast_roster(room);
    }
}
