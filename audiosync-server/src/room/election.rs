use crate::room::registry::RoomRegistry;
use crate::room::room::Room;
use crate::signaling::SignalingRouter;
use audiosync_core::{ServerMessage, SessionId};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectionOutcome {
    /// The role now belongs to the contained member, or to nobody.
    Assigned(Option<SessionId>),
    /// Requester is not an admin member of a room; nothing changed.
    Ignored,
}

/// Admin-gated assignment of the single broadcaster role.
pub struct BroadcasterElection {
    registry: Arc<RoomRegistry>,
    router: SignalingRouter,
}

impl BroadcasterElection {
    pub fn new(registry: Arc<RoomRegistry>, router: SignalingRouter) -> Self {
        Self { registry, router }
    }

    /// Hands the role to `target` (or clears it for `None`) when `requester`
    /// is the admin of its room. Reassigning over an active broadcaster is
    /// allowed. Unauthorized requests are dropped without a reply.
    pub fn set_broadcaster(
        &self,
        requester: SessionId,
        target: Option<SessionId>,
    ) -> ElectionOutcome {
        let is_admin = self
            .registry
            .with_room_of(requester, |room| {
                room.member(&requester).is_some_and(|m| m.is_admin)
            })
            .unwrap_or(false);

        if !is_admin {
            debug!("Ignoring set-broadcaster from non-admin {}", requester);
            return ElectionOutcome::Ignored;
        }

        match self
            .registry
            .assign_broadcaster(requester, target, |room, chosen| {
                self.announce(room, chosen)
            }) {
            Ok(chosen) => ElectionOutcome::Assigned(chosen),
            Err(e) => {
                warn!("set-broadcaster from {} failed: {}", requester, e);
                ElectionOutcome::Ignored
            }
        }
    }

    fn announce(&self, room: &Room, chosen: Option<SessionId>) {
        self.router.broadcast_roster(room);

        for member in room.members() {
            let msg = if Some(member.id) == chosen {
                ServerMessage::YouAreBroadcaster
            } else {
                ServerMessage::BroadcasterChanged {
                    broadcaster_id: chosen,
                }
            };
            self.router.send_to(member.id, &msg);
        }
    }
}
