use audiosync_core::{RoomCode, RosterEntry, SessionId};

/// Requests from the embedding application.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    StartBroadcast,
    StopBroadcast,
    /// Admin only; the coordinator ignores it from anyone else.
    SetBroadcaster(Option<SessionId>),
    Leave,
}

/// Notifications for the embedding application.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Joined {
        id: SessionId,
        room_code: RoomCode,
        is_admin: bool,
    },
    Roster(Vec<RosterEntry>),
    BecameBroadcaster,
    BroadcasterChanged(Option<SessionId>),
    /// Error text reported by the coordinator.
    Rejected(String),
    CaptureFailed(String),
    Disconnected,
}

/// How the runtime enters a room once connected.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinMode {
    Create,
    Join(RoomCode),
}
