use audiosync_core::{ServerMessage, SessionId};

/// Outbound side of the coordinator: queues a message for one connected
/// session. Implementations must not block, since callers may hold a room lock.
pub trait SignalingOutput: Send + Sync {
    /// Returns `false` when the session is unknown or its connection is gone.
    fn send(&self, session: SessionId, msg: &ServerMessage) -> bool;
}
