mod room;
mod session;
mod signaling;

pub use room::{RoomCode, RoomCodeError, RosterEntry};
pub use session::SessionId;
pub use signaling::{
    ClientMessage, IceCandidate, SdpKind, ServerMessage, SessionDescription, SignalPayload,
};
