use audiosync_core::RoomCode;
use thiserror::Error;

/// Failures of registry operations. The `Display` text is what the requester sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Room not found")]
    RoomNotFound { code: RoomCode },

    #[error("Room is full (Max {capacity})")]
    RoomFull { code: RoomCode, capacity: usize },

    #[error("Unable to allocate a room code")]
    Exhausted { attempts: usize },

    #[error("Session is not in a room")]
    NotInRoom,
}

/// Inbound frames that do not decode into a known message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("binary frames are not supported")]
    Binary,
}
