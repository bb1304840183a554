
use audiosync_core::{ClientMessage, RoomCode, SessionId};
use audiosync_server::Coordinator;
use tracing::Level;

use crate::utils::{MockSignalingOutput, joined_code};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Has a fresh session create a room and returns it with the room code.
pub fn open_room(coordinator: &Coordinator, output: &MockSignalingOutput) -> (SessionId, RoomCode) {
    let admin = SessionId::new();
    coordinator.handle(
        admin,
        ClientMessage::Create {
            name: "admin".into(),
        },
    );
    let code = joined_code(&output.messages_for(&admin)).expect("create should reply with joined");
    (admin, code)
}

/// Joins a fresh session named `name` into `code`.
pub fn join(coordinator: &Coordinator, code: &RoomCode, name: &str) -> SessionId {
    let id = SessionId::new();
    coordinator.handle(
        id,
        ClientMessage::Join {
            name: name.into(),
            room_code: code.clone(),
        },
    );
    id
}
