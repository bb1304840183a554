/// Hard cap on the number of sessions sharing one room.
pub const MAX_ROOM_MEMBERS: usize = 7;

/// WebSocket route the coordinator listens on.
pub const WS_PATH: &str = "/ws";

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";
