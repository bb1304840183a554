use crate::model::room::{RoomCode, RosterEntry};
use crate::model::session::SessionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// Session description in the `{type, sdp}` shape browsers exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default)]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default)]
    pub username_fragment: Option<String>,
}

/// Messages a participant sends to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    Create {
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    Join {
        name: String,
        room_code: RoomCode,
    },
    #[serde(rename_all = "camelCase")]
    Offer {
        target_id: SessionId,
        sdp: SessionDescription,
    },
    #[serde(rename_all = "camelCase")]
    Answer {
        target_id: SessionId,
        sdp: SessionDescription,
    },
    #[serde(rename_all = "camelCase")]
    Candidate {
        target_id: SessionId,
        candidate: IceCandidate,
    },
    #[serde(rename_all = "camelCase")]
    SetBroadcaster {
        #[serde(default)]
        target_id: Option<SessionId>,
    },
    Leave,
}

impl ClientMessage {
    /// Splits a point-to-point signaling message into its target and payload.
    pub fn into_relay(self) -> Result<(SessionId, SignalPayload), Self> {
        match self {
            ClientMessage::Offer { target_id, sdp } => Ok((target_id, SignalPayload::Offer(sdp))),
            ClientMessage::Answer { target_id, sdp } => {
                Ok((target_id, SignalPayload::Answer(sdp)))
            }
            ClientMessage::Candidate {
                target_id,
                candidate,
            } => Ok((target_id, SignalPayload::Candidate(candidate))),
            other => Err(other),
        }
    }
}

/// Payload of a relayed negotiation message, independent of direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalPayload {
    Offer(SessionDescription),
    Answer(SessionDescription),
    Candidate(IceCandidate),
}

impl SignalPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            SignalPayload::Offer(_) => "offer",
            SignalPayload::Answer(_) => "answer",
            SignalPayload::Candidate(_) => "candidate",
        }
    }

    /// Message the coordinator delivers to the target.
    pub fn into_delivery(self, sender_id: SessionId) -> ServerMessage {
        match self {
            SignalPayload::Offer(sdp) => ServerMessage::Offer { sender_id, sdp },
            SignalPayload::Answer(sdp) => ServerMessage::Answer { sender_id, sdp },
            SignalPayload::Candidate(candidate) => ServerMessage::Candidate {
                sender_id,
                candidate,
            },
        }
    }

    /// Message a participant sends to reach `target_id`.
    pub fn into_request(self, target_id: SessionId) -> ClientMessage {
        match self {
            SignalPayload::Offer(sdp) => ClientMessage::Offer { target_id, sdp },
            SignalPayload::Answer(sdp) => ClientMessage::Answer { target_id, sdp },
            SignalPayload::Candidate(candidate) => ClientMessage::Candidate {
                target_id,
                candidate,
            },
        }
    }
}

/// Messages the coordinator sends to a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Joined {
        id: SessionId,
        room_code: RoomCode,
        is_admin: bool,
    },
    Error {
        message: String,
    },
    RoomUpdate {
        peers: Vec<RosterEntry>,
    },
    #[serde(rename_all = "camelCase")]
    Offer {
        sender_id: SessionId,
        sdp: SessionDescription,
    },
    #[serde(rename_all = "camelCase")]
    Answer {
        sender_id: SessionId,
        sdp: SessionDescription,
    },
    #[serde(rename_all = "camelCase")]
    Candidate {
        sender_id: SessionId,
        candidate: IceCandidate,
    },
    YouAreBroadcaster,
    #[serde(rename_all = "camelCase")]
    BroadcasterChanged {
        broadcaster_id: Option<SessionId>,
    },
}
