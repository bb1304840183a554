use crate::model::session::SessionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomCodeError {
    #[error("room code must be {expected} characters, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("room code contains invalid character {0:?}")]
    Character(char),
}

/// Six-character uppercase base-36 room identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    pub const LEN: usize = 6;

    /// Number of distinct codes (36^6).
    pub const SPACE: u32 = 36u32.pow(6);

    pub fn parse(s: &str) -> Result<Self, RoomCodeError> {
        let actual = s.chars().count();
        if actual != Self::LEN {
            return Err(RoomCodeError::Length {
                expected: Self::LEN,
                actual,
            });
        }
        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_digit() || c.is_ascii_uppercase()))
        {
            return Err(RoomCodeError::Character(c));
        }
        Ok(Self(s.to_owned()))
    }

    /// Encodes `index` (reduced modulo [`RoomCode::SPACE`]) as a zero-padded base-36 code.
    pub fn from_index(index: u32) -> Self {
        let mut n = index % Self::SPACE;
        let mut buf = [b'0'; Self::LEN];
        for slot in buf.iter_mut().rev() {
            *slot = ALPHABET[(n % 36) as usize];
            n /= 36;
        }
        Self(buf.iter().map(|&b| b as char).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = RoomCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only projection of a room member as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: SessionId,
    pub name: String,
    pub is_admin: bool,
    pub is_broadcaster: bool,
}
