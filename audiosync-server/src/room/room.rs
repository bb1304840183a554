use audiosync_core::{RoomCode, RosterEntry, SessionId};

/// A session's membership record inside one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: SessionId,
    pub name: String,
    pub is_admin: bool,
    pub is_broadcaster: bool,
}

impl Member {
    pub fn new(id: SessionId, name: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_admin,
            is_broadcaster: false,
        }
    }

    pub fn roster_entry(&self) -> RosterEntry {
        RosterEntry {
            id: self.id,
            name: self.name.clone(),
            is_admin: self.is_admin,
            is_broadcaster: self.is_broadcaster,
        }
    }
}

/// Members of one room in join order. Only the registry mutates it.
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    members: Vec<Member>,
    capacity: usize,
}

impl Room {
    pub(crate) fn new(code: RoomCode, capacity: usize) -> Self {
        Self {
            code,
            members: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, id: &SessionId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.member(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn broadcaster(&self) -> Option<&Member> {
        self.members.iter().find(|m| m.is_broadcaster)
    }

    pub fn roster(&self) -> Vec<RosterEntry> {
        self.members.iter().map(Member::roster_entry).collect()
    }

    pub(crate) fn add(&mut self, member: Member) {
        self.members.push(member);
    }

    pub(crate) fn remove(&mut self, id: &SessionId) -> Option<Member> {
        let idx = self.members.iter().position(|m| &m.id == id)?;
        Some(self.members.remove(idx))
    }

    /// Flags `target` as the only broadcaster, or clears the flag everywhere.
    /// Returns the member that now holds the role.
    pub(crate) fn assign_broadcaster(&mut self, target: Option<SessionId>) -> Option<SessionId> {
        for member in &mut self.members {
            member.is_broadcaster = Some(member.id) == target;
        }
        self.broadcaster().map(|m| m.id)
    }
}
