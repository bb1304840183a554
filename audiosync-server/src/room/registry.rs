use crate::error::RegistryError;
use crate::room::room::{Member, Room};
use audiosync_core::utils::MAX_ROOM_MEMBERS;
use audiosync_core::{RoomCode, SessionId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Draws a candidate code for a new room.
pub type CodeSource = Arc<dyn Fn() -> RoomCode + Send + Sync>;

/// Hooks invoked while the affected room is still locked, so that
/// notifications for one room go out in mutation order.
pub trait RoomEvents {
    /// `session` has just been added to `room`.
    fn joined(&self, room: &Room, session: SessionId);

    /// Membership of `room` changed and it still has members.
    fn changed(&self, room: &Room);
}

pub fn random_room_code() -> RoomCode {
    RoomCode::from_index(rand::thread_rng().gen_range(0..RoomCode::SPACE))
}

/// Authoritative room membership.
///
/// Create, join, leave and role changes run one at a time under `mutations`,
/// so moving between rooms is a single step. Readers (relay, admin checks)
/// only take the room's map entry.
pub struct RoomRegistry {
    rooms: DashMap<RoomCode, Room>,
    memberships: DashMap<SessionId, RoomCode>,
    mutations: Mutex<()>,
    code_source: CodeSource,
    code_attempts: usize,
}

impl RoomRegistry {
    pub fn new(code_attempts: usize) -> Self {
        Self::with_code_source(Arc::new(random_room_code), code_attempts)
    }

    pub fn with_code_source(code_source: CodeSource, code_attempts: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            memberships: DashMap::new(),
            mutations: Mutex::new(()),
            code_source,
            code_attempts: code_attempts.max(1),
        }
    }

    /// Opens a room with `session` as its admin and only member.
    pub fn create_room(
        &self,
        session: SessionId,
        name: &str,
        events: &dyn RoomEvents,
    ) -> Result<RoomCode, RegistryError> {
        let _serial = self.lock_mutations();
        self.leave_locked(session, events);

        for _ in 0..self.code_attempts {
            let code = (self.code_source)();
            let Entry::Vacant(slot) = self.rooms.entry(code.clone()) else {
                debug!("Room code {} already in use, drawing again", code);
                continue;
            };

            let mut room = Room::new(code.clone(), MAX_ROOM_MEMBERS);
            room.add(Member::new(session, name, true));
            let room = slot.insert(room);
            self.memberships.insert(session, code.clone());

            info!("Room {} created by {}", code, session);
            events.joined(&room, session);
            return Ok(code);
        }

        warn!(
            "No free room code after {} attempts for {}",
            self.code_attempts, session
        );
        Err(RegistryError::Exhausted {
            attempts: self.code_attempts,
        })
    }

    /// Adds `session` to the room `code` as a regular member, leaving its
    /// current room first. A rejected join leaves membership untouched.
    pub fn join_room(
        &self,
        code: &RoomCode,
        session: SessionId,
        name: &str,
        events: &dyn RoomEvents,
    ) -> Result<(), RegistryError> {
        let _serial = self.lock_mutations();

        if self.room_of(session).as_ref() == Some(code) {
            return self.rejoin(code, session, name, events);
        }

        // Both guards cannot be held at once: the two rooms may share a shard.
        {
            let room = self.rooms.get(code).ok_or_else(|| not_found(code))?;
            if room.is_full() {
                return Err(full(&room));
            }
        }

        self.leave_locked(session, events);

        let mut room = self.rooms.get_mut(code).ok_or_else(|| not_found(code))?;
        room.add(Member::new(session, name, false));
        self.memberships.insert(session, code.clone());

        info!("{} joined room {} ({}/{})", session, code, room.len(), room.capacity());
        events.joined(&room, session);
        Ok(())
    }

    fn rejoin(
        &self,
        code: &RoomCode,
        session: SessionId,
        name: &str,
        events: &dyn RoomEvents,
    ) -> Result<(), RegistryError> {
        let mut room = self.rooms.get_mut(code).ok_or_else(|| not_found(code))?;
        room.remove(&session);
        room.add(Member::new(session, name, false));

        debug!("{} rejoined room {}", session, code);
        events.joined(&room, session);
        Ok(())
    }

    /// Removes `session` from its room, closing the room when it empties.
    /// Returns the room that was left, if any.
    pub fn leave_room(&self, session: SessionId, events: &dyn RoomEvents) -> Option<RoomCode> {
        let _serial = self.lock_mutations();
        self.leave_locked(session, events)
    }

    fn leave_locked(&self, session: SessionId, events: &dyn RoomEvents) -> Option<RoomCode> {
        let (_, code) = self.memberships.remove(&session)?;

        let emptied = match self.rooms.get_mut(&code) {
            Some(mut room) => {
                room.remove(&session);
                info!("{} left room {}", session, code);
                if room.is_empty() {
                    true
                } else {
                    events.changed(&room);
                    false
                }
            }
            None => false,
        };

        if emptied && self.rooms.remove(&code).is_some() {
            info!("Room {} closed", code);
        }

        Some(code)
    }

    /// Gives the broadcaster role in `requester`'s room to `target`, or clears
    /// it. `notify` runs under the room lock with the member now holding the role.
    pub fn assign_broadcaster(
        &self,
        requester: SessionId,
        target: Option<SessionId>,
        notify: impl FnOnce(&Room, Option<SessionId>),
    ) -> Result<Option<SessionId>, RegistryError> {
        let _serial = self.lock_mutations();
        let code = self.room_of(requester).ok_or(RegistryError::NotInRoom)?;
        let mut room = self.rooms.get_mut(&code).ok_or(RegistryError::NotInRoom)?;

        let chosen = room.assign_broadcaster(target);
        info!("Broadcaster of room {} is now {:?}", code, chosen);
        notify(&room, chosen);
        Ok(chosen)
    }

    pub fn room_of(&self, session: SessionId) -> Option<RoomCode> {
        self.memberships.get(&session).map(|code| code.value().clone())
    }

    /// Runs `f` against `session`'s room while holding a read guard on it.
    pub fn with_room_of<R>(&self, session: SessionId, f: impl FnOnce(&Room) -> R) -> Option<R> {
        let code = self.room_of(session)?;
        let room = self.rooms.get(&code)?;
        Some(f(&room))
    }

    /// Runs `f` against the room `code` while holding a read guard on it.
    pub fn with_room<R>(&self, code: &RoomCode, f: impl FnOnce(&Room) -> R) -> Option<R> {
        self.rooms.get(code).map(|room| f(&room))
    }

    pub fn contains_room(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn lock_mutations(&self) -> MutexGuard<'_, ()> {
        // The guarded unit carries no state, so a poisoned lock is still usable.
        self.mutations.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(16)
    }
}

fn not_found(code: &RoomCode) -> RegistryError {
    RegistryError::RoomNotFound { code: code.clone() }
}

fn full(room: &Room) -> RegistryError {
    RegistryError::RoomFull {
        code: room.code().clone(),
        capacity: room.capacity(),
    }
}
