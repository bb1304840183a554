pub mod mock_capture;
pub mod mock_link;

pub use journal::*;
pub use mock_capture::*;
pub use mock_link::*;
pub use mock_signal_sink::*;

use audiosync_core::{RosterEntry, SessionId};

/// Roster in the given order; `broadcaster` gets the flag, the first entry is admin.
pub fn roster(ids: &[SessionId], broadcaster: Option<SessionId>) -> Vec<RosterEntry> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| RosterEntry {
            id: *id,
            name: format!("member{i}"),
            is_admin: i == 0,
            is_broadcaster: Some(*id) == broadcaster,
        })
        .collect()
}
