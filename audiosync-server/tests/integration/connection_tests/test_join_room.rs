use audiosync_core::{ClientMessage, RoomCode, ServerMessage, SessionId};

use crate::integration::{init_tracing, join, open_room};
use crate::utils::{create_test_coordinator, last_roster};

#[test]
fn test_join_updates_every_member() {
    init_tracing();

    let (coordinator, output) = create_test_coordinator();
    let (admin, code) = open_room(&coordinator, &output);

    let guest = join(&coordinator, &code, "Bo");

    assert_eq!(
        output.messages_for(&guest)[0],
        ServerMessage::Joined {
            id: guest,
            room_code: code.clone(),
            is_admin: false,
        }
    );
    for member in [admin, guest] {
        let roster = last_roster(&output.messages_for(&member));
        let ids: Vec<_> = roster.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![admin, guest]);
    }
}

#[test]
fn test_unknown_code_is_reported() {
    init_tracing();

    let (coordinator, output) = create_test_coordinator();
    let (admin, code) = open_room(&coordinator, &output);
    output.clear();

    let stray = join(&coordinator, &RoomCode::parse("NOPE00").unwrap(), "stray");

    assert_eq!(
        output.messages_for(&stray),
        vec![ServerMessage::Error {
            message: "Room not found".into()
        }]
    );
    assert!(output.messages_for(&admin).is_empty());
    assert_eq!(coordinator.registry().room_count(), 1);
    assert_eq!(coordinator.registry().room_of(stray), None);
    assert_eq!(coordinator.registry().room_of(admin), Some(code));
}

#[test]
fn test_eighth_member_is_turned_away() {
    init_tracing();

    let (coordinator, output) = create_test_coordinator();
    let (admin, code) = open_room(&coordinator, &output);
    let guests: Vec<SessionId> = (0..6)
        .map(|i| join(&coordinator, &code, &format!("guest{i}")))
        .collect();
    output.clear();

    let late = join(&coordinator, &code, "late");

    assert_eq!(
        output.messages_for(&late),
        vec![ServerMessage::Error {
            message: "Room is full (Max 7)".into()
        }]
    );
    assert_eq!(output.len(), 1, "nobody else hears about a refused join");
    let roster = coordinator
        .registry()
        .with_room(&code, |room| room.roster())
        .unwrap();
    assert_eq!(roster.len(), 7);
    assert_eq!(roster[0].id, admin);
    assert_eq!(roster[6].id, guests[5]);
}

#[test]
fn test_join_with_malformed_code_is_protocol_error() {
    init_tracing();

    let (coordinator, output) = create_test_coordinator();
    let session = SessionId::new();

    let result = coordinator.handle_text(
        session,
        r#"{"type":"join","name":"x","roomCode":"abc12"}"#,
    );

    assert!(result.is_err());
    assert_eq!(output.len(), 0);
}

#[test]
fn test_switching_rooms_updates_both() {
    init_tracing();

    let (coordinator, output) = create_test_coordinator();
    let (admin_a, room_a) = open_room(&coordinator, &output);
    let (admin_b, room_b) = open_room(&coordinator, &output);
    let mover = join(&coordinator, &room_a, "mover");

    coordinator.handle(
        mover,
        ClientMessage::Join {
            name: "mover".into(),
            room_code: room_b.clone(),
        },
    );

    let a_roster = last_roster(&output.messages_for(&admin_a));
    assert_eq!(a_roster.iter().map(|p| p.id).collect::<Vec<_>>(), vec![admin_a]);
    let b_roster = last_roster(&output.messages_for(&admin_b));
    assert_eq!(
        b_roster.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![admin_b, mover]
    );
    assert_eq!(coordinator.registry().room_of(mover), Some(room_b));
}
