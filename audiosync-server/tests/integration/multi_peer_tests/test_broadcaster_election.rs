use audiosync_core::{ClientMessage, ServerMessage, SessionId};

use crate::integration::{init_tracing, join, open_room};
use crate::utils::{broadcaster_of, create_test_coordinator, last_roster};

#[test]
fn test_admin_assigns_broadcaster() {
    init_tracing();

    let (coordinator, output) = create_test_coordinator();
    let (admin, code) = open_room(&coordinator, &output);
    let b = join(&coordinator, &code, "b");
    let c = join(&coordinator, &code, "c");
    output.clear();

    coordinator.handle(admin, ClientMessage::SetBroadcaster { target_id: Some(b) });

    let b_msgs = output.messages_for(&b);
    assert_eq!(broadcaster_of(&last_roster(&b_msgs)), Some(b));
    assert_eq!(b_msgs.last(), Some(&ServerMessage::YouAreBroadcaster));
    for other in [admin, c] {
        let msgs = output.messages_for(&other);
        assert!(matches!(msgs[0], ServerMessage::RoomUpdate { .. }));
        assert_eq!(
            msgs.last(),
            Some(&ServerMessage::BroadcasterChanged {
                broadcaster_id: Some(b)
            })
        );
        assert!(!msgs.contains(&ServerMessage::YouAreBroadcaster));
    }
}

#[test]
fn test_reassign_moves_role() {
    init_tracing();

    let (coordinator, output) = create_test_coordinator();
    let (admin, code) = open_room(&coordinator, &output);
    let b = join(&coordinator, &code, "b");
    let c = join(&coordinator, &code, "c");

    coordinator.handle(admin, ClientMessage::SetBroadcaster { target_id: Some(b) });
    output.clear();
    coordinator.handle(admin, ClientMessage::SetBroadcaster { target_id: Some(c) });

    let roster = last_roster(&output.messages_for(&admin));
    assert_eq!(roster.iter().filter(|p| p.is_broadcaster).count(), 1);
    assert_eq!(broadcaster_of(&roster), Some(c));
    assert_eq!(
        output.messages_for(&b).last(),
        Some(&ServerMessage::BroadcasterChanged {
            broadcaster_id: Some(c)
        })
    );
    assert_eq!(
        output.messages_for(&c).last(),
        Some(&ServerMessage::YouAreBroadcaster)
    );
}

#[test]
fn test_admin_clears_broadcaster() {
    init_tracing();

    let (coordinator, output) = create_test_coordinator();
    let (admin, code) = open_room(&coordinator, &output);
    let b = join(&coordinator, &code, "b");
    coordinator.handle(admin, ClientMessage::SetBroadcaster { target_id: Some(b) });
    output.clear();

    coordinator.handle(admin, ClientMessage::SetBroadcaster { target_id: None });

    for member in [admin, b] {
        let msgs = output.messages_for(&member);
        assert_eq!(broadcaster_of(&last_roster(&msgs)), None);
        assert_eq!(
            msgs.last(),
            Some(&ServerMessage::BroadcasterChanged {
                broadcaster_id: None
            })
        );
    }
}

#[test]
fn test_non_admin_request_is_ignored() {
    init_tracing();

    let (coordinator, output) = create_test_coordinator();
    let (_admin, code) = open_room(&coordinator, &output);
    let b = join(&coordinator, &code, "b");
    output.clear();

    coordinator.handle(b, ClientMessage::SetBroadcaster { target_id: Some(b) });
    coordinator.handle(
        SessionId::new(),
        ClientMessage::SetBroadcaster { target_id: Some(b) },
    );

    assert_eq!(output.len(), 0);
    let roster = coordinator
        .registry()
        .with_room(&code, |room| room.roster())
        .unwrap();
    assert_eq!(broadcaster_of(&roster), None);
}

#[test]
fn test_admin_may_broadcast_itself() {
    init_tracing();

    let (coordinator, output) = create_test_coordinator();
    let (admin, code) = open_room(&coordinator, &output);
    let b = join(&coordinator, &code, "b");
    output.clear();

    coordinator.handle(
        admin,
        ClientMessage::SetBroadcaster {
            target_id: Some(admin),
        },
    );

    assert_eq!(
        output.messages_for(&admin).last(),
        Some(&ServerMessage::YouAreBroadcaster)
    );
    assert_eq!(
        output.messages_for(&b).last(),
        Some(&ServerMessage::BroadcasterChanged {
            broadcaster_id: Some(admin)
        })
    );
}

#[test]
fn test_broadcaster_departure_clears_flag_in_roster() {
    init_tracing();

    let (coordinator, output) = create_test_coordinator();
    let (admin, code) = open_room(&coordinator, &output);
    let b = join(&coordinator, &code, "b");
    coordinator.handle(admin, ClientMessage::SetBroadcaster { target_id: Some(b) });
    output.clear();

    coordinator.disconnect(b);

    let roster = last_roster(&output.messages_for(&admin));
    assert_eq!(roster.len(), 1);
    assert_eq!(broadcaster_of(&roster), None);
}
