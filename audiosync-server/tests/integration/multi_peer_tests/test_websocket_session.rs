use audiosync_core::{ClientMessage, RoomCode, ServerMessage, SessionDescription};
use audiosync_server::ServerConfig;

use crate::integration::init_tracing;
use crate::utils::{TestClient, broadcaster_of, spawn_test_server};

#[tokio::test]
async fn test_two_clients_negotiate_over_websocket() -> anyhow::Result<()> {
    init_tracing();

    let addr = spawn_test_server(ServerConfig::default()).await;
    let mut admin = TestClient::connect(addr).await?;
    let mut guest = TestClient::connect(addr).await?;

    admin
        .send(&ClientMessage::Create {
            name: "admin".into(),
        })
        .await?;
    let ServerMessage::Joined {
        id: admin_id,
        room_code,
        is_admin,
    } = admin.recv().await?
    else {
        anyhow::bail!("expected joined");
    };
    assert!(is_admin);
    admin
        .recv_until(|m| matches!(m, ServerMessage::RoomUpdate { .. }))
        .await?;

    guest
        .send(&ClientMessage::Join {
            name: "guest".into(),
            room_code: room_code.clone(),
        })
        .await?;
    let ServerMessage::Joined {
        id: guest_id,
        is_admin,
        ..
    } = guest.recv().await?
    else {
        anyhow::bail!("expected joined");
    };
    assert!(!is_admin);

    let ServerMessage::RoomUpdate { peers } = admin
        .recv_until(|m| matches!(m, ServerMessage::RoomUpdate { .. }))
        .await?
    else {
        unreachable!();
    };
    assert_eq!(peers.len(), 2);

    admin
        .send(&ClientMessage::SetBroadcaster {
            target_id: Some(admin_id),
        })
        .await?;
    admin
        .recv_until(|m| *m == ServerMessage::YouAreBroadcaster)
        .await?;
    let ServerMessage::RoomUpdate { peers } = guest
        .recv_until(|m| {
            matches!(m, ServerMessage::RoomUpdate { peers } if broadcaster_of(peers).is_some())
        })
        .await?
    else {
        unreachable!();
    };
    assert_eq!(broadcaster_of(&peers), Some(admin_id));
    guest
        .recv_until(|m| matches!(m, ServerMessage::BroadcasterChanged { .. }))
        .await?;

    admin
        .send(&ClientMessage::Offer {
            target_id: guest_id,
            sdp: SessionDescription::offer("v=0\r\n"),
        })
        .await?;
    let offer = guest.recv().await?;
    assert_eq!(
        offer,
        ServerMessage::Offer {
            sender_id: admin_id,
            sdp: SessionDescription::offer("v=0\r\n"),
        }
    );

    guest.close().await?;
    let ServerMessage::RoomUpdate { peers } = admin
        .recv_until(|m| matches!(m, ServerMessage::RoomUpdate { .. }))
        .await?
    else {
        unreachable!();
    };
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].id, admin_id);

    Ok(())
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() -> anyhow::Result<()> {
    init_tracing();

    let addr = spawn_test_server(ServerConfig::default()).await;
    let mut client = TestClient::connect(addr).await?;

    client.send_raw("{\"type\":\"dance\"}").await?;
    assert!(client.is_silent().await);

    client
        .send(&ClientMessage::Join {
            name: "x".into(),
            room_code: RoomCode::parse("000000")?,
        })
        .await?;
    assert_eq!(
        client.recv().await?,
        ServerMessage::Error {
            message: "Room not found".into()
        }
    );

    Ok(())
}
