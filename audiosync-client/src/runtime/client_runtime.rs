use crate::capture::{CaptureSource, capture_ended};
use crate::link::{LinkEvent, LinkFactory};
use crate::orchestrator::ConnectionOrchestrator;
use crate::runtime::client_event::{ClientCommand, ClientEvent, JoinMode};
use anyhow::{Context, Result};
use audiosync_core::{ClientMessage, ServerMessage};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Application side of a running client.
pub struct ClientHandle {
    commands: mpsc::UnboundedSender<ClientCommand>,
    events: mpsc::UnboundedReceiver<ClientEvent>,
}

impl ClientHandle {
    /// Queues a command. Returns false once the runtime has stopped.
    pub fn send(&self, command: ClientCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        self.events.recv().await
    }
}

/// One participant connection: a WebSocket to the coordinator feeding a
/// [`ConnectionOrchestrator`] from a single event loop.
pub struct ClientRuntime {
    socket: Socket,
    orchestrator: ConnectionOrchestrator,
    link_rx: mpsc::UnboundedReceiver<LinkEvent>,
    outbound_tx: mpsc::UnboundedSender<ClientMessage>,
    outbound_rx: mpsc::UnboundedReceiver<ClientMessage>,
    commands: mpsc::UnboundedReceiver<ClientCommand>,
    events: mpsc::UnboundedSender<ClientEvent>,
    capture_source: Arc<dyn CaptureSource>,
    capture_signal: Option<watch::Receiver<bool>>,
}

impl ClientRuntime {
    /// Connects to the coordinator at `url` and queues the create or join request.
    pub async fn connect(
        url: &str,
        name: &str,
        mode: JoinMode,
        factory: Arc<dyn LinkFactory>,
        capture_source: Arc<dyn CaptureSource>,
    ) -> Result<(Self, ClientHandle)> {
        let (socket, _) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;
        info!("Connected to coordinator at {}", url);

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (orchestrator, link_rx) =
            ConnectionOrchestrator::new(factory, Arc::new(outbound_tx.clone()));
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let hello = match mode {
            JoinMode::Create => ClientMessage::Create {
                name: name.to_owned(),
            },
            JoinMode::Join(room_code) => ClientMessage::Join {
                name: name.to_owned(),
                room_code,
            },
        };
        let _ = outbound_tx.send(hello);

        let runtime = Self {
            socket,
            orchestrator,
            link_rx,
            outbound_tx,
            outbound_rx,
            commands: command_rx,
            events: event_tx,
            capture_source,
            capture_signal: None,
        };
        let handle = ClientHandle {
            commands: command_tx,
            events: event_rx,
        };
        Ok((runtime, handle))
    }

    /// Runs until the socket closes, the coordinator rejects the initial
    /// request, or the application leaves.
    pub async fn run(self) -> Result<()> {
        let Self {
            socket,
            mut orchestrator,
            mut link_rx,
            outbound_tx,
            mut outbound_rx,
            mut commands,
            events,
            capture_source,
            mut capture_signal,
        } = self;

        let (mut ws_tx, mut ws_rx) = socket.split();

        let send_task = tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to encode {:?}: {}", msg, e);
                        continue;
                    }
                };
                if ws_tx.send(Message::text(json)).await.is_err() {
                    break;
                }
            }
            let _ = ws_tx.close().await;
        });

        loop {
            tokio::select! {
                frame = ws_rx.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            let msg = match serde_json::from_str::<ServerMessage>(text.as_str()) {
                                Ok(msg) => msg,
                                Err(e) => {
                                    warn!("Malformed message from coordinator: {}", e);
                                    continue;
                                }
                            };
                            if !handle_server_message(&mut orchestrator, &events, msg) {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Coordinator closed the connection");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!("WebSocket error: {}", e);
                            break;
                        }
                    }
                }

                Some(event) = link_rx.recv() => {
                    orchestrator.on_link_event(event);
                }

                cmd = commands.recv() => {
                    match cmd {
                        Some(ClientCommand::StartBroadcast) => {
                            match capture_source.acquire().await {
                                Ok(stream) => {
                                    let signal = stream.end_signal();
                                    match orchestrator.start_broadcast(stream) {
                                        Ok(()) => capture_signal = Some(signal),
                                        Err(e) => {
                                            let _ = events.send(ClientEvent::CaptureFailed(e.to_string()));
                                        }
                                    }
                                }
                                Err(e) => {
                                    warn!("Capture failed: {}", e);
                                    let _ = events.send(ClientEvent::CaptureFailed(e.to_string()));
                                }
                            }
                        }
                        Some(ClientCommand::StopBroadcast) => {
                            capture_signal = None;
                            orchestrator.stop_broadcast();
                        }
                        Some(ClientCommand::SetBroadcaster(target_id)) => {
                            let _ = outbound_tx.send(ClientMessage::SetBroadcaster { target_id });
                        }
                        Some(ClientCommand::Leave) | None => {
                            orchestrator.leave().await;
                            break;
                        }
                    }
                }

                _ = capture_ended(&mut capture_signal) => {
                    info!("Capture source stopped");
                    capture_signal = None;
                    orchestrator.stop_broadcast();
                }
            }
        }

        orchestrator.close_all().await;
        drop(orchestrator);
        drop(outbound_tx);
        if let Err(e) = send_task.await {
            debug!("Send task ended abnormally: {}", e);
        }

        let _ = events.send(ClientEvent::Disconnected);
        Ok(())
    }
}

/// Applies one coordinator message. Returns false when the session should end.
fn handle_server_message(
    orchestrator: &mut ConnectionOrchestrator,
    events: &mpsc::UnboundedSender<ClientEvent>,
    msg: ServerMessage,
) -> bool {
    match msg {
        ServerMessage::Joined {
            id,
            room_code,
            is_admin,
        } => {
            orchestrator.on_joined(id);
            info!("In room {} (admin: {})", room_code, is_admin);
            let _ = events.send(ClientEvent::Joined {
                id,
                room_code,
                is_admin,
            });
        }

        ServerMessage::Error { message } => {
            warn!("Coordinator rejected request: {}", message);
            let joined = orchestrator.local_id().is_some();
            let _ = events.send(ClientEvent::Rejected(message));
            return joined;
        }

        ServerMessage::RoomUpdate { peers } => {
            orchestrator.on_roster(peers.clone());
            let _ = events.send(ClientEvent::Roster(peers));
        }

        ServerMessage::Offer { sender_id, sdp } => {
            orchestrator.on_offer(sender_id, sdp);
        }

        ServerMessage::Answer { sender_id, sdp } => {
            orchestrator.on_answer(sender_id, sdp);
        }

        ServerMessage::Candidate {
            sender_id,
            candidate,
        } => {
            orchestrator.on_candidate(sender_id, candidate);
        }

        ServerMessage::YouAreBroadcaster => {
            orchestrator.on_became_broadcaster();
            let _ = events.send(ClientEvent::BecameBroadcaster);
        }

        ServerMessage::BroadcasterChanged { broadcaster_id } => {
            orchestrator.on_broadcaster_changed(broadcaster_id);
            let _ = events.send(ClientEvent::BroadcasterChanged(broadcaster_id));
        }
    }
    true
}
