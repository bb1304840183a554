use crate::capture::CaptureStream;
use crate::error::CaptureError;
use crate::link::{LinkEvent, LinkEventKind, LinkEventSender, LinkFactory, LinkSerial, LinkTask};
use crate::orchestrator::peer_link::{LinkRole, LinkState, PeerLink};
use crate::orchestrator::signal_sink::SignalSink;
use audiosync_core::{ClientMessage, IceCandidate, RosterEntry, SessionDescription, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Drives one PeerLink per relevant remote participant from roster
/// snapshots, role notifications and relayed signaling.
///
/// Handlers never wait on a media link. A link is registered the moment it
/// is needed and its negotiation runs on its own task, which reports back
/// through [`LinkEvent`]s; state transitions and outbound signaling happen
/// when those results are handled. A stalled link therefore only stalls
/// itself.
pub struct ConnectionOrchestrator {
    local_id: Option<SessionId>,
    is_broadcaster: bool,
    roster: Vec<RosterEntry>,
    links: HashMap<SessionId, PeerLink>,
    capture: Option<CaptureStream>,
    factory: Arc<dyn LinkFactory>,
    signals: Arc<dyn SignalSink>,
    link_events: mpsc::UnboundedSender<LinkEvent>,
    next_serial: LinkSerial,
}

impl ConnectionOrchestrator {
    /// Returns the orchestrator and the receiver its links report into.
    pub fn new(
        factory: Arc<dyn LinkFactory>,
        signals: Arc<dyn SignalSink>,
    ) -> (Self, mpsc::UnboundedReceiver<LinkEvent>) {
        let (link_events, rx) = mpsc::unbounded_channel();
        let orchestrator = Self {
            local_id: None,
            is_broadcaster: false,
            roster: Vec::new(),
            links: HashMap::new(),
            capture: None,
            factory,
            signals,
            link_events,
            next_serial: 0,
        };
        (orchestrator, rx)
    }

    pub fn local_id(&self) -> Option<SessionId> {
        self.local_id
    }

    pub fn is_broadcaster(&self) -> bool {
        self.is_broadcaster
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn link(&self, remote: &SessionId) -> Option<&PeerLink> {
        self.links.get(remote)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn on_joined(&mut self, id: SessionId) {
        self.discard_all();
        self.local_id = Some(id);
        self.is_broadcaster = false;
        self.roster.clear();
        info!("Joined as {}", id);
    }

    pub fn on_roster(&mut self, peers: Vec<RosterEntry>) {
        self.roster = peers;

        let stale: Vec<SessionId> = self
            .links
            .values()
            .filter(|link| {
                match self.roster.iter().find(|p| p.id == link.remote()) {
                    None => true,
                    // Answering links only exist toward the current broadcaster.
                    Some(entry) => link.role() == LinkRole::Answering && !entry.is_broadcaster,
                }
            })
            .map(PeerLink::remote)
            .collect();

        for remote in stale {
            debug!("Roster no longer needs link to {}", remote);
            self.teardown(remote);
        }

        self.offer_to_missing();
    }

    pub fn on_became_broadcaster(&mut self) {
        info!("This session is now the broadcaster");
        self.is_broadcaster = true;
        self.teardown_role(LinkRole::Answering);
        self.offer_to_missing();
    }

    pub fn on_broadcaster_changed(&mut self, broadcaster: Option<SessionId>) {
        if self.is_broadcaster {
            info!("Broadcaster role moved to {:?}", broadcaster);
            self.is_broadcaster = false;
            self.teardown_role(LinkRole::Offering);
        }

        let stale: Vec<SessionId> = self
            .links
            .values()
            .filter(|link| link.role() == LinkRole::Answering && Some(link.remote()) != broadcaster)
            .map(PeerLink::remote)
            .collect();
        for remote in stale {
            self.teardown(remote);
        }
    }

    /// Starts answering an offer from the broadcaster. A second offer from a
    /// sender that already has a link is ignored, even while the first answer
    /// is still being produced.
    pub fn on_offer(&mut self, sender: SessionId, sdp: SessionDescription) {
        if self.is_broadcaster {
            debug!("Ignoring offer from {} while broadcasting", sender);
            return;
        }
        if self.links.contains_key(&sender) {
            debug!("Ignoring duplicate offer from {}", sender);
            return;
        }

        let link = self.open_link(sender, LinkRole::Answering);
        link.transition(LinkState::OfferReceived);
        link.request_answer(sdp);
    }

    pub fn on_answer(&mut self, sender: SessionId, sdp: SessionDescription) {
        match self.links.get_mut(&sender) {
            Some(link) if link.state() == LinkState::OfferSent && !link.has_remote_description() => {
                link.accept_answer(sdp);
            }
            Some(link) => {
                debug!("Ignoring answer from {} in state {:?}", sender, link.state());
            }
            None => {
                debug!("Ignoring answer from {} without a link", sender);
            }
        }
    }

    /// Applies a remote candidate, queueing it until the link has its remote
    /// description.
    pub fn on_candidate(&mut self, sender: SessionId, candidate: IceCandidate) {
        let Some(link) = self.links.get_mut(&sender) else {
            debug!("Dropping candidate from {} without a link", sender);
            return;
        };
        link.add_candidate(candidate);
    }

    pub fn on_link_event(&mut self, event: LinkEvent) {
        let LinkEvent {
            remote,
            serial,
            kind,
        } = event;
        let Some(link) = self.links.get_mut(&remote).filter(|l| l.serial() == serial) else {
            debug!("Dropping event from discarded link to {}", remote);
            return;
        };

        match kind {
            LinkEventKind::CandidateGenerated(candidate) => {
                self.signals.send(ClientMessage::Candidate {
                    target_id: remote,
                    candidate,
                });
            }
            LinkEventKind::OfferReady(sdp) => {
                link.transition(LinkState::OfferSent);
                info!("Sending offer to {}", remote);
                self.signals.send(ClientMessage::Offer {
                    target_id: remote,
                    sdp,
                });
            }
            LinkEventKind::RemoteDescriptionApplied => {
                link.remote_description_applied();
                if link.role() == LinkRole::Offering {
                    link.transition(LinkState::Connected);
                    info!("Link to {} connected", remote);
                }
            }
            LinkEventKind::AnswerReady(sdp) => {
                link.transition(LinkState::Connected);
                info!("Sending answer to {}", remote);
                self.signals.send(ClientMessage::Answer {
                    target_id: remote,
                    sdp,
                });
            }
            LinkEventKind::NegotiationFailed(reason) => {
                warn!("Negotiation with {} failed: {}", remote, reason);
                self.teardown(remote);
            }
            LinkEventKind::Failed => {
                warn!("Link to {} failed", remote);
                self.teardown(remote);
            }
        }
    }

    /// Holds `capture` and, when broadcasting, offers it to every rostered remote.
    pub fn start_broadcast(&mut self, capture: CaptureStream) -> Result<(), CaptureError> {
        if self.capture.is_some() {
            return Err(CaptureError::AlreadyActive);
        }
        info!("Capture started with {} track(s)", capture.tracks().len());
        self.capture = Some(capture);
        self.offer_to_missing();
        Ok(())
    }

    /// Releases capture and every link, then gives up the broadcaster role.
    pub fn stop_broadcast(&mut self) {
        self.capture = None;
        self.discard_all();

        if self.is_broadcaster {
            info!("Relinquishing broadcaster role");
            self.signals
                .send(ClientMessage::SetBroadcaster { target_id: None });
        }
    }

    /// Closes every link and waits for them to be released, then tells the
    /// coordinator this session is leaving.
    pub async fn leave(&mut self) {
        self.close_all().await;
        self.capture = None;
        self.is_broadcaster = false;
        self.roster.clear();
        self.local_id = None;
        self.signals.send(ClientMessage::Leave);
    }

    /// Closes every link and waits until each connection is released.
    pub async fn close_all(&mut self) {
        for handle in self.stop_all() {
            if let Err(e) = handle.await {
                warn!("Link task ended abnormally: {}", e);
            }
        }
    }

    /// Discards every link; connections are released in the background.
    fn discard_all(&mut self) {
        drop(self.stop_all());
    }

    fn stop_all(&mut self) -> Vec<JoinHandle<()>> {
        self.links.drain().map(|(_, link)| link.close()).collect()
    }

    fn offer_to_missing(&mut self) {
        if !self.is_broadcaster {
            return;
        }
        let Some(tracks) = self.capture.as_ref().map(|c| c.tracks().to_vec()) else {
            return;
        };

        let targets: Vec<SessionId> = self
            .roster
            .iter()
            .map(|p| p.id)
            .filter(|id| Some(*id) != self.local_id && !self.links.contains_key(id))
            .collect();

        for remote in targets {
            let link = self.open_link(remote, LinkRole::Offering);
            link.request_offer(tracks.clone());
        }
    }

    /// Registers a fresh link; the connection itself is created on its task.
    fn open_link(&mut self, remote: SessionId, role: LinkRole) -> &mut PeerLink {
        let serial = self.next_serial;
        self.next_serial += 1;

        let events = LinkEventSender::new(remote, serial, self.link_events.clone());
        let task = LinkTask::spawn(self.factory.clone(), events);
        debug!("Opening {:?} link #{} to {}", role, serial, remote);
        self.links
            .entry(remote)
            .insert_entry(PeerLink::new(remote, serial, role, task))
            .into_mut()
    }

    fn teardown(&mut self, remote: SessionId) {
        if let Some(link) = self.links.remove(&remote) {
            drop(link.close());
            info!("Closed link to {}", remote);
        }
    }

    fn teardown_role(&mut self, role: LinkRole) {
        let remotes: Vec<SessionId> = self
            .links
            .values()
            .filter(|link| link.role() == role)
            .map(PeerLink::remote)
            .collect();
        for remote in remotes {
            self.teardown(remote);
        }
    }
}
