use crate::capture::LocalTrack;
use crate::link::{LinkOp, LinkSerial, LinkTask};
use audiosync_core::{IceCandidate, SessionDescription, SessionId};
use std::collections::VecDeque;
use std::fmt;
use tokio::task::JoinHandle;

/// Negotiation state of one link.
///
/// Offering side: `Idle -> OfferSent -> Connected -> Closed`.
/// Answering side: `Idle -> OfferReceived -> Connected -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    OfferSent,
    OfferReceived,
    Connected,
    Closed,
}

/// Which side of the negotiation this participant plays on a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    /// Local broadcaster sending audio to a listener.
    Offering,
    /// Local listener receiving audio from the broadcaster.
    Answering,
}

/// State machine for one remote participant. The media link itself lives on
/// a separate task; this side only tracks what has been asked of it and what
/// it reported back. Discarded after teardown; reconnecting creates a fresh one.
pub struct PeerLink {
    remote: SessionId,
    serial: LinkSerial,
    role: LinkRole,
    state: LinkState,
    remote_description_pending: bool,
    remote_description_set: bool,
    pending_candidates: VecDeque<IceCandidate>,
    task: LinkTask,
}

impl PeerLink {
    pub(crate) fn new(remote: SessionId, serial: LinkSerial, role: LinkRole, task: LinkTask) -> Self {
        Self {
            remote,
            serial,
            role,
            state: LinkState::Idle,
            remote_description_pending: false,
            remote_description_set: false,
            pending_candidates: VecDeque::new(),
            task,
        }
    }

    pub fn remote(&self) -> SessionId {
        self.remote
    }

    pub fn serial(&self) -> LinkSerial {
        self.serial
    }

    pub fn role(&self) -> LinkRole {
        self.role
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    pub fn remote_description_set(&self) -> bool {
        self.remote_description_set
    }

    /// True once a remote offer or answer has been handed to the link,
    /// whether or not it has been applied yet.
    pub fn has_remote_description(&self) -> bool {
        self.remote_description_pending || self.remote_description_set
    }

    pub(crate) fn transition(&mut self, next: LinkState) {
        debug_assert!(
            self.state != LinkState::Closed,
            "closed links are never reused"
        );
        self.state = next;
    }

    pub(crate) fn request_offer(&mut self, tracks: Vec<LocalTrack>) {
        self.task.submit(LinkOp::Offer { tracks });
    }

    pub(crate) fn request_answer(&mut self, offer: SessionDescription) {
        self.remote_description_pending = true;
        self.task.submit(LinkOp::Answer { offer });
    }

    pub(crate) fn accept_answer(&mut self, answer: SessionDescription) {
        self.remote_description_pending = true;
        self.task.submit(LinkOp::AcceptAnswer { answer });
    }

    /// Marks the remote description applied and hands queued candidates to
    /// the link in arrival order.
    pub(crate) fn remote_description_applied(&mut self) {
        self.remote_description_pending = false;
        self.remote_description_set = true;
        while let Some(candidate) = self.pending_candidates.pop_front() {
            self.task.submit(LinkOp::AddCandidate(candidate));
        }
    }

    /// Applies `candidate` now, or queues it until the remote description is in.
    pub(crate) fn add_candidate(&mut self, candidate: IceCandidate) {
        if self.remote_description_set {
            self.task.submit(LinkOp::AddCandidate(candidate));
        } else {
            self.pending_candidates.push_back(candidate);
        }
    }

    /// Stops the link. The handle completes once the connection is released.
    pub(crate) fn close(self) -> JoinHandle<()> {
        self.task.stop()
    }
}

impl fmt::Debug for PeerLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerLink")
            .field("remote", &self.remote)
            .field("serial", &self.serial)
            .field("role", &self.role)
            .field("state", &self.state)
            .field("pending_candidates", &self.pending_candidates.len())
            .finish()
    }
}
