use audiosync_core::{IceCandidate, SessionDescription, SessionId};
use tokio::sync::mpsc;

/// Distinguishes successive links to the same remote, so events from a
/// discarded link never touch its replacement.
pub type LinkSerial = u64;

/// Something one link reports back to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkEvent {
    pub remote: SessionId,
    pub serial: LinkSerial,
    pub kind: LinkEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LinkEventKind {
    /// A local ICE candidate to forward to the remote.
    CandidateGenerated(IceCandidate),
    /// The tuned offer has been applied locally and can be sent.
    OfferReady(SessionDescription),
    /// The tuned answer has been applied locally and can be sent.
    AnswerReady(SessionDescription),
    /// The remote offer or answer has been applied.
    RemoteDescriptionApplied,
    /// Creating the link or one negotiation step failed.
    NegotiationFailed(String),
    /// The connection reached a terminal state.
    Failed,
}

/// Event channel handed to one link at creation.
#[derive(Debug, Clone)]
pub struct LinkEventSender {
    remote: SessionId,
    serial: LinkSerial,
    tx: mpsc::UnboundedSender<LinkEvent>,
}

impl LinkEventSender {
    pub fn new(remote: SessionId, serial: LinkSerial, tx: mpsc::UnboundedSender<LinkEvent>) -> Self {
        Self { remote, serial, tx }
    }

    pub fn remote(&self) -> SessionId {
        self.remote
    }

    pub fn serial(&self) -> LinkSerial {
        self.serial
    }

    pub fn candidate(&self, candidate: IceCandidate) {
        self.emit(LinkEventKind::CandidateGenerated(candidate));
    }

    pub fn failed(&self) {
        self.emit(LinkEventKind::Failed);
    }

    pub(crate) fn offer_ready(&self, offer: SessionDescription) {
        self.emit(LinkEventKind::OfferReady(offer));
    }

    pub(crate) fn answer_ready(&self, answer: SessionDescription) {
        self.emit(LinkEventKind::AnswerReady(answer));
    }

    pub(crate) fn remote_applied(&self) {
        self.emit(LinkEventKind::RemoteDescriptionApplied);
    }

    pub(crate) fn negotiation_failed(&self, reason: impl Into<String>) {
        self.emit(LinkEventKind::NegotiationFailed(reason.into()));
    }

    fn emit(&self, kind: LinkEventKind) {
        // The loop may already be gone during shutdown.
        let _ = self.tx.send(LinkEvent {
            remote: self.remote,
            serial: self.serial,
            kind,
        });
    }
}
