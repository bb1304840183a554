use async_trait::async_trait;
use audiosync_client::{LinkError, LinkEventSender, LinkFactory, LocalTrack, MediaLink};
use audiosync_core::{IceCandidate, SessionDescription, SessionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::journal::{Entry, Journal, LinkCall};

/// Description every mock link produces; carries a stereo opus rtpmap so
/// tuning is observable.
pub const MOCK_SDP: &str = "v=0\r\nm=audio 9 UDP/TLS/RTP/SAVPF 111\r\na=rtpmap:111 opus/48000/2\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Create,
    CreateOffer,
    CreateAnswer,
    SetLocal,
    SetRemote,
    AddCandidate,
    /// `create_offer` never completes.
    StallOffer,
}

/// LinkFactory whose links only record what was asked of them.
#[derive(Default)]
pub struct MockLinkFactory {
    journal: Journal,
    failures: Mutex<HashMap<SessionId, FailPoint>>,
    senders: Mutex<HashMap<SessionId, LinkEventSender>>,
}

impl MockLinkFactory {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    /// Makes the next link created toward `remote` fail at `point`.
    pub fn fail_next(&self, remote: SessionId, point: FailPoint) {
        self.failures.lock().unwrap().insert(remote, point);
    }

    /// Event sender of the latest link created toward `remote`.
    pub fn events_for(&self, remote: SessionId) -> Option<LinkEventSender> {
        self.senders.lock().unwrap().get(&remote).cloned()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }
}

#[async_trait]
impl LinkFactory for MockLinkFactory {
    async fn create(
        &self,
        remote: SessionId,
        events: LinkEventSender,
    ) -> Result<Arc<dyn MediaLink>, LinkError> {
        let serial = events.serial();
        self.journal
            .push(Entry::Link(remote, serial, LinkCall::Created));

        let fail = self.failures.lock().unwrap().remove(&remote);
        if fail == Some(FailPoint::Create) {
            return Err(LinkError::Negotiation("scripted create failure".into()));
        }

        self.senders.lock().unwrap().insert(remote, events);
        Ok(Arc::new(MockLink {
            remote,
            serial,
            journal: self.journal.clone(),
            fail,
        }))
    }
}

pub struct MockLink {
    remote: SessionId,
    serial: u64,
    journal: Journal,
    fail: Option<FailPoint>,
}

impl MockLink {
    fn record(&self, call: LinkCall, point: Option<FailPoint>) -> Result<(), LinkError> {
        self.journal
            .push(Entry::Link(self.remote, self.serial, call));
        if point.is_some() && point == self.fail {
            return Err(LinkError::Negotiation(format!("scripted {:?} failure", point)));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaLink for MockLink {
    async fn add_tracks(&self, tracks: &[LocalTrack]) -> Result<(), LinkError> {
        self.record(LinkCall::AddTracks(tracks.len()), None)
    }

    async fn create_offer(&self) -> Result<SessionDescription, LinkError> {
        self.record(LinkCall::CreateOffer, Some(FailPoint::CreateOffer))?;
        if self.fail == Some(FailPoint::StallOffer) {
            std::future::pending::<()>().await;
        }
        Ok(SessionDescription::offer(MOCK_SDP))
    }

    async fn create_answer(&self) -> Result<SessionDescription, LinkError> {
        self.record(LinkCall::CreateAnswer, Some(FailPoint::CreateAnswer))?;
        Ok(SessionDescription::answer(MOCK_SDP))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), LinkError> {
        self.record(LinkCall::SetLocal(desc), Some(FailPoint::SetLocal))
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), LinkError> {
        self.record(LinkCall::SetRemote(desc), Some(FailPoint::SetRemote))
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), LinkError> {
        self.record(LinkCall::AddCandidate(candidate), Some(FailPoint::AddCandidate))
    }

    async fn close(&self) -> Result<(), LinkError> {
        self.record(LinkCall::Close, None)
    }
}
