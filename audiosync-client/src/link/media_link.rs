use crate::capture::LocalTrack;
use crate::error::LinkError;
use crate::link::LinkEventSender;
use async_trait::async_trait;
use audiosync_core::{IceCandidate, SessionDescription, SessionId};
use std::sync::Arc;

/// Connection handle for one media relay session with one remote participant.
#[async_trait]
pub trait MediaLink: Send + Sync {
    async fn add_tracks(&self, tracks: &[LocalTrack]) -> Result<(), LinkError>;

    async fn create_offer(&self) -> Result<SessionDescription, LinkError>;

    async fn create_answer(&self) -> Result<SessionDescription, LinkError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), LinkError>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), LinkError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), LinkError>;

    async fn close(&self) -> Result<(), LinkError>;
}

#[async_trait]
pub trait LinkFactory: Send + Sync {
    /// Opens a fresh link to `remote`. Locally gathered candidates and
    /// terminal failures are reported through `events`.
    async fn create(
        &self,
        remote: SessionId,
        events: LinkEventSender,
    ) -> Result<Arc<dyn MediaLink>, LinkError>;
}
