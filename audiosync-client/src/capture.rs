use crate::error::CaptureError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use webrtc::track::track_local::TrackLocal;

pub type LocalTrack = Arc<dyn TrackLocal + Send + Sync>;

/// Local audio to be sent to listeners, plus a signal that fires when the
/// source stops on its own.
pub struct CaptureStream {
    tracks: Vec<LocalTrack>,
    ended: watch::Receiver<bool>,
}

/// Held by whoever produces the capture; ends the stream when stopped or dropped.
pub struct CaptureHandle {
    ended: watch::Sender<bool>,
}

impl CaptureStream {
    pub fn new(tracks: Vec<LocalTrack>) -> (Self, CaptureHandle) {
        let (tx, rx) = watch::channel(false);
        (Self { tracks, ended: rx }, CaptureHandle { ended: tx })
    }

    pub fn tracks(&self) -> &[LocalTrack] {
        &self.tracks
    }

    /// Receiver that observes the end of this stream.
    pub fn end_signal(&self) -> watch::Receiver<bool> {
        self.ended.clone()
    }
}

impl CaptureHandle {
    pub fn stop(&self) {
        let _ = self.ended.send(true);
    }
}

/// Resolves once `signal` reports the stream ended (or its handle is gone).
/// Pending forever for `None`.
pub async fn capture_ended(signal: &mut Option<watch::Receiver<bool>>) {
    match signal {
        Some(rx) => {
            let _ = rx.wait_for(|ended| *ended).await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Produces the local capture stream on request.
#[async_trait]
pub trait CaptureSource: Send + Sync {
    async fn acquire(&self) -> Result<CaptureStream, CaptureError>;
}

/// Listener-only participant: capture is never available.
pub struct NoCapture;

#[async_trait]
impl CaptureSource for NoCapture {
    async fn acquire(&self) -> Result<CaptureStream, CaptureError> {
        Err(CaptureError::Unavailable("this participant has no audio input".into()))
    }
}
