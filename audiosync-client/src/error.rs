use thiserror::Error;

/// Failure inside one media link. Never affects other links.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("webrtc error: {0}")]
    Rtc(#[from] webrtc::Error),
    #[error("negotiation failed: {0}")]
    Negotiation(String),
}

/// Failure acquiring or holding local capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture unavailable: {0}")]
    Unavailable(String),
    #[error("a capture stream is already active")]
    AlreadyActive,
}
