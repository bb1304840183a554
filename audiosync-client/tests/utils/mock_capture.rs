use async_trait::async_trait;
use audiosync_client::{CaptureError, CaptureHandle, CaptureSource, CaptureStream};
use std::sync::Mutex;

/// Capture source producing track-less streams whose end the test controls.
#[derive(Default)]
pub struct MockCapture {
    handles: Mutex<Vec<CaptureHandle>>,
    unavailable: bool,
}

impl MockCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Stream plus its handle, for driving the orchestrator directly.
    pub fn stream() -> (CaptureStream, CaptureHandle) {
        CaptureStream::new(Vec::new())
    }

    /// Ends the most recently acquired stream, as if the user stopped sharing.
    pub fn end_latest(&self) {
        if let Some(handle) = self.handles.lock().unwrap().last() {
            handle.stop();
        }
    }
}

#[async_trait]
impl CaptureSource for MockCapture {
    async fn acquire(&self) -> Result<CaptureStream, CaptureError> {
        if self.unavailable {
            return Err(CaptureError::Unavailable("permission denied".into()));
        }
        let (stream, handle) = CaptureStream::new(Vec::new());
        self.handles.lock().unwrap().push(handle);
        Ok(stream)
    }
}
