use audiosync_core::ClientMessage;
use tokio::sync::mpsc;

/// Outbound path from the orchestrator to the coordinator.
pub trait SignalSink: Send + Sync {
    fn send(&self, msg: ClientMessage);
}

impl SignalSink for mpsc::UnboundedSender<ClientMessage> {
    fn send(&self, msg: ClientMessage) {
        if mpsc::UnboundedSender::send(self, msg).is_err() {
            tracing::debug!("Signaling channel closed; dropping outbound message");
        }
    }
}
