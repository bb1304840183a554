use audiosync_core::{ServerMessage, SessionId};
use audiosync_server::SignalingOutput;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Mock SignalingOutput that captures all outgoing messages.
#[derive(Clone, Default)]
pub struct MockSignalingOutput {
    /// All captured messages in send order.
    sent: Arc<Mutex<Vec<(SessionId, ServerMessage)>>>,
    /// Sessions whose connection is considered gone.
    gone: Arc<Mutex<HashSet<SessionId>>>,
}

impl MockSignalingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered to `id`, in order.
    pub fn messages_for(&self, id: &SessionId) -> Vec<ServerMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to == id)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub fn all(&self) -> Vec<(SessionId, ServerMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    /// Makes later sends to `id` fail, as if its socket closed mid-broadcast.
    pub fn drop_connection(&self, id: SessionId) {
        self.gone.lock().unwrap().insert(id);
    }
}

impl SignalingOutput for MockSignalingOutput {
    fn send(&self, session: SessionId, msg: &ServerMessage) -> bool {
        tracing::debug!("[MockSignaling] send to {}: {:?}", session, msg);

        if self.gone.lock().unwrap().contains(&session) {
            return false;
        }
        self.sent.lock().unwrap().push((session, msg.clone()));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_signaling_captures_messages() {
        let signaling = MockSignalingOutput::new();
        let id = SessionId::new();

        assert!(signaling.send(id, &ServerMessage::YouAreBroadcaster));

        assert_eq!(
            signaling.messages_for(&id),
            vec![ServerMessage::YouAreBroadcaster]
        );
        assert!(signaling.messages_for(&SessionId::new()).is_empty());
    }

    #[test]
    fn test_mock_signaling_drops_for_gone_session() {
        let signaling = MockSignalingOutput::new();
        let id = SessionId::new();
        signaling.drop_connection(id);

        assert!(!signaling.send(id, &ServerMessage::YouAreBroadcaster));
        assert_eq!(signaling.len(), 0);
    }
}
