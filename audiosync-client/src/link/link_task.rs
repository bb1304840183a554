use crate::capture::LocalTrack;
use crate::error::LinkError;
use crate::link::{LinkEventSender, LinkFactory, MediaLink};
use audiosync_core::sdp::tune_opus;
use audiosync_core::{IceCandidate, SessionDescription};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One negotiation step, run on the link's own task.
pub(crate) enum LinkOp {
    /// Bind tracks, create and tune an offer, apply it locally.
    Offer { tracks: Vec<LocalTrack> },
    /// Apply a remote offer, then create and tune an answer.
    Answer { offer: SessionDescription },
    /// Apply the remote answer to a link that offered.
    AcceptAnswer { answer: SessionDescription },
    AddCandidate(IceCandidate),
}

/// Handle to the task owning one media link. Steps run in submission order;
/// dropping the handle stops the task and closes the link.
pub(crate) struct LinkTask {
    ops: mpsc::UnboundedSender<LinkOp>,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl LinkTask {
    /// Spawns the task. The link itself is created on the task, so a slow
    /// factory never holds up the caller.
    pub(crate) fn spawn(factory: Arc<dyn LinkFactory>, events: LinkEventSender) -> Self {
        let (ops, ops_rx) = mpsc::unbounded_channel();
        let (stop, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(run(factory, events, ops_rx, stop_rx));
        Self {
            ops,
            stop: Some(stop),
            handle,
        }
    }

    pub(crate) fn submit(&self, op: LinkOp) {
        if self.ops.send(op).is_err() {
            debug!("Link task already stopped, dropping step");
        }
    }

    /// Stops the task; the returned handle completes once the link is closed.
    pub(crate) fn stop(mut self) -> JoinHandle<()> {
        self.stop.take();
        self.handle
    }
}

async fn run(
    factory: Arc<dyn LinkFactory>,
    events: LinkEventSender,
    mut ops: mpsc::UnboundedReceiver<LinkOp>,
    mut stop: oneshot::Receiver<()>,
) {
    let remote = events.remote();

    let media = tokio::select! {
        _ = &mut stop => return,
        created = factory.create(remote, events.clone()) => match created {
            Ok(media) => media,
            Err(e) => {
                warn!("Could not create link to {}: {}", remote, e);
                events.negotiation_failed(e.to_string());
                return;
            }
        },
    };

    loop {
        let op = tokio::select! {
            _ = &mut stop => break,
            op = ops.recv() => match op {
                Some(op) => op,
                None => break,
            },
        };

        let step = tokio::select! {
            _ = &mut stop => break,
            step = apply(media.as_ref(), op, &events) => step,
        };
        if let Err(e) = step {
            warn!("Negotiation with {} failed: {}", remote, e);
            events.negotiation_failed(e.to_string());
        }
    }

    if let Err(e) = media.close().await {
        warn!("Failed to close link to {}: {}", remote, e);
    }
}

async fn apply(
    media: &dyn MediaLink,
    op: LinkOp,
    events: &LinkEventSender,
) -> Result<(), LinkError> {
    match op {
        LinkOp::Offer { tracks } => {
            media.add_tracks(&tracks).await?;
            let offer = media.create_offer().await?;
            let offer = SessionDescription::offer(tune_opus(&offer.sdp));
            media.set_local_description(offer.clone()).await?;
            events.offer_ready(offer);
        }
        LinkOp::Answer { offer } => {
            media.set_remote_description(offer).await?;
            events.remote_applied();

            let answer = media.create_answer().await?;
            let answer = SessionDescription::answer(tune_opus(&answer.sdp));
            media.set_local_description(answer.clone()).await?;
            events.answer_ready(answer);
        }
        LinkOp::AcceptAnswer { answer } => {
            media.set_remote_description(answer).await?;
            events.remote_applied();
        }
        LinkOp::AddCandidate(candidate) => {
            // A bad candidate does not invalidate the link.
            if let Err(e) = media.add_ice_candidate(candidate).await {
                warn!("Candidate from {} rejected: {}", events.remote(), e);
            }
        }
    }
    Ok(())
}
