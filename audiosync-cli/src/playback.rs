use audiosync_client::PlaybackSink;
use audiosync_core::SessionId;
use std::sync::Arc;
use tracing::info;
use webrtc::track::track_remote::TrackRemote;

const REPORT_EVERY: u64 = 500;

/// Playback stand-in for headless listeners: counts received RTP packets.
pub struct LoggingPlayback;

impl PlaybackSink for LoggingPlayback {
    fn attach(&self, remote: SessionId, track: Arc<TrackRemote>) {
        tokio::spawn(async move {
            let mut packets: u64 = 0;
            let mut bytes: u64 = 0;

            while let Ok((packet, _)) = track.read_rtp().await {
                packets += 1;
                bytes += packet.payload.len() as u64;
                if packets % REPORT_EVERY == 0 {
                    info!(
                        "Audio from {}: {} packets, {} KiB",
                        remote,
                        packets,
                        bytes / 1024
                    );
                }
            }

            info!(
                "Audio track from {} ended after {} packets",
                remote, packets
            );
        });
    }
}
