use crate::capture::LocalTrack;
use crate::error::LinkError;
use crate::link::{LinkConfig, LinkEventSender, LinkFactory, MediaLink};
use async_trait::async_trait;
use audiosync_core::{IceCandidate, SdpKind, SessionDescription, SessionId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::{API, APIBuilder};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_remote::TrackRemote;

/// Receives the inbound audio track of each established link.
pub trait PlaybackSink: Send + Sync {
    fn attach(&self, remote: SessionId, track: Arc<TrackRemote>);
}

/// Builds webrtc-rs peer connections sharing one media engine setup.
pub struct RtcLinkFactory {
    api: API,
    config: LinkConfig,
    playback: Arc<dyn PlaybackSink>,
}

impl RtcLinkFactory {
    pub fn new(config: LinkConfig, playback: Arc<dyn PlaybackSink>) -> Result<Self, LinkError> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        Ok(Self {
            api,
            config,
            playback,
        })
    }

    fn rtc_config(&self) -> RTCConfiguration {
        let ice_servers = if self.config.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: self.config.ice_servers.clone(),
                ..Default::default()
            }]
        };

        RTCConfiguration {
            ice_servers,
            ..Default::default()
        }
    }
}

#[async_trait]
impl LinkFactory for RtcLinkFactory {
    async fn create(
        &self,
        remote: SessionId,
        events: LinkEventSender,
    ) -> Result<Arc<dyn MediaLink>, LinkError> {
        let peer_connection = Arc::new(self.api.new_peer_connection(self.rtc_config()).await?);

        let state_events = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let events = state_events.clone();
                Box::pin(async move {
                    info!("Link to {} changed state: {:?}", events.remote(), s);
                    if matches!(s, RTCPeerConnectionState::Failed) {
                        events.failed();
                    }
                })
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                events.candidate(from_rtc_candidate(init));
            })
        }));

        let playback = self.playback.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let playback = playback.clone();
                Box::pin(async move {
                    if track.kind() != RTPCodecType::Audio {
                        debug!("Ignoring {:?} track from {}", track.kind(), remote);
                        return;
                    }
                    info!("Inbound audio track from {}", remote);
                    playback.attach(remote, track);
                })
            },
        ));

        Ok(Arc::new(RtcLink {
            remote,
            peer_connection,
            generated: Mutex::new(None),
        }))
    }
}

pub struct RtcLink {
    remote: SessionId,
    peer_connection: Arc<RTCPeerConnection>,
    /// Last offer or answer produced by the peer connection.
    generated: Mutex<Option<RTCSessionDescription>>,
}

#[async_trait]
impl MediaLink for RtcLink {
    async fn add_tracks(&self, tracks: &[LocalTrack]) -> Result<(), LinkError> {
        for track in tracks {
            let sender = self.peer_connection.add_track(track.clone()).await?;

            // RTCP must be drained for interceptors to work.
            tokio::spawn(async move {
                let mut buf = vec![0u8; 1500];
                while sender.read(&mut buf).await.is_ok() {}
            });
        }
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription, LinkError> {
        let offer = self.peer_connection.create_offer(None).await?;
        let desc = SessionDescription::offer(offer.sdp.clone());
        *self.generated.lock().await = Some(offer);
        Ok(desc)
    }

    async fn create_answer(&self) -> Result<SessionDescription, LinkError> {
        let answer = self.peer_connection.create_answer(None).await?;
        let desc = SessionDescription::answer(answer.sdp.clone());
        *self.generated.lock().await = Some(answer);
        Ok(desc)
    }

    /// webrtc-rs refuses local descriptions that differ from the one it
    /// generated, so the unmodified description of the same kind is applied.
    /// Rewritten parameters still reach the remote side, which is where the
    /// opus fmtp settings take effect.
    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), LinkError> {
        let generated = self.generated.lock().await.take();
        let local = match generated {
            Some(g) if same_kind(&g, desc.kind) => g,
            _ => to_rtc_description(desc)?,
        };
        self.peer_connection.set_local_description(local).await?;
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), LinkError> {
        self.peer_connection
            .set_remote_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), LinkError> {
        self.peer_connection
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_m_line_index,
                username_fragment: candidate.username_fragment,
            })
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), LinkError> {
        if let Err(e) = self.peer_connection.close().await {
            warn!("Closing link to {} failed: {}", self.remote, e);
            return Err(e.into());
        }
        Ok(())
    }
}

fn to_rtc_description(desc: SessionDescription) -> Result<RTCSessionDescription, LinkError> {
    let rtc = match desc.kind {
        SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
    };
    Ok(rtc)
}

fn same_kind(rtc: &RTCSessionDescription, kind: SdpKind) -> bool {
    matches!(
        (rtc.sdp_type, kind),
        (RTCSdpType::Offer, SdpKind::Offer) | (RTCSdpType::Answer, SdpKind::Answer)
    )
}

fn from_rtc_candidate(init: RTCIceCandidateInit) -> IceCandidate {
    IceCandidate {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_m_line_index: init.sdp_mline_index,
        username_fragment: init.username_fragment,
    }
}
