use crate::config::Settings;
use crate::error::NegotiationError;
use crate::peer::api::{OnIceEventHdlrFn, OnTrackHdlrFn, PeerConnection, PeerFactory};
use crate::peer::ice::{ice_event, rtc_config};
use crate::peer::types::{MediaTrack, SdpKind, SessionDescription, TrackKind};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::APIBuilder;
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::{RTCRtpTransceiver, RTCRtpTransceiverInit};
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

/// A webrtc-rs track on either side of the connection
#[derive(Clone)]
pub enum RtcTrack {
    /// Captured here; samples are written by the application
    Local(Arc<TrackLocalStaticSample>),
    Remote(Arc<TrackRemote>),
}

/// Tracks built here always carry a codec, so `Unspecified` is not expected.
/// It is reported as audio.
fn track_kind(kind: RTPCodecType) -> TrackKind {
    match kind {
        RTPCodecType::Audio => TrackKind::Audio,
        RTPCodecType::Video => TrackKind::Video,
        RTPCodecType::Unspecified => {
            debug!("track with unspecified codec type treated as audio");
            TrackKind::Audio
        }
    }
}

impl MediaTrack for RtcTrack {
    fn id(&self) -> String {
        match self {
            RtcTrack::Local(t) => t.id().to_string(),
            RtcTrack::Remote(t) => t.id(),
        }
    }

    fn kind(&self) -> TrackKind {
        match self {
            RtcTrack::Local(t) => track_kind(t.kind()),
            RtcTrack::Remote(t) => track_kind(t.kind()),
        }
    }
}

impl std::fmt::Debug for RtcTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let side = match self {
            RtcTrack::Local(_) => "local",
            RtcTrack::Remote(_) => "remote",
        };
        f.debug_struct("RtcTrack")
            .field("side", &side)
            .field("id", &self.id())
            .field("kind", &self.kind())
            .finish()
    }
}

pub fn to_rtc_description(
    desc: SessionDescription,
) -> Result<RTCSessionDescription, NegotiationError> {
    let rtc = match desc.kind {
        SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
        SdpKind::Pranswer => RTCSessionDescription::pranswer(desc.sdp)?,
        SdpKind::Rollback => {
            return Err(NegotiationError::UnsupportedDescription(
                SdpKind::Rollback.to_string(),
            ))
        }
    };
    Ok(rtc)
}

pub fn from_rtc_description(
    desc: RTCSessionDescription,
) -> Result<SessionDescription, NegotiationError> {
    let kind = match desc.sdp_type {
        RTCSdpType::Offer => SdpKind::Offer,
        RTCSdpType::Answer => SdpKind::Answer,
        RTCSdpType::Pranswer => SdpKind::Pranswer,
        RTCSdpType::Rollback => SdpKind::Rollback,
        other => return Err(NegotiationError::UnsupportedDescription(other.to_string())),
    };
    Ok(SessionDescription::new(kind, desc.sdp))
}

/// `PeerConnection` backed by a webrtc-rs `RTCPeerConnection`
pub struct WebRtcPeer {
    pc: Arc<RTCPeerConnection>,
}

impl WebRtcPeer {
    pub fn new(pc: Arc<RTCPeerConnection>) -> Self {
        pc.on_ice_gathering_state_change(Box::new(move |state| {
            debug!(?state, "ICE gathering state changed");
            Box::pin(async {})
        }));
        pc.on_peer_connection_state_change(Box::new(move |st: RTCPeerConnectionState| {
            match st {
                RTCPeerConnectionState::Connected => info!("peer connection established"),
                RTCPeerConnectionState::Disconnected | RTCPeerConnectionState::Failed => {
                    info!(state = ?st, "peer connection lost")
                }
                RTCPeerConnectionState::Closed => debug!("peer connection closed"),
                _ => debug!(state = ?st, "peer connection state changed"),
            }
            Box::pin(async {})
        }));
        Self { pc }
    }

    pub fn inner(&self) -> &Arc<RTCPeerConnection> {
        &self.pc
    }
}

#[async_trait]
impl PeerConnection for WebRtcPeer {
    type Track = RtcTrack;

    async fn add_track(&self, track: RtcTrack) -> Result<(), NegotiationError> {
        let local = match track {
            RtcTrack::Local(t) => t,
            RtcTrack::Remote(t) => return Err(NegotiationError::NotLocalTrack(t.id())),
        };
        self.pc
            .add_transceiver_from_track(
                local as Arc<dyn TrackLocal + Send + Sync>,
                Some(RTCRtpTransceiverInit {
                    direction: RTCRtpTransceiverDirection::Sendrecv,
                    send_encodings: vec![],
                }),
            )
            .await?;
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError> {
        let offer = self.pc.create_offer(None).await?;
        from_rtc_description(offer)
    }

    async fn set_local_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.pc
            .set_local_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.pc
            .set_remote_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    fn on_ice_event(&self, mut handler: OnIceEventHdlrFn) {
        self.pc
            .on_ice_candidate(Box::new(move |cand: Option<RTCIceCandidate>| {
                handler(ice_event(cand))
            }));
    }

    fn on_track(&self, mut handler: OnTrackHdlrFn<RtcTrack>) {
        self.pc.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                handler(vec![RtcTrack::Remote(track)])
            },
        ));
    }

    async fn close(&self) -> Result<(), NegotiationError> {
        self.pc.close().await?;
        Ok(())
    }
}

/// Builds webrtc-rs connections with default codecs and interceptors
#[derive(Debug, Clone, Default)]
pub struct WebRtcPeerFactory {
    settings: Settings,
}

impl WebRtcPeerFactory {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl PeerFactory for WebRtcPeerFactory {
    type Peer = WebRtcPeer;

    async fn new_peer(&self) -> Result<WebRtcPeer, NegotiationError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let pc = api
            .new_peer_connection(rtc_config(&self.settings.ice_servers))
            .await?;
        debug!(servers = self.settings.ice_servers.len(), "peer connection created");
        Ok(WebRtcPeer::new(Arc::new(pc)))
    }
}
