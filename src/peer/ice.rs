use crate::config::ServerConfig;
use crate::peer::types::IceEvent;
use crate::utils::add_ice_url_scheme;
use tracing::warn;
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::policy::bundle_policy::RTCBundlePolicy;
use webrtc::peer_connection::policy::rtcp_mux_policy::RTCRtcpMuxPolicy;

/// Connection configuration for the given ICE servers
pub fn rtc_config(servers: &[ServerConfig]) -> RTCConfiguration {
    RTCConfiguration {
        ice_servers: ice_servers(servers),
        ice_candidate_pool_size: 10,
        bundle_policy: RTCBundlePolicy::MaxBundle,
        rtcp_mux_policy: RTCRtcpMuxPolicy::Require,
        ..Default::default()
    }
}

pub fn ice_servers(servers: &[ServerConfig]) -> Vec<RTCIceServer> {
    servers
        .iter()
        .map(|config| RTCIceServer {
            urls: vec![add_ice_url_scheme(config)],
            username: config.username.clone().unwrap_or_default(),
            credential: config.credential.clone().unwrap_or_default(),
            ..Default::default()
        })
        .collect()
}

/// `None` from the gatherer is the end-of-candidates sentinel
pub fn ice_event(candidate: Option<RTCIceCandidate>) -> IceEvent {
    match candidate {
        None => IceEvent::GatheringComplete,
        Some(c) => match c.to_json() {
            Ok(init) => IceEvent::Candidate(init.candidate),
            Err(e) => {
                warn!(error = %e, "candidate could not be serialized");
                IceEvent::Candidate(format!("{c:?}"))
            }
        },
    }
}
