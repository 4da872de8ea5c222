pub mod api;
pub mod connection;
pub mod ice;
pub mod media;
pub mod negotiation;
pub mod state;
pub mod types;

pub use api::{MediaSource, PeerConnection, PeerFactory, PeerTrack};
pub use connection::{RtcTrack, WebRtcPeer, WebRtcPeerFactory};
pub use media::SampleMediaSource;
pub use negotiation::NegotiationEngine;
pub use state::{GatheringPhase, NegotiationState, NegotiationStatus};
pub use types::{
    IceEvent, MediaBundle, MediaConstraints, MediaTrack, RemoteTracks, SdpKind,
    SessionDescription, SessionIntent, TrackKind, VideoConstraints,
};
