use crate::error::{MediaError, NegotiationError};
use crate::peer::types::{IceEvent, MediaConstraints, MediaTrack, SessionDescription};
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;

pub type HandlerFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Fired for every local candidate and once more with the end-of-candidates sentinel
pub type OnIceEventHdlrFn = Box<dyn FnMut(IceEvent) -> HandlerFuture + Send + Sync>;

/// Fired when the remote side reports one or more tracks
pub type OnTrackHdlrFn<T> = Box<dyn FnMut(Vec<T>) -> HandlerFuture + Send + Sync>;

/// Local connection primitive driven by the negotiation engine
#[async_trait]
pub trait PeerConnection: Send + Sync + 'static {
    type Track: MediaTrack;

    /// Attaches a local track as a send-receive transceiver
    async fn add_track(&self, track: Self::Track) -> Result<(), NegotiationError>;

    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError>;

    async fn set_local_description(&self, desc: SessionDescription)
        -> Result<(), NegotiationError>;

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), NegotiationError>;

    fn on_ice_event(&self, handler: OnIceEventHdlrFn);

    fn on_track(&self, handler: OnTrackHdlrFn<Self::Track>);

    async fn close(&self) -> Result<(), NegotiationError>;
}

/// Builds one fresh connection per session
#[async_trait]
pub trait PeerFactory: Send + Sync {
    type Peer: PeerConnection;

    async fn new_peer(&self) -> Result<Self::Peer, NegotiationError>;
}

/// Local capture devices
#[async_trait]
pub trait MediaSource: Send + Sync {
    type Track: MediaTrack;

    async fn acquire(&self, constraints: &MediaConstraints)
        -> Result<Vec<Self::Track>, MediaError>;
}

pub type PeerTrack<F> = <<F as PeerFactory>::Peer as PeerConnection>::Track;
