//! Two-party audio/video session negotiation.
//!
//! A session is created or joined through a signaling directory; the local
//! offer is exchanged for the remote answer, which is applied once local
//! candidate gathering has completed. At most one session is active per
//! process and it is torn down exactly once.

pub mod commands;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logger;
pub mod peer;
pub mod session;
pub mod signaling;
pub mod utils;

pub use config::Settings;
pub use coordinator::{NegotiationHandle, Session, SessionCoordinator};
pub use error::{DirectoryError, MediaError, NegotiationError, SessionError};
pub use session::{SessionHandle, ACTIVE_SESSION};
pub use signaling::{DirectoryConnection, DirectoryConnector, NewSession};

use peer::{SampleMediaSource, WebRtcPeerFactory};

/// Installs logging per `settings`
pub fn init(settings: &Settings) {
    if logger::init(&settings.logging) {
        tracing::info!(
            ice_servers = settings.ice_servers.len(),
            "logging initialized"
        );
    }
}

/// Coordinator over webrtc-rs connections and sample media tracks
pub fn webrtc_coordinator<D: DirectoryConnector>(
    settings: &Settings,
    directory: D,
) -> SessionCoordinator<D, SampleMediaSource, WebRtcPeerFactory> {
    SessionCoordinator::new(
        directory,
        SampleMediaSource::default(),
        WebRtcPeerFactory::new(settings.clone()),
    )
}
