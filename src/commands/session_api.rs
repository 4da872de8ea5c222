use crate::config::Settings;
use crate::coordinator::{NegotiationHandle, Session, SessionCoordinator};
use crate::error::{Result, SessionError};
use crate::peer::api::{MediaSource, PeerFactory, PeerTrack};
use crate::peer::types::MediaConstraints;
use crate::session::{SessionHandle, ACTIVE_SESSION};
use crate::signaling::DirectoryConnector;
use std::time::Duration;
use tracing::{info, warn};

/// Starts a new session as its creator. An active session is replaced
/// without being ended; call `end_active_session` first to release it.
pub async fn start_as_creator<D, M, F>(
    coordinator: &SessionCoordinator<D, M, F>,
    constraints: &MediaConstraints,
) -> Result<Session<PeerTrack<F>>>
where
    D: DirectoryConnector,
    F: PeerFactory,
    M: MediaSource<Track = PeerTrack<F>>,
{
    info!("start_as_creator called");
    coordinator.create_session(constraints).await
}

/// Joins the existing session `session_id`
pub async fn start_as_joiner<D, M, F>(
    coordinator: &SessionCoordinator<D, M, F>,
    session_id: &str,
    constraints: &MediaConstraints,
) -> Result<Session<PeerTrack<F>>>
where
    D: DirectoryConnector,
    F: PeerFactory,
    M: MediaSource<Track = PeerTrack<F>>,
{
    info!(%session_id, "start_as_joiner called");
    coordinator.join_session(session_id, constraints).await
}

/// Tears down the process-wide active session, if any
pub async fn end_active_session() -> Result<()> {
    ACTIVE_SESSION.end().await
}

/// Waits until the answer is applied. On a stall or negotiation failure the
/// session `negotiation` belongs to is ended before the error is returned,
/// unless it has already been replaced in `handle`.
pub async fn await_established(
    handle: &SessionHandle,
    negotiation: NegotiationHandle,
    limit: Duration,
) -> Result<()> {
    let generation = negotiation.generation();
    match negotiation.established(limit).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if matches!(e, SessionError::NegotiationStalled(_)) {
                warn!(?limit, "negotiation stalled, ending session");
            } else {
                warn!(error = %e, "negotiation failed, ending session");
            }
            if let Err(teardown) = handle.end_generation(generation).await {
                warn!(error = %teardown, "teardown after failed negotiation also failed");
            }
            Err(e)
        }
    }
}

/// `await_established` on the process-wide session, bounded by
/// `settings.negotiation_timeout`
pub async fn establish_active(negotiation: NegotiationHandle, settings: &Settings) -> Result<()> {
    await_established(&ACTIVE_SESSION, negotiation, settings.negotiation_timeout()).await
}
