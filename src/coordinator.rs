//! Create/join lifecycle on top of the directory and the negotiation engine.

use crate::error::{Result, SessionError};
use crate::peer::api::{MediaSource, PeerFactory, PeerTrack};
use crate::peer::negotiation::NegotiationEngine;
use crate::peer::state::NegotiationStatus;
use crate::peer::types::{MediaBundle, MediaConstraints, SessionDescription, SessionIntent};
use crate::session::{SessionHandle, TeardownAction, ACTIVE_SESSION};
use crate::signaling::{DirectoryConnection, DirectoryConnector};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Pending "answer applied" outcome of a started session
#[derive(Debug)]
pub struct NegotiationHandle {
    task: JoinHandle<Result<()>>,
    generation: u64,
}

impl NegotiationHandle {
    fn new(task: JoinHandle<Result<()>>, generation: u64) -> Self {
        Self { task, generation }
    }

    /// Generation the session's teardown was installed under in its `SessionHandle`
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Waits for the remote description to be applied, at most `limit`.
    /// Elapsing yields `NegotiationStalled`; the session stays installed.
    pub async fn established(self, limit: Duration) -> Result<()> {
        match tokio::time::timeout(limit, self.task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join)) => Err(SessionError::Aborted(join.to_string())),
            Err(_) => Err(SessionError::NegotiationStalled(limit)),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// A started session as seen by the caller
#[derive(Debug)]
pub struct Session<T> {
    pub client_id: String,
    /// Directory key of the session: allocated by `New`, or the one joined
    pub session_id: String,
    pub intent: SessionIntent,
    pub media: MediaBundle<T>,
    pub status: NegotiationStatus,
    pub negotiation: NegotiationHandle,
    pub started_at: DateTime<Utc>,
}

pub struct SessionCoordinator<D, M, F> {
    directory: D,
    media: M,
    peers: F,
    handle: Arc<SessionHandle>,
}

impl<D, M, F> SessionCoordinator<D, M, F>
where
    D: DirectoryConnector,
    F: PeerFactory,
    M: MediaSource<Track = PeerTrack<F>>,
{
    /// Coordinator registering teardowns in the process-wide `ACTIVE_SESSION`
    pub fn new(directory: D, media: M, peers: F) -> Self {
        Self::with_handle(directory, media, peers, Arc::clone(&ACTIVE_SESSION))
    }

    pub fn with_handle(directory: D, media: M, peers: F, handle: Arc<SessionHandle>) -> Self {
        Self {
            directory,
            media,
            peers,
            handle,
        }
    }

    pub fn handle(&self) -> &Arc<SessionHandle> {
        &self.handle
    }

    pub async fn create_session(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Session<PeerTrack<F>>> {
        self.start(SessionIntent::Create, constraints).await
    }

    pub async fn join_session(
        &self,
        session_id: &str,
        constraints: &MediaConstraints,
    ) -> Result<Session<PeerTrack<F>>> {
        self.start(SessionIntent::Join(session_id.to_string()), constraints)
            .await
    }

    async fn start(
        &self,
        intent: SessionIntent,
        constraints: &MediaConstraints,
    ) -> Result<Session<PeerTrack<F>>> {
        let conn = self.directory.connect().await?;
        let client_id = conn.client_id().to_string();
        info!(%client_id, ?intent, "directory connected");

        let peer = match self.peers.new_peer().await {
            Ok(peer) => peer,
            Err(e) => {
                conn.disconnect().await;
                return Err(e.into());
            }
        };
        let engine = Arc::new(NegotiationEngine::new(peer, client_id.clone()));

        let (session_id, answer, media) =
            match self.exchange(&conn, &engine, &intent, constraints).await {
                Ok(exchanged) => exchanged,
                Err(e) => {
                    warn!(%client_id, error = %e, "session start failed");
                    if let Err(close_err) = engine.close().await {
                        warn!(%client_id, error = %close_err, "releasing peer connection failed");
                    }
                    conn.disconnect().await;
                    return Err(e);
                }
            };

        let task = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine
                    .finalize_on_gathering_complete(answer)
                    .await
                    .map_err(SessionError::from)
            })
        };

        let status = engine.status();
        let generation = self
            .handle
            .start(teardown_action(intent.clone(), client_id.clone(), conn, engine));
        info!(%client_id, %session_id, generation, "session started");

        Ok(Session {
            client_id,
            session_id,
            intent,
            media,
            status,
            negotiation: NegotiationHandle::new(task, generation),
            started_at: Utc::now(),
        })
    }

    async fn exchange(
        &self,
        conn: &D::Connection,
        engine: &NegotiationEngine<F::Peer>,
        intent: &SessionIntent,
        constraints: &MediaConstraints,
    ) -> Result<(String, SessionDescription, MediaBundle<PeerTrack<F>>)> {
        let (offer, media) = engine.begin(&self.media, constraints).await?;

        let (session_id, answer) = match intent {
            SessionIntent::Create => {
                let created = conn.new_session(conn.client_id(), &offer).await?;
                (created.session_id, created.answer)
            }
            SessionIntent::Join(session_id) => {
                let answer = conn.join(session_id, &offer).await?;
                (session_id.clone(), answer)
            }
        };
        Ok((session_id, answer, media))
    }
}

/// Deregisters from the directory, then releases the peer connection and
/// the directory connection. The deregistration outcome is returned but
/// never stops the local release.
fn teardown_action<C, P>(
    intent: SessionIntent,
    client_id: String,
    conn: C,
    engine: Arc<NegotiationEngine<P>>,
) -> TeardownAction
where
    C: DirectoryConnection,
    P: crate::peer::api::PeerConnection,
{
    Box::new(move || {
        async move {
            let deregistered = match &intent {
                SessionIntent::Create => conn.close(&client_id).await,
                SessionIntent::Join(session_id) => conn.leave(session_id).await,
            };
            if let Err(e) = &deregistered {
                warn!(%client_id, error = %e, "directory deregistration failed");
            }
            if let Err(e) = engine.close().await {
                warn!(%client_id, error = %e, "releasing peer connection failed");
            }
            conn.disconnect().await;
            info!(%client_id, "session ended");
            deregistered.map_err(SessionError::from)
        }
        .boxed()
    })
}
