//! Offer creation and gathering-gated application of the remote description.
//!
//! Candidates are never trickled: the local description carries them once the
//! gatherer reports completion, and the remote answer is applied only after
//! that sentinel has been seen.

use crate::error::{NegotiationError, SessionError};
use crate::logger::{log_candidate_summary, log_ice_event, CandidateSummary};
use crate::peer::api::{MediaSource, PeerConnection};
use crate::peer::state::{GatheringPhase, NegotiationState, NegotiationStatus};
use crate::peer::types::{IceEvent, MediaBundle, MediaConstraints, RemoteTracks, SessionDescription};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct NegotiationEngine<P: PeerConnection> {
    peer: Arc<P>,
    label: String,
    status: NegotiationStatus,
    phase: Arc<watch::Sender<GatheringPhase>>,
    started: AtomicBool,
    finalizing: AtomicBool,
    closed: AtomicBool,
}

impl<P: PeerConnection> NegotiationEngine<P> {
    /// `label` only tags log lines, usually the directory client id
    pub fn new(peer: P, label: impl Into<String>) -> Self {
        let (phase, _) = watch::channel(GatheringPhase::Gathering);
        Self {
            peer: Arc::new(peer),
            label: label.into(),
            status: NegotiationStatus::default(),
            phase: Arc::new(phase),
            started: AtomicBool::new(false),
            finalizing: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn peer(&self) -> &Arc<P> {
        &self.peer
    }

    pub fn status(&self) -> NegotiationStatus {
        self.status.clone()
    }

    pub fn state(&self) -> NegotiationState {
        self.status.snapshot()
    }

    pub fn gathering_phase(&self) -> GatheringPhase {
        *self.phase.borrow()
    }

    /// Acquires local media, attaches it, and sets the local offer.
    pub async fn begin<M>(
        &self,
        media: &M,
        constraints: &MediaConstraints,
    ) -> Result<(SessionDescription, MediaBundle<P::Track>), SessionError>
    where
        M: MediaSource<Track = P::Track> + ?Sized,
    {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(NegotiationError::AlreadyStarted.into());
        }

        let local_tracks = media.acquire(constraints).await?;
        debug!(label = %self.label, tracks = local_tracks.len(), "local media acquired");

        let bundle = MediaBundle::new(local_tracks);
        self.register_handlers(bundle.remote_tracks.clone());

        for track in &bundle.local_tracks {
            self.peer.add_track(track.clone()).await?;
        }

        let offer = self.peer.create_offer().await?;
        self.peer.set_local_description(offer.clone()).await?;
        self.status.lock().local_description = Some(offer.clone());
        info!(label = %self.label, "local offer ready");

        Ok((offer, bundle))
    }

    fn register_handlers(&self, remote_tracks: RemoteTracks<P::Track>) {
        let status = self.status.clone();
        let phase = Arc::clone(&self.phase);
        let label = self.label.clone();
        let summary = Arc::new(Mutex::new(CandidateSummary::default()));

        self.peer.on_ice_event(Box::new(move |event: IceEvent| {
            log_ice_event(&label, &event);
            match event {
                IceEvent::Candidate(candidate) => {
                    summary
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .record(&candidate);
                }
                IceEvent::GatheringComplete => {
                    status.lock().candidate_gathering_complete = true;
                    phase.send_if_modified(|p| {
                        if *p == GatheringPhase::Gathering {
                            *p = GatheringPhase::Complete;
                            true
                        } else {
                            false
                        }
                    });
                    let totals = *summary.lock().unwrap_or_else(PoisonError::into_inner);
                    log_candidate_summary(&label, &totals);
                }
            }
            Box::pin(async {})
        }));

        let label = self.label.clone();
        self.peer.on_track(Box::new(move |tracks: Vec<P::Track>| {
            let reported = tracks.len();
            let added = remote_tracks.extend_unique(tracks);
            debug!(label = %label, reported, added, total = remote_tracks.len(), "remote tracks arrived");
            Box::pin(async {})
        }));
    }

    /// Applies `remote` as the remote description once gathering has completed.
    ///
    /// Resolves only after the sentinel; it never resolves if the gatherer
    /// stalls, so callers bound it with a timeout. Fails with `Closed` if the
    /// engine is closed first.
    pub async fn finalize_on_gathering_complete(
        &self,
        remote: SessionDescription,
    ) -> Result<(), NegotiationError> {
        if self.finalizing.swap(true, Ordering::SeqCst) {
            return Err(NegotiationError::AlreadyFinalized);
        }

        let mut rx = self.phase.subscribe();
        let phase = {
            let seen = rx
                .wait_for(|p| *p != GatheringPhase::Gathering)
                .await
                .map_err(|_| NegotiationError::Closed)?;
            *seen
        };
        if phase == GatheringPhase::Closed {
            return Err(NegotiationError::Closed);
        }

        self.peer.set_remote_description(remote.clone()).await?;
        self.status.lock().remote_description = Some(remote);
        info!(label = %self.label, "remote description applied");
        Ok(())
    }

    pub async fn close(&self) -> Result<(), NegotiationError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.phase.send_if_modified(|p| {
            if *p == GatheringPhase::Gathering {
                *p = GatheringPhase::Closed;
                true
            } else {
                false
            }
        });
        if let Err(e) = self.peer.close().await {
            warn!(label = %self.label, error = %e, "closing peer connection failed");
            return Err(e);
        }
        debug!(label = %self.label, "peer connection closed");
        Ok(())
    }
}
