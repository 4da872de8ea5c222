#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vchat_lib::peer::api::{OnIceEventHdlrFn, OnTrackHdlrFn};
use vchat_lib::peer::{
    IceEvent, MediaConstraints, MediaSource, MediaTrack, PeerConnection, PeerFactory,
    SessionDescription, TrackKind,
};
use vchat_lib::{
    DirectoryConnection, DirectoryConnector, DirectoryError, MediaError, NegotiationError,
    NewSession,
};

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Tracks and media
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeTrack {
    pub id: String,
    pub kind: TrackKind,
}

impl FakeTrack {
    pub fn audio(id: &str) -> Self {
        Self {
            id: id.into(),
            kind: TrackKind::Audio,
        }
    }

    pub fn video(id: &str) -> Self {
        Self {
            id: id.into(),
            kind: TrackKind::Video,
        }
    }
}

impl MediaTrack for FakeTrack {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }
}

#[derive(Default)]
pub struct FakeMedia {
    pub deny: bool,
    pub requests: Arc<AtomicUsize>,
}

impl FakeMedia {
    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl MediaSource for FakeMedia {
    type Track = FakeTrack;

    async fn acquire(&self, constraints: &MediaConstraints) -> Result<Vec<FakeTrack>, MediaError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.deny {
            return Err(MediaError::PermissionDenied("camera blocked".into()));
        }
        let mut tracks = Vec::new();
        if constraints.audio {
            tracks.push(FakeTrack::audio("local-audio"));
        }
        if constraints.video.is_some() {
            tracks.push(FakeTrack::video("local-video"));
        }
        Ok(tracks)
    }
}

// =============================================================================
// Peer connection
// =============================================================================

#[derive(Default)]
pub struct PeerProbe {
    pub label: String,
    pub added: Mutex<Vec<FakeTrack>>,
    pub local: Mutex<Vec<SessionDescription>>,
    pub remote: Mutex<Vec<SessionDescription>>,
    pub closes: AtomicUsize,
    ice: Mutex<Option<OnIceEventHdlrFn>>,
    tracks: Mutex<Option<OnTrackHdlrFn<FakeTrack>>>,
}

impl PeerProbe {
    pub async fn fire_ice(&self, event: IceEvent) {
        let fut = {
            let mut guard = self.ice.lock().unwrap();
            let handler = guard.as_mut().expect("ice handler registered");
            handler(event)
        };
        fut.await;
    }

    pub async fn fire_candidates_then_complete(&self) {
        self.fire_ice(IceEvent::Candidate(
            "candidate:1 1 udp 2130706431 192.168.1.2 50000 typ host".into(),
        ))
        .await;
        self.fire_ice(IceEvent::Candidate(
            "candidate:2 1 udp 1694498815 203.0.113.5 50001 typ srflx raddr 0.0.0.0 rport 0".into(),
        ))
        .await;
        self.fire_ice(IceEvent::GatheringComplete).await;
    }

    pub async fn fire_tracks(&self, tracks: Vec<FakeTrack>) {
        let fut = {
            let mut guard = self.tracks.lock().unwrap();
            let handler = guard.as_mut().expect("track handler registered");
            handler(tracks)
        };
        fut.await;
    }

    pub fn remote_applied(&self) -> Vec<SessionDescription> {
        self.remote.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct FakePeer(pub Arc<PeerProbe>);

impl FakePeer {
    pub fn new(label: &str) -> Self {
        Self(Arc::new(PeerProbe {
            label: label.into(),
            ..Default::default()
        }))
    }
}

#[async_trait]
impl PeerConnection for FakePeer {
    type Track = FakeTrack;

    async fn add_track(&self, track: FakeTrack) -> Result<(), NegotiationError> {
        self.0.added.lock().unwrap().push(track);
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError> {
        Ok(SessionDescription::offer(format!("v=0 offer from {}", self.0.label)))
    }

    async fn set_local_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.0.local.lock().unwrap().push(desc);
        Ok(())
    }

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.0.remote.lock().unwrap().push(desc);
        Ok(())
    }

    fn on_ice_event(&self, handler: OnIceEventHdlrFn) {
        *self.0.ice.lock().unwrap() = Some(handler);
    }

    fn on_track(&self, handler: OnTrackHdlrFn<FakeTrack>) {
        *self.0.tracks.lock().unwrap() = Some(handler);
    }

    async fn close(&self) -> Result<(), NegotiationError> {
        self.0.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FakePeerFactory {
    pub created: Arc<Mutex<Vec<Arc<PeerProbe>>>>,
}

impl FakePeerFactory {
    pub fn probe(&self, idx: usize) -> Arc<PeerProbe> {
        Arc::clone(&self.created.lock().unwrap()[idx])
    }

    pub fn count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl PeerFactory for FakePeerFactory {
    type Peer = FakePeer;

    async fn new_peer(&self) -> Result<FakePeer, NegotiationError> {
        let mut created = self.created.lock().unwrap();
        let peer = FakePeer::new(&format!("peer{}", created.len() + 1));
        created.push(Arc::clone(&peer.0));
        Ok(peer)
    }
}

// =============================================================================
// Directory
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    New {
        client_id: String,
        offer: SessionDescription,
    },
    Join {
        session_id: String,
        offer: SessionDescription,
    },
    Close(String),
    Leave(String),
    Disconnect(String),
}

/// Scripted directory shared by every connection it hands out
#[derive(Default)]
pub struct DirectoryLog {
    pub calls: Mutex<Vec<Call>>,
    pub client_ids: Mutex<VecDeque<String>>,
    pub session_id: Mutex<String>,
    pub answer: Mutex<Option<SessionDescription>>,
    pub unavailable: AtomicBool,
    pub reject_new: AtomicBool,
    pub fail_teardown: AtomicBool,
}

impl DirectoryLog {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn closes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Close(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn answer(&self) -> SessionDescription {
        self.answer
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| SessionDescription::answer("v=0 default answer"))
    }
}

#[derive(Clone)]
pub struct FakeDirectory {
    pub log: Arc<DirectoryLog>,
}

impl FakeDirectory {
    /// Hands out `client_ids` in order; `New` allocates `session_id`
    pub fn new(client_ids: &[&str], session_id: &str) -> Self {
        let log = DirectoryLog::default();
        *log.client_ids.lock().unwrap() = client_ids.iter().map(|s| s.to_string()).collect();
        *log.session_id.lock().unwrap() = session_id.into();
        Self { log: Arc::new(log) }
    }

    pub fn with_answer(self, answer: SessionDescription) -> Self {
        *self.log.answer.lock().unwrap() = Some(answer);
        self
    }
}

pub struct FakeConnection {
    client_id: String,
    log: Arc<DirectoryLog>,
}

#[async_trait]
impl DirectoryConnection for FakeConnection {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    async fn new_session(
        &self,
        client_id: &str,
        offer: &SessionDescription,
    ) -> Result<NewSession, DirectoryError> {
        self.log.record(Call::New {
            client_id: client_id.into(),
            offer: offer.clone(),
        });
        if self.log.reject_new.load(Ordering::SeqCst) {
            return Err(DirectoryError::Rejected {
                operation: "New",
                reason: "session already exists".into(),
            });
        }
        Ok(NewSession {
            session_id: self.log.session_id.lock().unwrap().clone(),
            answer: self.log.answer(),
        })
    }

    async fn join(
        &self,
        session_id: &str,
        offer: &SessionDescription,
    ) -> Result<SessionDescription, DirectoryError> {
        self.log.record(Call::Join {
            session_id: session_id.into(),
            offer: offer.clone(),
        });
        Ok(self.log.answer())
    }

    async fn close(&self, client_id: &str) -> Result<(), DirectoryError> {
        self.log.record(Call::Close(client_id.into()));
        if self.log.fail_teardown.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("socket closed".into()));
        }
        Ok(())
    }

    async fn leave(&self, session_id: &str) -> Result<(), DirectoryError> {
        self.log.record(Call::Leave(session_id.into()));
        if self.log.fail_teardown.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("socket closed".into()));
        }
        Ok(())
    }

    async fn disconnect(&self) {
        self.log.record(Call::Disconnect(self.client_id.clone()));
    }
}

#[async_trait]
impl DirectoryConnector for FakeDirectory {
    type Connection = FakeConnection;

    async fn connect(&self) -> Result<FakeConnection, DirectoryError> {
        if self.log.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("connection refused".into()));
        }
        let client_id = self
            .log
            .client_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(vchat_lib::utils::random_id);
        Ok(FakeConnection {
            client_id,
            log: Arc::clone(&self.log),
        })
    }
}
