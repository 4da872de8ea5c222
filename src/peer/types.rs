use crate::error::NegotiationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

/// Kind of a session description
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Pranswer,
    Answer,
    Rollback,
}

impl SdpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SdpKind::Offer => "offer",
            SdpKind::Pranswer => "pranswer",
            SdpKind::Answer => "answer",
            SdpKind::Rollback => "rollback",
        }
    }
}

impl fmt::Display for SdpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SdpKind {
    type Err = NegotiationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "offer" => Ok(SdpKind::Offer),
            "pranswer" => Ok(SdpKind::Pranswer),
            "answer" => Ok(SdpKind::Answer),
            "rollback" => Ok(SdpKind::Rollback),
            _ => Err(NegotiationError::UnknownSdpKind(s.to_string())),
        }
    }
}

/// Offer or answer exchanged through the directory
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn new(kind: SdpKind, sdp: impl Into<String>) -> Self {
        Self {
            kind,
            sdp: sdp.into(),
        }
    }

    pub fn offer(sdp: impl Into<String>) -> Self {
        Self::new(SdpKind::Offer, sdp)
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self::new(SdpKind::Answer, sdp)
    }

    /// Builds a description from the wire pair `(type, sdp)`
    pub fn parse(kind: &str, sdp: impl Into<String>) -> Result<Self, NegotiationError> {
        Ok(Self::new(kind.parse()?, sdp))
    }
}

/// Which side of the directory a session was started from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionIntent {
    Create,
    Join(String),
}

/// One notification from the local candidate gatherer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IceEvent {
    /// A discovered local candidate line
    Candidate(String),
    /// End-of-candidates sentinel
    GatheringComplete,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frame_rate: 30,
        }
    }
}

/// What local media to capture
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: Option<VideoConstraints>,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: Some(VideoConstraints::default()),
        }
    }
}

impl MediaConstraints {
    pub fn audio_only() -> Self {
        Self {
            audio: true,
            video: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.audio && self.video.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

/// A media track as seen by the negotiation layer
pub trait MediaTrack: Clone + Send + Sync + 'static {
    fn id(&self) -> String;
    fn kind(&self) -> TrackKind;
}

/// Append-only list of remote tracks, shared between the track-arrival
/// handler and the caller
#[derive(Debug)]
pub struct RemoteTracks<T> {
    inner: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for RemoteTracks<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for RemoteTracks<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: MediaTrack> RemoteTracks<T> {
    /// Appends tracks not seen before, keeping arrival order.
    /// Returns how many were actually added.
    pub fn extend_unique(&self, tracks: impl IntoIterator<Item = T>) -> usize {
        let mut list = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut added = 0;
        for track in tracks {
            let id = track.id();
            if list.iter().any(|t| t.id() == id) {
                continue;
            }
            list.push(track);
            added += 1;
        }
        added
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Local tracks fixed at acquisition plus the growing set of remote tracks
#[derive(Debug, Clone)]
pub struct MediaBundle<T> {
    pub local_tracks: Vec<T>,
    pub remote_tracks: RemoteTracks<T>,
}

impl<T> MediaBundle<T> {
    pub fn new(local_tracks: Vec<T>) -> Self {
        Self {
            local_tracks,
            remote_tracks: RemoteTracks::default(),
        }
    }
}
