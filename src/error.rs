//! Error types for session negotiation

use thiserror::Error;

/// Failures talking to the session directory
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Signaling service could not be reached or the transport dropped
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// Service answered the call with an error
    #[error("directory rejected {operation}: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },
}

/// Failures acquiring local media
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Constraints asked for neither audio nor video
    #[error("no media requested")]
    NothingRequested,
}

/// Failures of the local negotiation state machine
#[derive(Error, Debug)]
pub enum NegotiationError {
    #[error("webrtc: {0}")]
    Rtc(#[from] webrtc::Error),

    #[error("unknown SDP type: {0}")]
    UnknownSdpKind(String),

    #[error("description of type {0} cannot be applied")]
    UnsupportedDescription(String),

    /// Remote track handed back to the connection as a local one
    #[error("track {0} is not a local track")]
    NotLocalTrack(String),

    #[error("negotiation already started")]
    AlreadyStarted,

    #[error("remote description already supplied")]
    AlreadyFinalized,

    /// Connection went away while waiting for candidate gathering
    #[error("peer connection closed")]
    Closed,
}

/// Invalid or unreadable settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("ICE server {0}: URL cannot be empty")]
    EmptyUrl(String),

    #[error("ICE server {0}: TURN servers require username and credential")]
    MissingTurnCredentials(String),
}

/// Everything a session entry point can fail with
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("media acquisition failed: {0}")]
    MediaAcquisition(#[from] MediaError),

    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    /// Caller-side timeout between sending the offer and applying the answer
    #[error("negotiation stalled after {0:?}")]
    NegotiationStalled(std::time::Duration),

    #[error("negotiation task aborted: {0}")]
    Aborted(String),
}

impl SessionError {
    /// True when the signaling service itself could not be reached
    pub fn is_directory_unavailable(&self) -> bool {
        matches!(self, SessionError::Directory(DirectoryError::Unavailable(_)))
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
