//! Client side of the session directory.
//!
//! The directory is the signaling intermediary exposing `Sessions.New`,
//! `Sessions.Join`, `Sessions.Close` and `Sessions.Leave`. Its transport is
//! supplied by the embedding application through these traits.

use crate::error::DirectoryError;
use crate::peer::types::SessionDescription;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Reply to `New`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    /// Key joiners use to reach this session
    pub session_id: String,
    pub answer: SessionDescription,
}

/// One open connection to the directory, bound to a participant identity
#[async_trait]
pub trait DirectoryConnection: Send + Sync + 'static {
    /// Identity the directory assigned to this participant on connect
    fn client_id(&self) -> &str;

    /// `New(client_id, kind, sdp)`: registers a session around `offer`
    async fn new_session(
        &self,
        client_id: &str,
        offer: &SessionDescription,
    ) -> Result<NewSession, DirectoryError>;

    /// `Join(session_id, kind, sdp)`: must reference an existing session
    async fn join(
        &self,
        session_id: &str,
        offer: &SessionDescription,
    ) -> Result<SessionDescription, DirectoryError>;

    /// `Close(client_id)`: creator teardown
    async fn close(&self, client_id: &str) -> Result<(), DirectoryError>;

    /// `Leave(session_id)`: joiner teardown
    async fn leave(&self, session_id: &str) -> Result<(), DirectoryError>;

    /// Releases the underlying transport
    async fn disconnect(&self);
}

/// Opens directory connections; one per session attempt
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    type Connection: DirectoryConnection;

    /// Fails with `DirectoryError::Unavailable` when the service cannot be reached
    async fn connect(&self) -> Result<Self::Connection, DirectoryError>;
}
