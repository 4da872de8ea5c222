use crate::peer::types::SessionDescription;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Where local candidate gathering stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatheringPhase {
    Gathering,
    Complete,
    /// Connection closed before the sentinel arrived
    Closed,
}

/// Negotiation progress of one connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NegotiationState {
    pub local_description: Option<SessionDescription>,
    /// Set at most once, and only after `candidate_gathering_complete`
    pub remote_description: Option<SessionDescription>,
    pub candidate_gathering_complete: bool,
}

/// Shared read access to a connection's `NegotiationState`
#[derive(Debug, Clone, Default)]
pub struct NegotiationStatus {
    inner: Arc<Mutex<NegotiationState>>,
}

impl NegotiationStatus {
    pub fn snapshot(&self) -> NegotiationState {
        self.lock().clone()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, NegotiationState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
