use crate::error::SessionError;
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

pub type TeardownFuture = BoxFuture<'static, Result<(), SessionError>>;

/// Releases everything one session holds; runs at most once
pub type TeardownAction = Box<dyn FnOnce() -> TeardownFuture + Send>;

/// Slot holding the teardown of the active session, if any.
/// Every installed teardown is tagged with a fresh generation number.
#[derive(Default)]
pub struct SessionHandle {
    slot: Mutex<Option<(u64, TeardownAction)>>,
    generations: AtomicU64,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `teardown` and returns its generation. A previously installed
    /// action is dropped without running; ending the previous session first
    /// is up to the caller.
    pub fn start(&self, teardown: TeardownAction) -> u64 {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace((generation, teardown));
        if let Some((replaced, _)) = previous {
            warn!(replaced, generation, "active session replaced without teardown");
        }
        generation
    }

    /// Runs and clears the installed teardown. No-op when nothing is active.
    /// The slot is empty afterwards even if the teardown fails.
    pub async fn end(&self) -> Result<(), SessionError> {
        let taken = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Self::run(taken).await
    }

    /// Like `end`, but only if the installed teardown is still the one
    /// returned by `start` as `generation`. A replaced session is left alone.
    pub async fn end_generation(&self, generation: u64) -> Result<(), SessionError> {
        let taken = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some((current, _)) if *current == generation => slot.take(),
                _ => None,
            }
        };
        if taken.is_none() {
            debug!(generation, "session already replaced or ended");
        }
        Self::run(taken).await
    }

    async fn run(taken: Option<(u64, TeardownAction)>) -> Result<(), SessionError> {
        match taken {
            Some((generation, teardown)) => {
                debug!(generation, "ending active session");
                teardown().await
            }
            None => Ok(()),
        }
    }

    /// Generation of the installed teardown, if any
    pub fn active_generation(&self) -> Option<u64> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(generation, _)| *generation)
    }

    pub fn is_active(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Process-wide active session
pub static ACTIVE_SESSION: Lazy<Arc<SessionHandle>> = Lazy::new(|| Arc::new(SessionHandle::new()));
