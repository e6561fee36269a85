use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::signals::FetchSignals;
use crate::errors::CoreError;

/// Lifecycle state of a per-watchlist refresh session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
    Error,
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStatus::Active => write!(f, "Active"),
            FetchStatus::Paused => write!(f, "Paused"),
            FetchStatus::Completed => write!(f, "Completed"),
            FetchStatus::Cancelled => write!(f, "Cancelled"),
            FetchStatus::Error => write!(f, "Error"),
        }
    }
}

/// Read-only view of one session, as returned by status queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub slug: String,
    pub status: FetchStatus,
    pub current_batch: usize,
    pub total_batches: usize,
}

struct FetchSession {
    status: FetchStatus,
    current_batch: usize,
    total_batches: usize,
    signals: FetchSignals,
}

/// Registry of in-flight refresh sessions, keyed by watchlist slug.
///
/// Constructed once and injected into the orchestrator, so tests get
/// isolated instances instead of sharing module state. The registry is the
/// system's only shared mutable state; its single invariant — at most one
/// Active session per slug — is enforced inside `begin()` under the lock.
/// The lock is only ever held between suspension points, never across an
/// await.
#[derive(Clone, Default)]
pub struct FetchSessionStore {
    inner: Arc<Mutex<HashMap<String, FetchSession>>>,
}

impl FetchSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, FetchSession>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a session for `slug` and return its signals plus the batch
    /// index to start from.
    ///
    /// An Active session rejects the call. A Paused session is resumed: it
    /// turns Active again and execution re-enters at its recorded batch.
    /// Terminal sessions (Completed/Cancelled/Error) are stale and get
    /// replaced by a fresh one starting at batch 0.
    pub(crate) fn begin(
        &self,
        slug: &str,
        total_batches: usize,
    ) -> Result<(FetchSignals, usize), CoreError> {
        let mut sessions = self.lock();
        if let Some(session) = sessions.get_mut(slug) {
            match session.status {
                FetchStatus::Active => return Err(CoreError::FetchInProgress),
                FetchStatus::Paused => {
                    session.status = FetchStatus::Active;
                    session.total_batches = total_batches;
                    session.signals.clear_pause();
                    return Ok((session.signals.clone(), session.current_batch));
                }
                _ => {}
            }
        }

        let signals = FetchSignals::new();
        sessions.insert(
            slug.to_string(),
            FetchSession {
                status: FetchStatus::Active,
                current_batch: 0,
                total_batches,
                signals: signals.clone(),
            },
        );
        Ok((signals, 0))
    }

    /// Current state of the session for `slug`, if one is registered.
    pub fn snapshot(&self, slug: &str) -> Option<SessionSnapshot> {
        let sessions = self.lock();
        sessions.get(slug).map(|s| SessionSnapshot {
            slug: slug.to_string(),
            status: s.status,
            current_batch: s.current_batch,
            total_batches: s.total_batches,
        })
    }

    /// Signal cancellation. An Active session stops at its next poll point;
    /// a Paused session has no loop left to observe the signal, so it moves
    /// to Cancelled directly. Returns `false` when there is nothing to
    /// cancel.
    pub fn request_cancel(&self, slug: &str) -> bool {
        let mut sessions = self.lock();
        match sessions.get_mut(slug) {
            Some(session) if session.status == FetchStatus::Active => {
                session.signals.request_cancel();
                true
            }
            Some(session) if session.status == FetchStatus::Paused => {
                session.signals.request_cancel();
                session.status = FetchStatus::Cancelled;
                true
            }
            _ => false,
        }
    }

    /// Signal pause for an Active session. The orchestrator records the
    /// current batch when it observes the flag, so a later `begin` resumes
    /// exactly there.
    pub fn request_pause(&self, slug: &str) -> bool {
        let sessions = self.lock();
        match sessions.get(slug) {
            Some(session) if session.status == FetchStatus::Active => {
                session.signals.request_pause();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_current_batch(&self, slug: &str, batch: usize) {
        let mut sessions = self.lock();
        if let Some(session) = sessions.get_mut(slug) {
            session.current_batch = batch;
        }
    }

    pub(crate) fn finalize(&self, slug: &str, status: FetchStatus) {
        let mut sessions = self.lock();
        if let Some(session) = sessions.get_mut(slug) {
            session.status = status;
        }
    }
}
