use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancel/pause flags for one fetch session.
///
/// Cancellation and pause are advisory and cooperative: the orchestrator
/// polls these flags before each symbol and at batch boundaries, so a
/// request takes effect at the next checked suspension point, not
/// instantaneously. Clones share the same underlying flags.
#[derive(Clone, Debug, Default)]
pub struct FetchSignals {
    inner: Arc<Flags>,
}

#[derive(Debug, Default)]
struct Flags {
    cancel: AtomicBool,
    pause: AtomicBool,
}

impl FetchSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_cancel(&self) {
        self.inner.cancel.store(true, Ordering::Relaxed);
    }

    pub fn request_pause(&self) {
        self.inner.pause.store(true, Ordering::Relaxed);
    }

    /// Reset the pause flag so a resumed session runs again.
    pub fn clear_pause(&self) {
        self.inner.pause.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel.load(Ordering::Relaxed)
    }

    pub fn is_paused(&self) -> bool {
        self.inner.pause.load(Ordering::Relaxed)
    }
}
