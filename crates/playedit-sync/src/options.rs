use std::time::Duration;

/// Knobs of one reconciliation run, built once by the caller.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Delete remote listings whose locale is not in the desired set.
    pub prune_stale_locales: bool,
    /// After a bucket's desired sequence is exhausted, also delete the
    /// remote images the scan never reached. Off by default: those images
    /// are left in place.
    pub prune_trailing_images: bool,
    /// Upper bound on waiting for the producer to hand over the next image.
    /// `None` waits indefinitely; a zero duration is never stored here.
    pub handoff_timeout: Option<Duration>,
}

impl SyncOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prune_stale_locales(mut self, prune: bool) -> Self {
        self.prune_stale_locales = prune;
        self
    }

    pub fn with_prune_trailing_images(mut self, prune: bool) -> Self {
        self.prune_trailing_images = prune;
        self
    }

    /// Bounds each handoff wait. `None` and a zero duration both wait
    /// indefinitely.
    pub fn with_handoff_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.handoff_timeout = timeout.into().filter(|t| !t.is_zero());
        self
    }
}
