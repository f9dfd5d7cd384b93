//! Lazily produced, single-pass image sequences.
//!
//! A producer (typically a directory scanner running in its own task) hands
//! images to the reconciler through a channel with room for exactly one
//! item, so it can never run more than one image ahead of the consumer.
//! Dropping every [`ImageSender`] ends the sequence.
//!
//! [`ImageSequence::deferred`] postpones starting the producer until the
//! reconciler first draws from the sequence, so only the bucket being
//! reconciled holds producer resources.

use std::collections::VecDeque;
use std::mem;

use playedit_store::{ImageSource, SyncError};
use tokio::sync::mpsc;

type Item = Result<ImageSource, SyncError>;

/// Returned by [`ImageSender`] once the consuming side has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("image sequence consumer is gone")]
pub struct SequenceClosed;

/// Producer half of an image handoff.
#[derive(Debug, Clone)]
pub struct ImageSender {
    tx: mpsc::Sender<Item>,
}

impl ImageSender {
    /// Hands over the next image, waiting until the slot is free.
    pub async fn send(&self, source: ImageSource) -> Result<(), SequenceClosed> {
        self.tx.send(Ok(source)).await.map_err(|_| SequenceClosed)
    }

    /// Reports a production failure; the consumer aborts with `error`.
    pub async fn fail(&self, error: SyncError) -> Result<(), SequenceClosed> {
        self.tx.send(Err(error)).await.map_err(|_| SequenceClosed)
    }

    /// Returns `true` once the consumer has dropped its sequence.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

type Start = Box<dyn FnOnce() -> ImageSequence + Send>;

enum Inner {
    Channel(mpsc::Receiver<Item>),
    Ready(VecDeque<ImageSource>),
    Deferred(Start),
}

/// Ordered desired images of one bucket, each yielded exactly once.
pub struct ImageSequence {
    inner: Inner,
}

/// Creates a handoff with a single-item slot.
pub fn image_channel() -> (ImageSender, ImageSequence) {
    let (tx, rx) = mpsc::channel(1);
    (
        ImageSender { tx },
        ImageSequence {
            inner: Inner::Channel(rx),
        },
    )
}

impl ImageSequence {
    /// A sequence over images that are already at hand.
    pub fn from_sources(sources: impl IntoIterator<Item = ImageSource>) -> Self {
        Self {
            inner: Inner::Ready(sources.into_iter().collect()),
        }
    }

    /// A sequence with no images.
    pub fn empty() -> Self {
        Self::from_sources([])
    }

    /// A sequence built by `start` on the first call to [`next`](Self::next).
    ///
    /// Dropping the sequence unstarted never calls `start`.
    pub fn deferred(start: impl FnOnce() -> ImageSequence + Send + 'static) -> Self {
        Self {
            inner: Inner::Deferred(Box::new(start)),
        }
    }

    /// Returns `true` while a deferred sequence has not been started.
    pub fn is_deferred(&self) -> bool {
        matches!(self.inner, Inner::Deferred(_))
    }

    fn start(&mut self) {
        while self.is_deferred() {
            let inner = mem::replace(&mut self.inner, Inner::Ready(VecDeque::new()));
            if let Inner::Deferred(start) = inner {
                self.inner = start().inner;
            }
        }
    }

    /// Draws the next image.
    ///
    /// Waits for the producer when the slot is empty. Returns `Ok(None)` once
    /// every sender is dropped, and the producer's error if it reported one.
    /// Cancel safe: dropping the future loses no item.
    pub async fn next(&mut self) -> Result<Option<ImageSource>, SyncError> {
        self.start();
        match &mut self.inner {
            Inner::Channel(rx) => rx.recv().await.transpose(),
            Inner::Ready(queue) => Ok(queue.pop_front()),
            // start() leaves no deferred sequence behind
            Inner::Deferred(_) => Ok(None),
        }
    }
}

impl std::fmt::Debug for ImageSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            Inner::Channel(_) => f.write_str("ImageSequence::Channel"),
            Inner::Ready(queue) => write!(f, "ImageSequence::Ready({} left)", queue.len()),
            Inner::Deferred(_) => f.write_str("ImageSequence::Deferred"),
        }
    }
}
