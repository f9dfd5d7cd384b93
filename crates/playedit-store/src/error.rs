//! Error types shared by catalog stores and the reconciliation engine.
//!
//! Every failure aborts the current reconciliation step and is propagated
//! unchanged to the caller. Nothing here is retried.

use std::fmt;
use std::time::Duration;

/// Errors that can occur while talking to a catalog store or reconciling
/// against it.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The remote call failed at the network or protocol layer.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The store answered with a structured rejection.
    #[error("Rejected by store (HTTP {status}): {message}")]
    Rejected {
        /// Status code reported by the store.
        status: u16,
        /// Message reported by the store.
        message: String,
    },

    /// The edit, listing or image does not exist on the store.
    #[error("Not found: {what}")]
    NotFound {
        /// What was looked up.
        what: String,
    },

    /// The image source is not one of the accepted media types.
    #[error("Unacceptable image media type '{media_type}'")]
    InvalidContentType {
        /// The detected media type.
        media_type: String,
    },

    /// Reading, hashing or rewinding an image source failed.
    #[error("Content error ({context}): {source}")]
    Content {
        /// What was being done with the source.
        context: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The image producer did not hand over the next item in time.
    #[error("Image producer for {locale}/{image_type} stalled for {waited:?}")]
    ProducerStalled {
        /// Locale of the bucket being reconciled.
        locale: String,
        /// Image type of the bucket being reconciled.
        image_type: String,
        /// How long the consumer waited.
        waited: Duration,
    },

    /// The image producer reported a failure.
    #[error("Image producer failed: {message}")]
    Producer {
        /// Description of the producer failure.
        message: String,
    },
}

impl SyncError {
    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a new `Rejected` error.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Creates a new `InvalidContentType` error.
    #[must_use]
    pub fn invalid_content_type(media_type: impl Into<String>) -> Self {
        Self::InvalidContentType {
            media_type: media_type.into(),
        }
    }

    /// Creates a new `Content` error.
    #[must_use]
    pub fn content(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Content {
            context: context.into(),
            source,
        }
    }

    /// Creates a new `Producer` error.
    #[must_use]
    pub fn producer(message: impl Into<String>) -> Self {
        Self::Producer {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the image source was rejected for its media type.
    #[must_use]
    pub fn is_invalid_content_type(&self) -> bool {
        matches!(self, Self::InvalidContentType { .. })
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::Rejected { .. } | Self::NotFound { .. } => ErrorCategory::Rejection,
            Self::InvalidContentType { .. } | Self::Content { .. } => ErrorCategory::Content,
            Self::ProducerStalled { .. } | Self::Producer { .. } => ErrorCategory::Producer,
        }
    }
}

/// Categories of sync errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network or protocol failure.
    Transport,
    /// The store refused the request.
    Rejection,
    /// The local image content could not be used.
    Content,
    /// The desired image sequence could not be drawn.
    Producer,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Rejection => write!(f, "rejection"),
            Self::Content => write!(f, "content"),
            Self::Producer => write!(f, "producer"),
        }
    }
}
