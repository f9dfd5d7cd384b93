//! # playedit-store
//!
//! Catalog store abstraction for playedit.
//!
//! This crate defines the listing and image types of an application store
//! edit, the [`CatalogStore`] trait the reconciliation engine drives, and the
//! content helpers (fingerprints, media type sniffing) both sides rely on.
//!
//! ## Backends
//!
//! - [`MemoryStore`]: everything in process memory, with a mutation log.
//! - [`DryRunStore`]: wraps another store, reads through, logs mutations.
//! - `playedit_client::EditStore`: the REST API (separate crate).

pub mod dry_run;
mod error;
pub mod memory;
pub mod source;
mod traits;
mod types;

pub use dry_run::DryRunStore;
pub use error::{ErrorCategory, SyncError};
pub use memory::{FailOn, MemoryStore, Mutation};
pub use source::{
    ACCEPTED_MEDIA_TYPES, ImageSource, ReadSeek, ensure_accepted_media_type, fingerprint,
    sniff_media_type,
};
pub use traits::CatalogStore;
pub use types::{Edit, ImageType, Listing, Locale, RemoteImage, UnknownImageType};

/// Type alias for a sync result.
pub type SyncResult<T> = Result<T, SyncError>;

/// Type alias for a shareable store trait object.
pub type DynStore = std::sync::Arc<dyn CatalogStore>;
