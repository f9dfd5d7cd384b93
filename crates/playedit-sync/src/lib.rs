//! # playedit-sync
//!
//! Reconciliation engine that drives an application store edit toward a
//! locally declared set of listings and images.
//!
//! ## Overview
//!
//! The engine is layered, leaves first:
//!
//! - [`Reconciler::reconcile_images`] diffs one desired image sequence
//!   against one remote bucket, keeping images whose fingerprint matches in
//!   order, deleting the ones the scan passes over and uploading the rest.
//! - [`Reconciler::upsert_listing`] updates a listing's text, then
//!   reconciles each of its image types.
//! - [`Reconciler::reconcile`] optionally deletes stale locales, then upserts
//!   every desired listing.
//!
//! All remote state is fetched fresh at the start of each step, so a run
//! that failed half way can simply be repeated.
//!
//! ## Example
//!
//! ```ignore
//! use playedit_store::{ImageType, Listing, MemoryStore};
//! use playedit_sync::{ImageSequence, ListingWithImages, SyncOptions, reconcile};
//!
//! let store = MemoryStore::new();
//! let desired = vec![
//!     ListingWithImages::new(Listing::new("en-US").with_title("Hello"))
//!         .with_images(ImageType::PhoneScreenshots, ImageSequence::from_sources(shots)),
//! ];
//! let report = reconcile(&store, &SyncOptions::new(), desired).await?;
//! println!("uploaded {} images", report.total_uploaded());
//! ```

use std::collections::BTreeMap;

use playedit_store::{CatalogStore, ImageType, Listing, SyncError};

mod images;
mod locales;
mod options;
mod report;
pub mod sequence;
mod upsert;

#[cfg(test)]
mod testing;

pub use options::SyncOptions;
pub use playedit_store::fingerprint;
pub use report::{BucketReport, ImageAction, ListingReport, SyncReport};
pub use sequence::{ImageSender, ImageSequence, SequenceClosed, image_channel};

/// A desired listing with the image sequences to reconcile for it.
#[derive(Debug)]
pub struct ListingWithImages {
    pub listing: Listing,
    /// Processed in `ImageType` order.
    pub images: BTreeMap<ImageType, ImageSequence>,
}

impl ListingWithImages {
    pub fn new(listing: Listing) -> Self {
        Self {
            listing,
            images: BTreeMap::new(),
        }
    }

    pub fn with_images(mut self, image_type: ImageType, sequence: ImageSequence) -> Self {
        self.images.insert(image_type, sequence);
        self
    }
}

/// Runs reconciliations against one store with one set of options.
pub struct Reconciler<'a> {
    store: &'a dyn CatalogStore,
    options: &'a SyncOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn CatalogStore, options: &'a SyncOptions) -> Self {
        Self { store, options }
    }
}

/// Reconciles the whole desired state; the first error aborts the run.
pub async fn reconcile(
    store: &dyn CatalogStore,
    options: &SyncOptions,
    desired: Vec<ListingWithImages>,
) -> Result<SyncReport, SyncError> {
    Reconciler::new(store, options).reconcile(desired).await
}
