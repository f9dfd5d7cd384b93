//! DryRunStore - a store wrapper that reads through and only logs mutations.
//!
//! Reads are delegated to the inner store so the reconciliation engine sees
//! the real remote state; updates, uploads and deletes are reported through
//! `tracing` and answered locally.
//!
//! # Example
//!
//! ```ignore
//! use playedit_store::DryRunStore;
//!
//! let store = DryRunStore::new(edit_store);
//! // Lists the real images, uploads nothing.
//! playedit_sync::reconcile(&store, &options, listings).await?;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;

use crate::error::SyncError;
use crate::source::{ImageSource, ensure_accepted_media_type, fingerprint};
use crate::traits::CatalogStore;
use crate::types::{ImageType, Listing, Locale, RemoteImage};

/// A store wrapper that never mutates the inner store.
pub struct DryRunStore<S: CatalogStore> {
    inner: S,
    uploads: AtomicU64,
}

impl<S: CatalogStore> DryRunStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            uploads: AtomicU64::new(0),
        }
    }

    /// Get a reference to the inner store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: CatalogStore> CatalogStore for DryRunStore<S> {
    async fn update_listing(&self, listing: &Listing) -> Result<Listing, SyncError> {
        info!(locale = %listing.language, "[dry-run] would update listing");
        Ok(listing.clone())
    }

    async fn list_listings(&self) -> Result<Vec<Listing>, SyncError> {
        self.inner.list_listings().await
    }

    async fn delete_listing(&self, locale: &Locale) -> Result<(), SyncError> {
        info!(locale = %locale, "[dry-run] would delete listing");
        Ok(())
    }

    async fn list_images(
        &self,
        locale: &Locale,
        image_type: ImageType,
    ) -> Result<Vec<RemoteImage>, SyncError> {
        self.inner.list_images(locale, image_type).await
    }

    async fn upload_image(
        &self,
        locale: &Locale,
        image_type: ImageType,
        source: &mut ImageSource,
    ) -> Result<RemoteImage, SyncError> {
        // Same validation a real upload performs before any network call.
        ensure_accepted_media_type(source)?;
        let sha1 = fingerprint(source)?;
        let n = self.uploads.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            locale = %locale,
            image_type = %image_type,
            name = source.name(),
            "[dry-run] would upload image"
        );
        Ok(RemoteImage::new(format!("dry-run-{n}"), sha1))
    }

    async fn delete_image(
        &self,
        locale: &Locale,
        image_type: ImageType,
        image_id: &str,
    ) -> Result<(), SyncError> {
        info!(
            locale = %locale,
            image_type = %image_type,
            image_id = %image_id,
            "[dry-run] would delete image"
        );
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
