//! The catalog store contract consumed by the reconciliation engine.

use async_trait::async_trait;

use crate::error::SyncError;
use crate::source::ImageSource;
use crate::types::{ImageType, Listing, Locale, RemoteImage};

/// Listing and image operations of one edit on the application store.
///
/// Implementations are bound to a single edit (package + edit id). They are
/// not expected to tolerate concurrent mutation of the same
/// (locale, image type) bucket; callers keep at most one mutation sequence
/// in flight per bucket.
///
/// # Example
///
/// ```ignore
/// use playedit_store::{CatalogStore, ImageType, Locale};
///
/// async fn count_screenshots(store: &dyn CatalogStore, locale: &Locale) -> usize {
///     store
///         .list_images(locale, ImageType::PhoneScreenshots)
///         .await
///         .map(|images| images.len())
///         .unwrap_or(0)
/// }
/// ```
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Creates or replaces the listing for `listing.language`.
    async fn update_listing(&self, listing: &Listing) -> Result<Listing, SyncError>;

    /// Returns every listing of the edit.
    async fn list_listings(&self) -> Result<Vec<Listing>, SyncError>;

    /// Deletes the listing of a locale, together with its images.
    async fn delete_listing(&self, locale: &Locale) -> Result<(), SyncError>;

    /// Returns the images of one bucket in store order.
    async fn list_images(
        &self,
        locale: &Locale,
        image_type: ImageType,
    ) -> Result<Vec<RemoteImage>, SyncError>;

    /// Appends an image to one bucket.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidContentType` without contacting the store
    /// when the source is neither PNG nor JPEG.
    async fn upload_image(
        &self,
        locale: &Locale,
        image_type: ImageType,
        source: &mut ImageSource,
    ) -> Result<RemoteImage, SyncError>;

    /// Deletes one image from one bucket.
    async fn delete_image(
        &self,
        locale: &Locale,
        image_type: ImageType,
        image_id: &str,
    ) -> Result<(), SyncError>;

    /// Name of this backend for logging.
    fn backend_name(&self) -> &'static str;
}
