use playedit_store::SyncError;
use tracing::info;

use crate::report::ListingReport;
use crate::{ListingWithImages, Reconciler};

impl Reconciler<'_> {
    /// Updates one listing's text, then reconciles each of its image types.
    ///
    /// The text update always comes first. The first failing image type
    /// aborts the upsert; image types already reconciled keep their changes.
    pub async fn upsert_listing(
        &self,
        desired: ListingWithImages,
    ) -> Result<ListingReport, SyncError> {
        let ListingWithImages { listing, images } = desired;
        let locale = listing.language.clone();

        self.store.update_listing(&listing).await?;
        info!(locale = %locale, "Updated listing");

        let mut buckets = Vec::with_capacity(images.len());
        for (image_type, sequence) in images {
            let bucket = self.reconcile_images(&locale, image_type, sequence).await?;
            info!(
                locale = %locale,
                image_type = %image_type,
                kept = bucket.kept(),
                deleted = bucket.deleted(),
                uploaded = bucket.uploaded(),
                "Images reconciled"
            );
            buckets.push(bucket);
        }

        Ok(ListingReport { locale, buckets })
    }
}
