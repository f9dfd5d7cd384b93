use std::collections::HashSet;

use playedit_store::{Locale, SyncError};
use tracing::{info, warn};

use crate::report::SyncReport;
use crate::{ListingWithImages, Reconciler};

impl Reconciler<'_> {
    /// Drives the store toward `desired`.
    ///
    /// With `prune_stale_locales`, remote listings whose locale is not
    /// desired are deleted first, before any upsert starts. Listings are then
    /// upserted one after another; the first failure aborts the run.
    pub async fn reconcile(
        &self,
        desired: Vec<ListingWithImages>,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();

        if self.options.prune_stale_locales {
            let target: HashSet<&Locale> = desired.iter().map(|d| &d.listing.language).collect();
            report.deleted_locales = self.delete_stale_locales(&target).await?;
        }

        for listing in desired {
            report.listings.push(self.upsert_listing(listing).await?);
        }

        info!(
            backend = self.store.backend_name(),
            listings = report.listings.len(),
            deleted_locales = report.deleted_locales.len(),
            uploaded = report.total_uploaded(),
            deleted_images = report.total_deleted(),
            "Reconciliation finished"
        );
        Ok(report)
    }

    async fn delete_stale_locales(
        &self,
        target: &HashSet<&Locale>,
    ) -> Result<Vec<Locale>, SyncError> {
        let remote = self.store.list_listings().await?;
        let mut deleted = Vec::new();
        for listing in remote {
            if target.contains(&listing.language) {
                continue;
            }
            self.store.delete_listing(&listing.language).await?;
            warn!(locale = %listing.language, "Deleted stale listing");
            deleted.push(listing.language);
        }
        Ok(deleted)
    }
}
