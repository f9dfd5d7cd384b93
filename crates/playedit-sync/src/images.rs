//! Ordered diff of one desired image sequence against one remote bucket.
//!
//! The remote list is consumed front to back through a single cursor. For
//! each desired image, remote images are scanned from the cursor: the first
//! one with the same fingerprint is kept, every image passed over on the way
//! is deleted. Once the remote list is exhausted, desired images are
//! uploaded. Nothing is ever reordered, so moving an unchanged image costs a
//! delete and a re-upload.

use playedit_store::{ImageSource, ImageType, Locale, RemoteImage, SyncError};
use tracing::{debug, info};

use crate::Reconciler;
use crate::report::{BucketReport, ImageAction};
use crate::sequence::ImageSequence;

impl Reconciler<'_> {
    /// Reconciles one (locale, image type) bucket.
    ///
    /// Remote images the scan never reaches are left alone unless
    /// `prune_trailing_images` is set. Any failure aborts immediately;
    /// mutations already issued are not rolled back.
    pub async fn reconcile_images(
        &self,
        locale: &Locale,
        image_type: ImageType,
        mut desired: ImageSequence,
    ) -> Result<BucketReport, SyncError> {
        let remote = self.store.list_images(locale, image_type).await?;
        debug!(
            locale = %locale,
            image_type = %image_type,
            remote = remote.len(),
            "Reconciling images"
        );

        let mut report = BucketReport::new(locale.clone(), image_type);
        let mut cursor = 0;

        while let Some(mut item) = self.next_desired(locale, image_type, &mut desired).await? {
            let sha1 = item.fingerprint()?;

            if let Some(kept) = self
                .seek_match(locale, image_type, &remote, &mut cursor, &sha1, &mut report)
                .await?
            {
                debug!(name = item.name(), id = %kept.id, "Image already present");
                report.actions.push(ImageAction::Keep {
                    id: kept.id.clone(),
                });
                continue;
            }

            let uploaded = self
                .store
                .upload_image(locale, image_type, &mut item)
                .await?;
            info!(
                locale = %locale,
                image_type = %image_type,
                name = item.name(),
                id = %uploaded.id,
                "Uploaded image"
            );
            report.actions.push(ImageAction::Upload {
                name: item.name().to_string(),
                id: uploaded.id,
            });
        }

        if self.options.prune_trailing_images {
            for image in &remote[cursor..] {
                self.delete(locale, image_type, image, &mut report).await?;
            }
        }

        Ok(report)
    }

    /// Scans from `cursor` for an image with fingerprint `sha1`, deleting
    /// every mismatch passed over. Returns the match, or `None` once the
    /// remote list is exhausted.
    async fn seek_match<'r>(
        &self,
        locale: &Locale,
        image_type: ImageType,
        remote: &'r [RemoteImage],
        cursor: &mut usize,
        sha1: &str,
        report: &mut BucketReport,
    ) -> Result<Option<&'r RemoteImage>, SyncError> {
        while let Some(image) = remote.get(*cursor) {
            *cursor += 1;
            if image.fingerprint.eq_ignore_ascii_case(sha1) {
                return Ok(Some(image));
            }
            self.delete(locale, image_type, image, report).await?;
        }
        Ok(None)
    }

    async fn delete(
        &self,
        locale: &Locale,
        image_type: ImageType,
        image: &RemoteImage,
        report: &mut BucketReport,
    ) -> Result<(), SyncError> {
        self.store
            .delete_image(locale, image_type, &image.id)
            .await?;
        info!(
            locale = %locale,
            image_type = %image_type,
            id = %image.id,
            "Deleted image"
        );
        report.actions.push(ImageAction::Delete {
            id: image.id.clone(),
        });
        Ok(())
    }

    async fn next_desired(
        &self,
        locale: &Locale,
        image_type: ImageType,
        desired: &mut ImageSequence,
    ) -> Result<Option<ImageSource>, SyncError> {
        let Some(limit) = self.options.handoff_timeout else {
            return desired.next().await;
        };
        tokio::time::timeout(limit, desired.next())
            .await
            .map_err(|_| SyncError::ProducerStalled {
                locale: locale.to_string(),
                image_type: image_type.to_string(),
                waited: limit,
            })?
    }
}
