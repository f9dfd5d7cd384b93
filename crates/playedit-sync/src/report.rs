//! What a reconciliation run actually did.

use playedit_store::{ImageType, Locale};

/// One step applied to a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageAction {
    /// The remote image already matched the desired one.
    Keep { id: String },
    Delete { id: String },
    /// `name` is the local source, `id` the image created by the store.
    Upload { name: String, id: String },
}

/// Actions applied to one (locale, image type) bucket, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketReport {
    pub locale: Locale,
    pub image_type: ImageType,
    pub actions: Vec<ImageAction>,
}

impl BucketReport {
    pub fn new(locale: Locale, image_type: ImageType) -> Self {
        Self {
            locale,
            image_type,
            actions: Vec::new(),
        }
    }

    pub fn kept(&self) -> usize {
        self.count(|a| matches!(a, ImageAction::Keep { .. }))
    }

    pub fn deleted(&self) -> usize {
        self.count(|a| matches!(a, ImageAction::Delete { .. }))
    }

    pub fn uploaded(&self) -> usize {
        self.count(|a| matches!(a, ImageAction::Upload { .. }))
    }

    /// `true` when nothing on the store changed.
    pub fn is_unchanged(&self) -> bool {
        self.deleted() == 0 && self.uploaded() == 0
    }

    fn count(&self, pred: impl Fn(&ImageAction) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(a)).count()
    }
}

/// Result of upserting one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingReport {
    pub locale: Locale,
    pub buckets: Vec<BucketReport>,
}

/// Result of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Stale locales removed before any upsert.
    pub deleted_locales: Vec<Locale>,
    pub listings: Vec<ListingReport>,
}

impl SyncReport {
    pub fn buckets(&self) -> impl Iterator<Item = &BucketReport> {
        self.listings.iter().flat_map(|l| l.buckets.iter())
    }

    pub fn total_uploaded(&self) -> usize {
        self.buckets().map(BucketReport::uploaded).sum()
    }

    pub fn total_deleted(&self) -> usize {
        self.buckets().map(BucketReport::deleted).sum()
    }

    pub fn total_kept(&self) -> usize {
        self.buckets().map(BucketReport::kept).sum()
    }
}
