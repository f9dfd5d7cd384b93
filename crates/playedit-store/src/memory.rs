//! In-memory catalog store.
//!
//! Keeps listings and image buckets in process memory and records every
//! mutation in order, which makes it the backend of choice for exercising
//! the reconciliation engine without a network.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::error::SyncError;
use crate::source::{ImageSource, ensure_accepted_media_type, fingerprint};
use crate::traits::CatalogStore;
use crate::types::{ImageType, Listing, Locale, RemoteImage};

/// A mutation applied to a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    UpdateListing(Locale),
    DeleteListing(Locale),
    UploadImage {
        locale: Locale,
        image_type: ImageType,
        fingerprint: String,
    },
    DeleteImage {
        locale: Locale,
        image_type: ImageType,
        image_id: String,
    },
}

/// An operation a [`MemoryStore`] should fail with a transport error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailOn {
    UpdateListing(Locale),
    ListListings,
    DeleteListing(Locale),
    ListImages(Locale, ImageType),
    /// Upload of an image with this fingerprint.
    UploadImage(String),
    DeleteImage(String),
}

#[derive(Default)]
struct State {
    listings: BTreeMap<Locale, Listing>,
    images: HashMap<(Locale, ImageType), Vec<RemoteImage>>,
    mutations: Vec<Mutation>,
    failures: Vec<FailOn>,
    next_id: u64,
}

impl State {
    fn check(&self, op: &FailOn) -> Result<(), SyncError> {
        if self.failures.contains(op) {
            return Err(SyncError::transport(format!("injected failure: {op:?}")));
        }
        Ok(())
    }
}

/// Catalog store held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a listing without recording a mutation.
    pub fn seed_listing(&self, listing: Listing) {
        self.state()
            .listings
            .insert(listing.language.clone(), listing);
    }

    /// Replaces a bucket's images without recording a mutation.
    pub fn seed_images(&self, locale: &Locale, image_type: ImageType, images: Vec<RemoteImage>) {
        self.state()
            .images
            .insert((locale.clone(), image_type), images);
    }

    /// Makes the given operation fail from now on.
    pub fn fail_on(&self, op: FailOn) {
        self.state().failures.push(op);
    }

    /// Mutations applied so far, in order.
    pub fn mutations(&self) -> Vec<Mutation> {
        self.state().mutations.clone()
    }

    /// Forgets the recorded mutations.
    pub fn clear_mutations(&self) {
        self.state().mutations.clear();
    }

    /// Current listing of a locale.
    pub fn listing(&self, locale: &Locale) -> Option<Listing> {
        self.state().listings.get(locale).cloned()
    }

    /// Current images of a bucket.
    pub fn images(&self, locale: &Locale, image_type: ImageType) -> Vec<RemoteImage> {
        self.state()
            .images
            .get(&(locale.clone(), image_type))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn update_listing(&self, listing: &Listing) -> Result<Listing, SyncError> {
        let mut state = self.state();
        state.check(&FailOn::UpdateListing(listing.language.clone()))?;
        state
            .listings
            .insert(listing.language.clone(), listing.clone());
        state
            .mutations
            .push(Mutation::UpdateListing(listing.language.clone()));
        Ok(listing.clone())
    }

    async fn list_listings(&self) -> Result<Vec<Listing>, SyncError> {
        let state = self.state();
        state.check(&FailOn::ListListings)?;
        Ok(state.listings.values().cloned().collect())
    }

    async fn delete_listing(&self, locale: &Locale) -> Result<(), SyncError> {
        let mut state = self.state();
        state.check(&FailOn::DeleteListing(locale.clone()))?;
        if state.listings.remove(locale).is_none() {
            return Err(SyncError::not_found(format!("listing {locale}")));
        }
        state.images.retain(|(l, _), _| l != locale);
        state.mutations.push(Mutation::DeleteListing(locale.clone()));
        Ok(())
    }

    async fn list_images(
        &self,
        locale: &Locale,
        image_type: ImageType,
    ) -> Result<Vec<RemoteImage>, SyncError> {
        let state = self.state();
        state.check(&FailOn::ListImages(locale.clone(), image_type))?;
        Ok(state
            .images
            .get(&(locale.clone(), image_type))
            .cloned()
            .unwrap_or_default())
    }

    async fn upload_image(
        &self,
        locale: &Locale,
        image_type: ImageType,
        source: &mut ImageSource,
    ) -> Result<RemoteImage, SyncError> {
        ensure_accepted_media_type(source)?;
        let sha1 = fingerprint(source)?;

        let mut state = self.state();
        state.check(&FailOn::UploadImage(sha1.clone()))?;
        state.next_id += 1;
        let id = format!("mem-{}", state.next_id);
        let image = RemoteImage {
            url: format!("memory://{locale}/{image_type}/{id}"),
            id,
            fingerprint: sha1.clone(),
        };
        debug!(name = source.name(), id = %image.id, "Stored image in memory");
        state
            .images
            .entry((locale.clone(), image_type))
            .or_default()
            .push(image.clone());
        state.mutations.push(Mutation::UploadImage {
            locale: locale.clone(),
            image_type,
            fingerprint: sha1,
        });
        Ok(image)
    }

    async fn delete_image(
        &self,
        locale: &Locale,
        image_type: ImageType,
        image_id: &str,
    ) -> Result<(), SyncError> {
        let mut state = self.state();
        state.check(&FailOn::DeleteImage(image_id.to_string()))?;
        let bucket = state
            .images
            .get_mut(&(locale.clone(), image_type))
            .ok_or_else(|| SyncError::not_found(format!("image {image_id}")))?;
        let position = bucket
            .iter()
            .position(|image| image.id == image_id)
            .ok_or_else(|| SyncError::not_found(format!("image {image_id}")))?;
        bucket.remove(position);
        state.mutations.push(Mutation::DeleteImage {
            locale: locale.clone(),
            image_type,
            image_id: image_id.to_string(),
        });
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[tokio::test]
    async fn test_upload_appends_and_records() {
        let store = MemoryStore::new();
        let en = Locale::new("en-US");
        let mut source = ImageSource::from_bytes("one.png", [PNG_MAGIC, b"one"].concat());

        let image = store
            .upload_image(&en, ImageType::Icon, &mut source)
            .await
            .unwrap();

        assert_eq!(store.images(&en, ImageType::Icon), vec![image.clone()]);
        assert_eq!(
            store.mutations(),
            vec![Mutation::UploadImage {
                locale: en,
                image_type: ImageType::Icon,
                fingerprint: image.fingerprint,
            }]
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image() {
        let store = MemoryStore::new();
        let en = Locale::new("en-US");
        let mut source = ImageSource::from_bytes("notes.txt", b"plain text".to_vec());

        let err = store
            .upload_image(&en, ImageType::Icon, &mut source)
            .await
            .unwrap_err();

        assert!(err.is_invalid_content_type());
        assert!(store.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_delete_listing_drops_its_images() {
        let store = MemoryStore::new();
        let fr = Locale::new("fr-FR");
        store.seed_listing(Listing::new(fr.clone()));
        store.seed_images(
            &fr,
            ImageType::PhoneScreenshots,
            vec![RemoteImage::new("a", "00")],
        );

        store.delete_listing(&fr).await.unwrap();

        assert!(store.listing(&fr).is_none());
        assert!(store.images(&fr, ImageType::PhoneScreenshots).is_empty());
        assert!(store.delete_listing(&fr).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = MemoryStore::new();
        store.fail_on(FailOn::ListListings);
        let err = store.list_listings().await.unwrap_err();
        assert!(matches!(err, SyncError::Transport { .. }));
    }
}
