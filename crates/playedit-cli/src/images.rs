//! Local image discovery and the tasks that feed images to the reconciler.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use playedit_store::{ImageSource, ImageType, Listing, Locale};
use playedit_sync::{ImageSequence, ListingWithImages, image_channel};
use tracing::debug;

/// Files directly under `root/<locale>/`, sorted by path.
///
/// A missing locale directory yields no images.
pub fn find_images(root: &Path, locale: &Locale) -> Result<Vec<PathBuf>> {
    let dir = root.join(locale.as_str());
    let pattern = format!(
        "{}/*",
        glob::Pattern::escape(&dir.to_string_lossy())
    );

    let mut paths = Vec::new();
    for entry in glob::glob(&pattern).with_context(|| format!("Invalid image path {}", dir.display()))? {
        let path = entry.with_context(|| format!("Unable to read {}", dir.display()))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    debug!(locale = %locale, dir = %dir.display(), count = paths.len(), "Found images");
    Ok(paths)
}

/// Starts a task that opens `paths` in order and hands each over through a
/// single-slot channel.
///
/// The task stops at the first file it cannot open, after handing the error
/// to the consumer, or as soon as the consumer drops the sequence.
pub fn spawn_producer(paths: Vec<PathBuf>) -> ImageSequence {
    let (tx, sequence) = image_channel();
    tokio::spawn(async move {
        for path in paths {
            let sent = match ImageSource::open(&path) {
                Ok(source) => tx.send(source).await,
                Err(e) => {
                    let _ = tx.fail(e).await;
                    return;
                }
            };
            if sent.is_err() {
                debug!(path = %path.display(), "Image consumer gone, stopping producer");
                return;
            }
        }
    });
    sequence
}

/// Pairs each listing with a deferred producer per configured image root.
///
/// Image files are discovered up front, but a bucket's producer only starts
/// (and opens files) once the reconciler reaches that bucket.
pub fn desired_state(
    listings: Vec<Listing>,
    roots: &BTreeMap<ImageType, PathBuf>,
) -> Result<Vec<ListingWithImages>> {
    let mut desired = Vec::with_capacity(listings.len());
    for listing in listings {
        let mut entry = ListingWithImages::new(listing);
        for (image_type, root) in roots {
            let paths = find_images(root, &entry.listing.language)?;
            entry = entry.with_images(
                *image_type,
                ImageSequence::deferred(move || spawn_producer(paths)),
            );
        }
        desired.push(entry);
    }
    Ok(desired)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use playedit_store::SyncError;

    use super::*;

    #[test]
    fn test_find_images_sorted_and_scoped() {
        let dir = tempfile::tempdir().unwrap();
        let en = dir.path().join("en-US");
        fs::create_dir_all(en.join("nested")).unwrap();
        fs::write(en.join("02.png"), b"b").unwrap();
        fs::write(en.join("01.png"), b"a").unwrap();
        fs::create_dir_all(dir.path().join("de-DE")).unwrap();
        fs::write(dir.path().join("de-DE/01.png"), b"x").unwrap();

        let found = find_images(dir.path(), &Locale::new("en-US")).unwrap();
        assert_eq!(found, vec![en.join("01.png"), en.join("02.png")]);
    }

    #[test]
    fn test_find_images_missing_locale() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_images(dir.path(), &Locale::new("fr-FR")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_producer_yields_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let mut seq = spawn_producer(vec![a.clone(), b.clone()]);
        let first = seq.next().await.unwrap().unwrap();
        assert_eq!(first.name(), a.display().to_string());
        let second = seq.next().await.unwrap().unwrap();
        assert_eq!(second.name(), b.display().to_string());
        assert!(seq.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_producer_reports_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ok = dir.path().join("ok.png");
        fs::write(&ok, b"ok").unwrap();

        let mut seq = spawn_producer(vec![ok, dir.path().join("missing.png")]);
        assert!(seq.next().await.unwrap().is_some());
        let err = seq.next().await.unwrap_err();
        assert!(matches!(err, SyncError::Content { .. }));
    }

    #[tokio::test]
    async fn test_desired_state_opens_no_files_before_reconciling() {
        let dir = tempfile::tempdir().unwrap();
        let shots = dir.path().join("shots");
        let mut listings = Vec::new();
        for i in 0..50 {
            let tag = format!("l{i:02}");
            fs::create_dir_all(shots.join(&tag)).unwrap();
            for n in 0..3 {
                fs::write(shots.join(&tag).join(format!("{n}.png")), b"x").unwrap();
            }
            listings.push(Listing::new(tag));
        }
        let roots = BTreeMap::from([(ImageType::PhoneScreenshots, shots.clone())]);

        let mut desired = desired_state(listings, &roots).unwrap();
        // Give any eagerly started producer the chance to open its files.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(
            desired
                .iter()
                .all(|d| d.images[&ImageType::PhoneScreenshots].is_deferred())
        );

        // Files removed now are only missed by a producer that starts later.
        fs::remove_dir_all(&shots).unwrap();
        let seq = desired[0]
            .images
            .get_mut(&ImageType::PhoneScreenshots)
            .unwrap();
        let err = seq.next().await.unwrap_err();
        assert!(matches!(err, SyncError::Content { .. }));
    }

    #[tokio::test]
    async fn test_desired_state_without_roots_has_no_images() {
        let desired = desired_state(vec![Listing::new("en-US")], &BTreeMap::new()).unwrap();
        assert_eq!(desired.len(), 1);
        assert!(desired[0].images.is_empty());
    }
}
