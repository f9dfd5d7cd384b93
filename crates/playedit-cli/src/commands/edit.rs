use anyhow::{Context, Result};
use colored::Colorize;
use playedit_client::PlayClient;
use playedit_store::{CatalogStore, DryRunStore, ImageType};
use playedit_sync::{ListingWithImages, SyncOptions, SyncReport, reconcile};
use tracing::{info, warn};

use crate::cli::{ImageDirArgs, InsertArgs, SyncArgs};
use crate::config::Settings;
use crate::images::desired_state;
use crate::loader::load_listings;
use crate::output::{
    print_edit, print_images, print_listing, print_report, print_success, print_warning,
};

fn load_desired(
    path: &std::path::Path,
    images: &ImageDirArgs,
) -> Result<Vec<ListingWithImages>> {
    let listings = load_listings(path)
        .with_context(|| format!("Unable to read listings from {}", path.display()))?;
    desired_state(listings, &images.roots())
}

async fn run(
    store: &dyn CatalogStore,
    options: &SyncOptions,
    desired: Vec<ListingWithImages>,
) -> Result<SyncReport> {
    let report = reconcile(store, options, desired)
        .await
        .context("Unable to sync listings and images")?;
    print_report(&report);
    Ok(report)
}

/// Creates an edit and upserts every listing in the file. Remote listings
/// missing from the file are left alone.
pub async fn insert(client: &PlayClient, settings: &Settings, args: &InsertArgs) -> Result<()> {
    let desired = load_desired(&args.listings, &args.images)?;

    let edit = client
        .insert_edit()
        .await
        .context("Unable to insert new edit")?;
    print_edit(&edit);
    println!();
    for entry in &desired {
        print_listing(&entry.listing);
        println!();
    }

    let options = SyncOptions::new().with_handoff_timeout(settings.handoff_timeout);
    let store = client.edit_store(&edit.id);
    let report = run(&store, &options, desired).await?;

    print_success(&format!(
        "Edit {} updated: {} listing(s), {} image(s) uploaded, {} deleted",
        edit.id.cyan(),
        report.listings.len(),
        report.total_uploaded(),
        report.total_deleted()
    ));
    Ok(())
}

/// Reconciles an edit with the listings file, optionally pruning and
/// committing it.
pub async fn sync(client: &PlayClient, settings: &Settings, args: &SyncArgs) -> Result<()> {
    let desired = load_desired(&args.listings, &args.images)?;

    let (edit, created) = match &args.edit {
        Some(id) => (client.get_edit(id).await.context("Unable to query edit")?, false),
        None => (
            client
                .insert_edit()
                .await
                .context("Unable to insert new edit")?,
            true,
        ),
    };
    print_edit(&edit);
    println!();

    let options = SyncOptions::new()
        .with_prune_stale_locales(args.prune)
        .with_prune_trailing_images(args.prune_trailing_images)
        .with_handoff_timeout(settings.handoff_timeout);
    let store = client.edit_store(&edit.id);

    if args.dry_run {
        let outcome = run(&DryRunStore::new(store), &options, desired).await;
        // The edit created for the dry run is removed whether or not it succeeded.
        if created {
            match client.delete_edit(&edit.id).await {
                Ok(()) => info!(edit = %edit.id, "Deleted dry-run edit"),
                Err(e) if outcome.is_err() => {
                    warn!(edit = %edit.id, error = %e, "Unable to delete dry-run edit")
                }
                Err(e) => return Err(e).context("Unable to delete dry-run edit"),
            }
        }
        outcome?;
        if args.commit {
            print_warning("--commit ignored in dry-run mode");
        }
        print_success("Dry run finished, nothing was changed");
        return Ok(());
    }

    let report = run(&store, &options, desired).await?;
    print_success(&format!(
        "Edit {} synced: {} listing(s), {} stale locale(s) deleted, {} image(s) uploaded, {} deleted",
        edit.id.cyan(),
        report.listings.len(),
        report.deleted_locales.len(),
        report.total_uploaded(),
        report.total_deleted()
    ));

    if args.commit {
        commit(client, &edit.id).await?;
    }
    Ok(())
}

/// Prints an edit with every listing and its images.
pub async fn list(client: &PlayClient, id: &str) -> Result<()> {
    let edit = client.get_edit(id).await.context("Unable to query edit")?;
    print_edit(&edit);
    println!();

    let store = client.edit_store(id);
    let listings = store
        .list_listings()
        .await
        .context("Unable to query listings")?;
    for listing in &listings {
        print_listing(listing);
        for image_type in ImageType::ALL {
            let images = store
                .list_images(&listing.language, image_type)
                .await
                .context("Unable to query images")?;
            if !images.is_empty() {
                print_images(image_type, &images);
            }
        }
        println!();
    }
    Ok(())
}

pub async fn commit(client: &PlayClient, id: &str) -> Result<()> {
    let edit = client
        .commit_edit(id)
        .await
        .context("Unable to commit edit")?;
    print_success(&format!("Committed edit {}", edit.id.cyan()));
    Ok(())
}

pub async fn validate(client: &PlayClient, id: &str) -> Result<()> {
    let edit = client
        .validate_edit(id)
        .await
        .context("Unable to validate edit")?;
    print_success(&format!("Edit {} is valid", edit.id.cyan()));
    Ok(())
}

pub async fn delete(client: &PlayClient, id: &str) -> Result<()> {
    client
        .delete_edit(id)
        .await
        .context("Unable to delete edit")?;
    print_success(&format!("Deleted edit {}", id.cyan()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use playedit_client::AccessToken;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::cli::Cli;
    use crate::config::ProfileConfig;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
    const BASE: &str = "/api/com.example.app/edits/e1";

    fn client(server: &MockServer) -> PlayClient {
        let http = playedit_client::build_http_client(&Default::default()).unwrap();
        PlayClient::new(http, &AccessToken::bearer("tok"), "com.example.app")
            .with_base_urls(&format!("{}/api", server.uri()), &format!("{}/upload", server.uri()))
    }

    fn settings() -> Settings {
        use clap::Parser;
        let cli = Cli::try_parse_from(["playedit", "edit", "list", "e1"]).unwrap();
        Settings::resolve(&cli, ProfileConfig::default())
    }

    fn sync_args(listings: PathBuf, shots: Option<PathBuf>) -> SyncArgs {
        SyncArgs {
            listings,
            edit: Some("e1".into()),
            prune: true,
            prune_trailing_images: false,
            commit: false,
            dry_run: false,
            images: ImageDirArgs {
                images: Vec::new(),
                phone_screenshots: shots,
            },
        }
    }

    async fn mount_edit(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(BASE))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "e1", "expiryTimeSeconds": "1700000000"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_sync_prunes_updates_and_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let listings = dir.path().join("listings.csv");
        fs::write(&listings, "en-US,Example,Short,Full\n").unwrap();
        let shots = dir.path().join("shots");
        fs::create_dir_all(shots.join("en-US")).unwrap();
        fs::write(shots.join("en-US/01.png"), [PNG_MAGIC, b"one"].concat()).unwrap();

        let server = MockServer::start().await;
        mount_edit(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/listings")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "listings": [
                    { "language": "en-US", "title": "Old" },
                    { "language": "fr-FR", "title": "Vieux" }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/listings/fr-FR")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(format!("{BASE}/listings/en-US")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "language": "en-US", "title": "Example"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/listings/en-US/phoneScreenshots")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload/com.example.app/edits/e1/listings/en-US/phoneScreenshots"))
            .and(query_param("uploadType", "media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "image": { "id": "img-1", "sha1": "x" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        sync(&client(&server), &settings(), &sync_args(listings, Some(shots)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dry_run_sends_no_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let listings = dir.path().join("listings.json");
        fs::write(&listings, r#"[{"language":"en-US","title":"Example"}]"#).unwrap();

        let server = MockServer::start().await;
        mount_edit(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/listings")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "listings": [{ "language": "de-DE" }]
            })))
            .mount(&server)
            .await;
        for verb in ["PUT", "POST", "DELETE"] {
            Mock::given(method(verb))
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&server)
                .await;
        }

        let mut args = sync_args(listings, None);
        args.dry_run = true;
        args.commit = true;
        sync(&client(&server), &settings(), &args).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_dry_run_deletes_created_edit() {
        let dir = tempfile::tempdir().unwrap();
        let listings = dir.path().join("listings.csv");
        fs::write(&listings, "en-US,Example,Short,Full\n").unwrap();
        let shots = dir.path().join("shots");
        fs::create_dir_all(shots.join("en-US")).unwrap();
        fs::write(shots.join("en-US/01.png"), [PNG_MAGIC, b"one"].concat()).unwrap();

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/com.example.app/edits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "e1", "expiryTimeSeconds": "1700000000"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/listings/en-US/phoneScreenshots")))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": { "code": 500, "message": "Backend error" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(BASE))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let mut args = sync_args(listings, Some(shots));
        args.edit = None;
        args.prune = false;
        args.dry_run = true;
        let err = sync(&client(&server), &settings(), &args).await.unwrap_err();
        assert!(format!("{err:#}").contains("Backend error"));
    }

    #[tokio::test]
    async fn test_commit_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{BASE}:commit")))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "code": 400, "message": "Edit is not valid" }
            })))
            .mount(&server)
            .await;

        let err = commit(&client(&server), "e1").await.unwrap_err();
        let text = format!("{err:#}");
        assert!(text.contains("Unable to commit edit"));
        assert!(text.contains("Edit is not valid"));
    }
}
