//! [`CatalogStore`] over the listings and images endpoints of one edit.

use async_trait::async_trait;
use playedit_store::{
    CatalogStore, ImageSource, ImageType, Listing, Locale, RemoteImage, SyncError,
    ensure_accepted_media_type,
};
use serde::Deserialize;
use tracing::debug;

use crate::client::{PlayClient, handle_empty, handle_response, send};

/// The store as seen through one open edit.
#[derive(Clone)]
pub struct EditStore {
    client: PlayClient,
    edit_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ListingsResponse {
    #[serde(default)]
    listings: Vec<Listing>,
}

#[derive(Debug, Default, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    images: Vec<RemoteImage>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    image: RemoteImage,
}

impl EditStore {
    pub fn new(client: PlayClient, edit_id: impl Into<String>) -> Self {
        Self {
            client,
            edit_id: edit_id.into(),
        }
    }

    pub fn edit_id(&self) -> &str {
        &self.edit_id
    }

    fn listing_path<'a>(&'a self, locale: &'a Locale) -> Vec<&'a str> {
        vec!["edits", self.edit_id.as_str(), "listings", locale.as_str()]
    }

    fn images_path<'a>(&'a self, locale: &'a Locale, image_type: ImageType) -> Vec<&'a str> {
        let mut path = self.listing_path(locale);
        path.push(image_type.as_str());
        path
    }
}

#[async_trait]
impl CatalogStore for EditStore {
    async fn update_listing(&self, listing: &Listing) -> Result<Listing, SyncError> {
        let url = self.client.api_url(&self.listing_path(&listing.language))?;
        let req = self.client.request(reqwest::Method::PUT, url).json(listing);
        handle_response(send(req).await?).await
    }

    async fn list_listings(&self) -> Result<Vec<Listing>, SyncError> {
        let url = self.client.api_url(&["edits", self.edit_id.as_str(), "listings"])?;
        let req = self.client.request(reqwest::Method::GET, url);
        let body: ListingsResponse = handle_response(send(req).await?).await?;
        Ok(body.listings)
    }

    async fn delete_listing(&self, locale: &Locale) -> Result<(), SyncError> {
        let url = self.client.api_url(&self.listing_path(locale))?;
        let req = self.client.request(reqwest::Method::DELETE, url);
        handle_empty(send(req).await?).await
    }

    async fn list_images(
        &self,
        locale: &Locale,
        image_type: ImageType,
    ) -> Result<Vec<RemoteImage>, SyncError> {
        let url = self.client.api_url(&self.images_path(locale, image_type))?;
        let req = self.client.request(reqwest::Method::GET, url);
        let body: ImagesResponse = handle_response(send(req).await?).await?;
        Ok(body.images)
    }

    async fn upload_image(
        &self,
        locale: &Locale,
        image_type: ImageType,
        source: &mut ImageSource,
    ) -> Result<RemoteImage, SyncError> {
        let media_type = ensure_accepted_media_type(source)?;
        let bytes = source.read_all()?;
        debug!(
            locale = %locale,
            image_type = %image_type,
            name = source.name(),
            media_type,
            size = bytes.len(),
            "Uploading image"
        );

        let url = self.client.upload_url(&self.images_path(locale, image_type))?;
        let req = self
            .client
            .request(reqwest::Method::POST, url)
            .query(&[("uploadType", "media")])
            .header("Content-Type", media_type)
            .body(bytes);
        let body: UploadResponse = handle_response(send(req).await?).await?;
        Ok(body.image)
    }

    async fn delete_image(
        &self,
        locale: &Locale,
        image_type: ImageType,
        image_id: &str,
    ) -> Result<(), SyncError> {
        let mut path = self.images_path(locale, image_type);
        path.push(image_id);
        let url = self.client.api_url(&path)?;
        let req = self.client.request(reqwest::Method::DELETE, url);
        handle_empty(send(req).await?).await
    }

    fn backend_name(&self) -> &'static str {
        "play"
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::AccessToken;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn store(server: &MockServer) -> EditStore {
        PlayClient::new(reqwest::Client::new(), &AccessToken::bearer("tok"), "com.example.app")
            .with_base_urls(&format!("{}/api", server.uri()), &format!("{}/upload", server.uri()))
            .edit_store("e1")
    }

    #[tokio::test]
    async fn test_update_listing_puts_json() {
        let server = MockServer::start().await;
        let listing = Listing::new("en-US")
            .with_title("Example")
            .with_short_description("Short")
            .with_full_description("Full");
        Mock::given(method("PUT"))
            .and(path("/api/com.example.app/edits/e1/listings/en-US"))
            .and(body_json(serde_json::json!({
                "language": "en-US",
                "title": "Example",
                "shortDescription": "Short",
                "fullDescription": "Full"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&listing))
            .expect(1)
            .mount(&server)
            .await;

        let updated = store(&server).update_listing(&listing).await.unwrap();
        assert_eq!(updated, listing);
    }

    #[tokio::test]
    async fn test_list_listings_tolerates_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/com.example.app/edits/e1/listings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        assert!(store(&server).list_listings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_images_keeps_store_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/com.example.app/edits/e1/listings/fr-FR/phoneScreenshots"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "images": [
                    { "id": "2", "sha1": "bbb", "url": "https://img/2" },
                    { "id": "1", "sha1": "aaa", "url": "https://img/1" }
                ]
            })))
            .mount(&server)
            .await;

        let images = store(&server)
            .list_images(&Locale::new("fr-FR"), ImageType::PhoneScreenshots)
            .await
            .unwrap();
        let ids: Vec<_> = images.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
        assert_eq!(images[1].fingerprint, "aaa");
    }

    #[tokio::test]
    async fn test_upload_sends_raw_bytes_with_media_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/com.example.app/edits/e1/listings/en-US/icon"))
            .and(query_param("uploadType", "media"))
            .and(header("Content-Type", "image/png"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "image": { "id": "new", "sha1": "ffff" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut source = ImageSource::from_bytes("icon.png", [PNG_MAGIC, b"icon"].concat());
        let image = store(&server)
            .upload_image(&Locale::new("en-US"), ImageType::Icon, &mut source)
            .await
            .unwrap();
        assert_eq!(image.id, "new");
        assert_eq!(image.url, "");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut source = ImageSource::from_bytes("notes.txt", b"plain text".to_vec());
        let err = store(&server)
            .upload_image(&Locale::new("en-US"), ImageType::Icon, &mut source)
            .await
            .unwrap_err();
        assert!(err.is_invalid_content_type());
    }

    #[tokio::test]
    async fn test_delete_image_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/com.example.app/edits/e1/listings/de-DE/featureGraphic/img-9"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .delete_image(&Locale::new("de-DE"), ImageType::FeatureGraphic, "img-9")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_path_segments_are_percent_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/com.example.app/edits/e1/listings/en%20US/featureGraphic/a%2Fb%20c"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .delete_image(&Locale::new("en US"), ImageType::FeatureGraphic, "a/b c")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_listing_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/com.example.app/edits/e1/listings/xx"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": { "code": 404, "message": "Listing not found" }
            })))
            .mount(&server)
            .await;

        let err = store(&server)
            .delete_listing(&Locale::new("xx"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
