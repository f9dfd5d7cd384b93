use playedit_store::{Edit, SyncError};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::AccessToken;
use crate::store::EditStore;

/// Base URL of the publishing API.
pub const DEFAULT_API_BASE: &str =
    "https://androidpublisher.googleapis.com/androidpublisher/v3/applications";

/// Base URL for media uploads.
pub const DEFAULT_UPLOAD_BASE: &str =
    "https://androidpublisher.googleapis.com/upload/androidpublisher/v3/applications";

/// Client for one application package of the publishing API.
#[derive(Clone)]
pub struct PlayClient {
    http: reqwest::Client,
    token: String,
    package: String,
    api_base: String,
    upload_base: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

impl PlayClient {
    pub fn new(http: reqwest::Client, token: &AccessToken, package: &str) -> Self {
        Self {
            http,
            token: token.access_token.clone(),
            package: package.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            upload_base: DEFAULT_UPLOAD_BASE.to_string(),
        }
    }

    /// Points the client at another server.
    pub fn with_base_urls(mut self, api_base: &str, upload_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self.upload_base = upload_base.trim_end_matches('/').to_string();
        self
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// A catalog store bound to one edit of this package.
    pub fn edit_store(&self, edit_id: &str) -> EditStore {
        EditStore::new(self.clone(), edit_id)
    }

    /// `segments` under this package on the API base. Each segment is
    /// percent-encoded on its own, so ids and locales cannot add path levels.
    pub(crate) fn api_url(&self, segments: &[&str]) -> Result<Url, SyncError> {
        package_url(&self.api_base, &self.package, segments)
    }

    pub(crate) fn upload_url(&self, segments: &[&str]) -> Result<Url, SyncError> {
        package_url(&self.upload_base, &self.package, segments)
    }

    pub(crate) fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        debug!(%method, %url, "Store request");
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
    }

    // ==================== Edits ====================

    /// Opens a new edit.
    pub async fn insert_edit(&self) -> Result<Edit, SyncError> {
        let url = self.api_url(&["edits"])?;
        let resp = send(self.request(reqwest::Method::POST, url)).await?;
        handle_response(resp).await
    }

    pub async fn get_edit(&self, edit_id: &str) -> Result<Edit, SyncError> {
        let url = self.api_url(&["edits", edit_id])?;
        let resp = send(self.request(reqwest::Method::GET, url)).await?;
        handle_response(resp).await
    }

    /// Checks the edit for errors without committing it.
    pub async fn validate_edit(&self, edit_id: &str) -> Result<Edit, SyncError> {
        let url = self.api_url(&["edits", format!("{edit_id}:validate").as_str()])?;
        let resp = send(self.request(reqwest::Method::POST, url)).await?;
        handle_response(resp).await
    }

    /// Publishes every change made in the edit.
    pub async fn commit_edit(&self, edit_id: &str) -> Result<Edit, SyncError> {
        let url = self.api_url(&["edits", format!("{edit_id}:commit").as_str()])?;
        let resp = send(self.request(reqwest::Method::POST, url)).await?;
        handle_response(resp).await
    }

    /// Abandons the edit.
    pub async fn delete_edit(&self, edit_id: &str) -> Result<(), SyncError> {
        let url = self.api_url(&["edits", edit_id])?;
        let resp = send(self.request(reqwest::Method::DELETE, url)).await?;
        handle_empty(resp).await
    }
}

fn package_url(base: &str, package: &str, segments: &[&str]) -> Result<Url, SyncError> {
    let mut url = Url::parse(base)
        .map_err(|e| SyncError::transport(format!("Invalid store URL '{base}': {e}")))?;
    url.path_segments_mut()
        .map_err(|()| SyncError::transport(format!("Store URL '{base}' cannot take a path")))?
        .pop_if_empty()
        .push(package)
        .extend(segments);
    Ok(url)
}

pub(crate) async fn send(req: reqwest::RequestBuilder) -> Result<reqwest::Response, SyncError> {
    req.send()
        .await
        .map_err(|e| SyncError::transport(format!("Failed to reach store: {e}")))
}

pub(crate) async fn handle_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, SyncError> {
    let body = read_success(resp).await?;
    let body = if body.trim().is_empty() { "{}" } else { &body };
    serde_json::from_str(body)
        .map_err(|e| SyncError::transport(format!("Failed to parse response JSON: {e}")))
}

pub(crate) async fn handle_empty(resp: reqwest::Response) -> Result<(), SyncError> {
    read_success(resp).await.map(|_| ())
}

async fn read_success(resp: reqwest::Response) -> Result<String, SyncError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| SyncError::transport(format!("Failed to read response: {e}")))?;

    if status.is_success() {
        return Ok(body);
    }

    let message = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) if !parsed.error.message.is_empty() => {
            debug!(code = parsed.error.code, "Store rejected request");
            parsed.error.message
        }
        _ => body,
    };
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(SyncError::not_found(message));
    }
    Err(SyncError::rejected(status.as_u16(), message))
}
