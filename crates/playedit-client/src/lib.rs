//! # playedit-client
//!
//! REST client for the application store publishing API.
//!
//! - [`Authenticator`] trades a service-account key for an access token.
//! - [`PlayClient`] opens, validates, commits and deletes edits.
//! - [`EditStore`] implements [`playedit_store::CatalogStore`] over the
//!   listings and images of one edit.

mod auth;
mod client;
mod error;
mod http;
mod store;

pub use auth::{AccessToken, Authenticator, PUBLISHER_SCOPE, ServiceAccount};
pub use client::{DEFAULT_API_BASE, DEFAULT_UPLOAD_BASE, PlayClient};
pub use error::ClientError;
pub use http::{DEFAULT_TIMEOUT, HttpSettings, build_http_client};
pub use store::EditStore;
