//! Catalog types: locales, listings, image types and remote images.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A language/region tag (e.g. `en-US`) keying one listing and its images.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    /// Creates a locale from its tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Locale {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

/// Text fields of one store listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// The locale this listing belongs to.
    pub language: Locale,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub full_description: String,
    /// Promotional video URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

impl Listing {
    /// Creates a listing with empty text fields.
    #[must_use]
    pub fn new(language: impl Into<Locale>) -> Self {
        Self {
            language: language.into(),
            title: String::new(),
            short_description: String::new(),
            full_description: String::new(),
            video: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_short_description(mut self, text: impl Into<String>) -> Self {
        self.short_description = text.into();
        self
    }

    #[must_use]
    pub fn with_full_description(mut self, text: impl Into<String>) -> Self {
        self.full_description = text.into();
        self
    }

    #[must_use]
    pub fn with_video(mut self, url: impl Into<String>) -> Self {
        self.video = Some(url.into());
        self
    }
}

/// Category of image asset kept per locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageType {
    FeatureGraphic,
    Icon,
    PhoneScreenshots,
    PromoGraphic,
    SevenInchScreenshots,
    TenInchScreenshots,
    TvBanner,
    TvScreenshots,
    WearScreenshots,
}

impl ImageType {
    /// All image types, in processing order.
    pub const ALL: [ImageType; 9] = [
        Self::FeatureGraphic,
        Self::Icon,
        Self::PhoneScreenshots,
        Self::PromoGraphic,
        Self::SevenInchScreenshots,
        Self::TenInchScreenshots,
        Self::TvBanner,
        Self::TvScreenshots,
        Self::WearScreenshots,
    ];

    /// The name used by the store in URLs and payloads.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FeatureGraphic => "featureGraphic",
            Self::Icon => "icon",
            Self::PhoneScreenshots => "phoneScreenshots",
            Self::PromoGraphic => "promoGraphic",
            Self::SevenInchScreenshots => "sevenInchScreenshots",
            Self::TenInchScreenshots => "tenInchScreenshots",
            Self::TvBanner => "tvBanner",
            Self::TvScreenshots => "tvScreenshots",
            Self::WearScreenshots => "wearScreenshots",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown image type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown image type '{0}'")]
pub struct UnknownImageType(pub String);

impl FromStr for ImageType {
    type Err = UnknownImageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownImageType(s.to_string()))
    }
}

/// An image as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteImage {
    pub id: String,
    /// Lowercase hex SHA-1 of the image bytes.
    #[serde(rename = "sha1")]
    pub fingerprint: String,
    #[serde(default)]
    pub url: String,
}

impl RemoteImage {
    #[must_use]
    pub fn new(id: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fingerprint: fingerprint.into(),
            url: String::new(),
        }
    }
}

/// An edit session grouping listing and image changes until committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edit {
    pub id: String,
    /// Expiry as seconds since the epoch, as sent by the store.
    #[serde(default)]
    pub expiry_time_seconds: String,
}

impl Edit {
    /// Parses the expiry timestamp, if present and numeric.
    #[must_use]
    pub fn expiry_unix(&self) -> Option<i64> {
        self.expiry_time_seconds.parse().ok()
    }
}
