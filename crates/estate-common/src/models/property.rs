use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored listing as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub location: String,
    pub images: Vec<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub posted_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Minimal projection of the posting user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poster {
    pub id: Uuid,
    pub email: String,
}

/// A listing with `postedBy` resolved to the poster.
///
/// `posted_by` is `None` when the referenced user no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetail {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub location: String,
    pub images: Vec<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub posted_by: Option<Poster>,
    pub created_at: DateTime<Utc>,
}

/// `images` accepts either a single URL or a list of URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageList {
    One(String),
    Many(Vec<String>),
}

impl ImageList {
    /// Flatten into a list, dropping blank entries.
    pub fn into_urls(self) -> Vec<String> {
        let urls = match self {
            ImageList::One(url) => vec![url],
            ImageList::Many(urls) => urls,
        };
        urls.into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect()
    }
}

impl From<Vec<String>> for ImageList {
    fn from(urls: Vec<String>) -> Self {
        ImageList::Many(urls)
    }
}

/// Price as sent by clients: a JSON number or a numeric string (form inputs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(serde_json::Number),
    Text(String),
}

impl From<i64> for PriceInput {
    fn from(price: i64) -> Self {
        PriceInput::Number(price.into())
    }
}

/// Body of `POST /api/properties`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<ImageList>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
}

/// Body of `PUT /api/properties/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<ImageList>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
}

/// A validated listing ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub location: String,
    pub images: Vec<String>,
    pub property_type: Option<String>,
}

/// A validated partial update.
///
/// `None` leaves a field unchanged. For the optional `description` and
/// `property_type`, `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<i64>,
    pub location: Option<String>,
    pub images: Option<Vec<String>>,
    pub property_type: Option<Option<String>>,
}

impl PropertyUpdate {
    pub fn is_empty(&self) -> bool {
        *self == PropertyUpdate::default()
    }
}

/// Query string of `GET /api/properties`, as received.
///
/// Values stay raw strings so that empty inputs (`?location=&maxPrice=`) can
/// be treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "maxPrice", default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
}

/// Parsed listing search filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    /// Case-insensitive substring of `location`
    pub location: Option<String>,
    /// Inclusive upper bound on `price`
    pub max_price: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
