//! The wire types returned by the photo-listing API.
//!
//! A [`Page`] is one response: the cursor for the next request plus an
//! ordered batch of [`Photo`]s.  Both are plain serde structs so the HTTP
//! source and the tests share the same parsing path.
//!
//! Unknown fields in the JSON are ignored, and optional display fields
//! default sensibly, so small changes on the server side don't break the
//! client.

use serde::{Deserialize, Deserializer, Serialize};

use super::Cursor;

/// A single photo post.
///
/// `date` is the unique key: the API publishes at most one photo per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Publication date, `YYYY-MM-DD`.  Used as the feed key.
    pub date: String,

    pub title: String,

    /// Long-form description of the image.
    #[serde(default)]
    pub explanation: String,

    /// Display-resolution image (or video embed) URL.
    pub url: String,

    /// Full-resolution image, when the API has one.
    #[serde(default)]
    pub hdurl: Option<String>,

    /// `"image"` or `"video"`.
    #[serde(default = "default_media_type")]
    pub media_type: String,

    #[serde(default)]
    pub copyright: Option<String>,

    /// Like count.  Anything that isn't a non-negative number is dropped
    /// rather than failing the whole page.
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes: Option<u32>,
}

fn default_media_type() -> String {
    "image".to_string()
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let count = match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(count.map(|c| u32::try_from(c).unwrap_or(u32::MAX)))
}

impl Photo {
    pub fn is_video(&self) -> bool {
        self.media_type == "video"
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Cursor to send with the next request.
    pub new_date: Cursor,

    /// Photos in server order.  Required: only an explicit empty array
    /// means the feed has run out.
    pub photos: Vec<Photo>,
}

impl Page {
    /// Parse a response body.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}
