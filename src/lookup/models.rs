// Common data models for the lookup pipeline

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::errors::{LookupError, LookupResult};

pub const VIDEO_ID_LEN: usize = 11;

/// Canonical 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Validate an already-isolated ID (no URL parsing).
    pub fn parse(raw: &str) -> LookupResult<Self> {
        if is_valid_id(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(LookupError::InvalidUrl(raw.to_string()))
        }
    }

    pub(crate) fn new_unchecked(id: &str) -> Self {
        debug_assert!(is_valid_id(id));
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub(crate) fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn is_valid_id(s: &str) -> bool {
    s.len() == VIDEO_ID_LEN && s.chars().all(is_id_char)
}

/// Thumbnail entry as returned by the metadata API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thumbnail {
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub width: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub height: Option<u32>,
}

/// One downloadable media variant. No field is guaranteed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamDescriptor {
    #[serde(deserialize_with = "lenient_string")]
    pub quality_label: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub audio_quality: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub mime_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
}

/// Decoded API response. Every field is optional; see `FormatSelector`
/// for which absences are tolerated.
///
/// Decoding never fails on a mistyped field: it reads as absent, and a
/// list entry that is not an object is skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawMetadata {
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub thumbnail: Option<Vec<Thumbnail>>,
    #[serde(deserialize_with = "lenient_list")]
    pub formats: Option<Vec<StreamDescriptor>>,
    #[serde(deserialize_with = "lenient_list")]
    pub adaptive_formats: Option<Vec<StreamDescriptor>>,
    /// Error text some replies carry instead of metadata
    #[serde(deserialize_with = "lenient_string")]
    pub message: Option<String>,
}

impl RawMetadata {
    /// Decode a JSON body. Only a body that is not an object is a shape error.
    pub fn from_value(value: &Value) -> LookupResult<Self> {
        if !value.is_object() {
            return Err(LookupError::UnexpectedShape);
        }
        Self::deserialize(value).map_err(|_| LookupError::UnexpectedShape)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok()))
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// The only stream shape exposed to presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOption {
    pub label: Option<String>,
    pub url: String,
}

/// Video info ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedResult {
    pub title: String,
    /// `None` means the UI should show its placeholder
    pub thumbnail_url: Option<String>,
    pub video_formats: Vec<DownloadOption>,
    pub audio_formats: Vec<DownloadOption>,
}
