// FormatSelector - turns a metadata payload into display-ready options
//
// Handles:
// - Presence check (a payload without a title is rejected)
// - Muxed video formats (quality label + direct URL)
// - Audio-only adaptive formats (audio MIME type + direct URL)
// - Thumbnail selection (first entry)
//
// Missing format lists are not an error; they classify to empty lists.
// Order is preserved and nothing is de-duplicated.

use tracing::debug;

use super::errors::{LookupError, LookupResult};
use super::models::{ClassifiedResult, DownloadOption, RawMetadata, StreamDescriptor};

/// Stateless classifier
pub struct FormatSelector;

impl FormatSelector {
    /// Decode a raw JSON body, then classify it
    pub fn classify_value(value: &serde_json::Value) -> LookupResult<ClassifiedResult> {
        let raw = RawMetadata::from_value(value)?;
        Self::classify(&raw)
    }

    /// Split a payload into video and audio-only download options
    pub fn classify(raw: &RawMetadata) -> LookupResult<ClassifiedResult> {
        let title = present(&raw.title).ok_or(LookupError::UnexpectedShape)?;

        let video_formats: Vec<DownloadOption> = raw
            .formats
            .iter()
            .flatten()
            .filter_map(Self::video_option)
            .collect();

        let audio_formats: Vec<DownloadOption> = raw
            .adaptive_formats
            .iter()
            .flatten()
            .filter_map(Self::audio_option)
            .collect();

        let thumbnail_url = raw
            .thumbnail
            .as_ref()
            .and_then(|thumbs| thumbs.first())
            .and_then(|t| present(&t.url))
            .map(str::to_string);

        debug!(
            video = video_formats.len(),
            audio = audio_formats.len(),
            has_thumbnail = thumbnail_url.is_some(),
            "Classified formats"
        );

        Ok(ClassifiedResult {
            title: title.to_string(),
            thumbnail_url,
            video_formats,
            audio_formats,
        })
    }

    /// Needs a quality label and a URL
    fn video_option(format: &StreamDescriptor) -> Option<DownloadOption> {
        let label = present(&format.quality_label)?;
        let url = present(&format.url)?;
        Some(DownloadOption {
            label: Some(label.to_string()),
            url: url.to_string(),
        })
    }

    /// Needs an audio MIME type and a URL; the label may be absent
    fn audio_option(format: &StreamDescriptor) -> Option<DownloadOption> {
        if !Self::is_audio(format) {
            return None;
        }
        let url = present(&format.url)?;
        Some(DownloadOption {
            label: format.audio_quality.clone(),
            url: url.to_string(),
        })
    }

    /// Check if the MIME type marks an audio stream
    pub fn is_audio(format: &StreamDescriptor) -> bool {
        format
            .mime_type
            .as_ref()
            .map_or(false, |m| m.contains("audio"))
    }
}

/// Treat empty strings like missing fields
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
