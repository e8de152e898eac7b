// Video ID resolution from free-form YouTube links
//
// Each supported link shape is an independent matcher. All matchers are
// tried; the one whose marker appears earliest in the input wins, with
// declaration order breaking ties. Matching is pure string work: no
// network, no normalization of the input.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::errors::{LookupError, LookupResult};
use super::models::VideoId;

lazy_static! {
    static ref WATCH_RE: Regex =
        Regex::new(r"youtube\.com/\S*?[?&]v=([A-Za-z0-9_-]{11})").unwrap();
    static ref EMBED_RE: Regex = Regex::new(r"youtube\.com/embed/([A-Za-z0-9_-]{11})").unwrap();
    static ref V_RE: Regex = Regex::new(r"youtube\.com/v/([A-Za-z0-9_-]{11})").unwrap();
    static ref E_RE: Regex = Regex::new(r"youtube\.com/e/([A-Za-z0-9_-]{11})").unwrap();
    static ref SHORTS_RE: Regex = Regex::new(r"youtube\.com/shorts/([A-Za-z0-9_-]{11})").unwrap();
    static ref SHORT_LINK_RE: Regex = Regex::new(r"youtu\.be/([A-Za-z0-9_-]{11})").unwrap();
    static ref NESTED_PATH_RE: Regex =
        Regex::new(r"youtube\.com/[^/\s]+/\S+/([A-Za-z0-9_-]{11})").unwrap();
}

/// A recognized link shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlShape {
    /// youtube.com/watch?v=ID (v may follow other query parameters)
    Watch,
    /// youtube.com/embed/ID
    Embed,
    /// youtube.com/v/ID
    V,
    /// youtube.com/e/ID
    E,
    /// youtube.com/shorts/ID
    Shorts,
    /// youtu.be/ID
    ShortLink,
    /// youtube.com/<segment>/<path>/ID (old channel-page links)
    NestedPath,
}

impl UrlShape {
    /// Default matcher order
    pub const ALL: [UrlShape; 7] = [
        Self::Watch,
        Self::Embed,
        Self::V,
        Self::E,
        Self::Shorts,
        Self::ShortLink,
        Self::NestedPath,
    ];

    fn pattern(&self) -> &'static Regex {
        match self {
            Self::Watch => &*WATCH_RE,
            Self::Embed => &*EMBED_RE,
            Self::V => &*V_RE,
            Self::E => &*E_RE,
            Self::Shorts => &*SHORTS_RE,
            Self::ShortLink => &*SHORT_LINK_RE,
            Self::NestedPath => &*NESTED_PATH_RE,
        }
    }

    /// Leftmost match of this shape: (marker offset, ID)
    pub fn find<'a>(&self, url: &'a str) -> Option<(usize, &'a str)> {
        let caps = self.pattern().captures(url)?;
        let whole = caps.get(0)?;
        let id = caps.get(1)?;
        Some((whole.start(), id.as_str()))
    }
}

impl fmt::Display for UrlShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Watch => write!(f, "watch"),
            Self::Embed => write!(f, "embed"),
            Self::V => write!(f, "v"),
            Self::E => write!(f, "e"),
            Self::Shorts => write!(f, "shorts"),
            Self::ShortLink => write!(f, "youtu.be"),
            Self::NestedPath => write!(f, "nested_path"),
        }
    }
}

/// Ordered list of shape matchers
#[derive(Debug, Clone)]
pub struct IdentifierResolver {
    shapes: Vec<UrlShape>,
}

impl IdentifierResolver {
    pub fn new() -> Self {
        Self {
            shapes: UrlShape::ALL.to_vec(),
        }
    }

    /// Restrict or reorder the matchers
    pub fn with_shapes(shapes: Vec<UrlShape>) -> Self {
        Self { shapes }
    }

    pub fn shapes(&self) -> &[UrlShape] {
        &self.shapes
    }

    /// Extract the video ID and report which shape produced it.
    pub fn resolve_with_shape(&self, url: &str) -> LookupResult<(UrlShape, VideoId)> {
        let best = self
            .shapes
            .iter()
            .enumerate()
            .filter_map(|(rank, shape)| shape.find(url).map(|(start, id)| (start, rank, *shape, id)))
            .min_by_key(|(start, rank, _, _)| (*start, *rank));

        match best {
            Some((_, _, shape, id)) => {
                debug!(shape = %shape, video_id = id, "Resolved video ID");
                Ok((shape, VideoId::new_unchecked(id)))
            }
            None => {
                debug!(input_len = url.len(), "No recognized link shape");
                Err(LookupError::InvalidUrl(url.to_string()))
            }
        }
    }

    pub fn resolve(&self, url: &str) -> LookupResult<VideoId> {
        self.resolve_with_shape(url).map(|(_, id)| id)
    }
}

impl Default for IdentifierResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve with the default matcher list
pub fn resolve(url: &str) -> LookupResult<VideoId> {
    IdentifierResolver::new().resolve(url)
}
