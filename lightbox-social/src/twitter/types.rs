use serde::{Deserialize, Serialize};

/// Where a media entry was declared relative to the clicked post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLocation {
    Original,
    Quoted,
}

/// Raw media kind as declared by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    AnimatedGif,
}

/// Normalized media type carried on validated records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Gif,
}

/// One playback candidate for a video or animated gif.
///
/// Derives `Deserialize` against the GraphQL `video_info.variants` shape
/// directly (`content_type`, optional `bitrate`, `url`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoVariant {
    pub content_type: String,
    #[serde(default)]
    pub bitrate: Option<u64>,
    pub url: String,
}

/// A media entry as declared in the tweet payload, tagged with its source
/// location but not yet URL-validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMediaEntry {
    pub external_id: String,
    pub kind: MediaKind,
    pub preview_url: String,
    /// Permalink-style URL the API attaches to the entry, when present.
    pub expanded_url: Option<String>,
    /// Playback candidates; always empty for photos.
    pub variants: Vec<VideoVariant>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub source_location: SourceLocation,
}

impl RawMediaEntry {
    /// Convert a tolerant API-shaped entry into the tagged domain form.
    ///
    /// Entries with no preview URL or an unrecognised kind are skipped
    /// (`None`); photos never carry variants even if the payload smuggles a
    /// `video_info` block onto one.
    pub fn from_api(raw: ApiMediaEntry, source_location: SourceLocation) -> Option<Self> {
        let preview_url = raw.media_url_https?;
        let kind = match raw.kind.as_deref() {
            Some("photo") => MediaKind::Photo,
            Some("video") => MediaKind::Video,
            Some("animated_gif") => MediaKind::AnimatedGif,
            other => {
                tracing::debug!(kind = ?other, "media.unknown_kind_skipped");
                return None;
            }
        };
        let variants = if kind == MediaKind::Photo {
            Vec::new()
        } else {
            raw.video_info.map(|vi| vi.variants).unwrap_or_default()
        };
        let external_id = raw
            .id_str
            .or(raw.media_key)
            .unwrap_or_else(|| preview_url.clone());
        let (width, height) = raw
            .original_info
            .map(|oi| (oi.width, oi.height))
            .unwrap_or((None, None));
        Some(Self {
            external_id,
            kind,
            preview_url,
            expanded_url: raw.expanded_url,
            variants,
            width,
            height,
            source_location,
        })
    }
}

/// A normalized tweet with its media entries and at most one quoted tweet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTweet {
    pub id: String,
    pub author_handle: Option<String>,
    pub text: String,
    /// Entries in source declaration order.
    pub media_entries: Vec<RawMediaEntry>,
    /// Quote nesting is capped at one level; deeper chains are ignored.
    pub quoted: Option<Box<ResolvedTweet>>,
}

impl ResolvedTweet {
    /// All media entries in the contract order consumed by the click
    /// resolver: original entries first, quoted entries appended after,
    /// each side preserving its own declaration order.
    pub fn media_in_order(&self) -> impl Iterator<Item = &RawMediaEntry> {
        self.media_entries
            .iter()
            .chain(self.quoted.iter().flat_map(|q| q.media_entries.iter()))
    }
}

/// Validated, trusted media record. Every non-null URL on this struct has
/// passed the hostname allow-list; there is no partially trusted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaInfo {
    pub url: String,
    pub original_url: String,
    pub thumbnail_url: Option<String>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Position within the flattened, ordered media list.
    pub index: usize,
    pub source_location: SourceLocation,
    pub tweet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

// ---- tolerant input models for the GraphQL `legacy` media shape ----

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMediaEntry {
    #[serde(default)]
    pub id_str: Option<String>,
    #[serde(default)]
    pub media_key: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub media_url_https: Option<String>,
    #[serde(default)]
    pub expanded_url: Option<String>,
    #[serde(default)]
    pub video_info: Option<ApiVideoInfo>,
    #[serde(default)]
    pub original_info: Option<ApiOriginalInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiVideoInfo {
    #[serde(default)]
    pub variants: Vec<VideoVariant>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiOriginalInfo {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn photo_entries_never_carry_variants() {
        let raw: ApiMediaEntry = serde_json::from_value(json!({
            "id_str": "1",
            "type": "photo",
            "media_url_https": "https://pbs.twimg.com/media/abc.jpg",
            "video_info": { "variants": [
                { "content_type": "video/mp4", "bitrate": 1, "url": "https://video.twimg.com/a.mp4" }
            ]}
        }))
        .unwrap();
        let entry = RawMediaEntry::from_api(raw, SourceLocation::Original).unwrap();
        assert_eq!(entry.kind, MediaKind::Photo);
        assert!(entry.variants.is_empty());
    }

    #[test]
    fn unknown_kind_is_skipped() {
        let raw: ApiMediaEntry = serde_json::from_value(json!({
            "type": "hologram",
            "media_url_https": "https://pbs.twimg.com/media/abc.jpg"
        }))
        .unwrap();
        assert!(RawMediaEntry::from_api(raw, SourceLocation::Original).is_none());
    }

    #[test]
    fn missing_preview_url_is_skipped() {
        let raw: ApiMediaEntry = serde_json::from_value(json!({ "type": "photo" })).unwrap();
        assert!(RawMediaEntry::from_api(raw, SourceLocation::Original).is_none());
    }

    #[test]
    fn dimensions_pass_through_from_original_info() {
        let raw: ApiMediaEntry = serde_json::from_value(json!({
            "id_str": "2",
            "type": "photo",
            "media_url_https": "https://pbs.twimg.com/media/xyz.png",
            "original_info": { "width": 1200, "height": 675 }
        }))
        .unwrap();
        let entry = RawMediaEntry::from_api(raw, SourceLocation::Quoted).unwrap();
        assert_eq!(entry.width, Some(1200));
        assert_eq!(entry.height, Some(675));
        assert_eq!(entry.source_location, SourceLocation::Quoted);
    }
}
