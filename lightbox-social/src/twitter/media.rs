//! Conversion of raw media entries into validated [`MediaInfo`] records.
//!
//! Every candidate URL goes through the hostname allow-list before it lands
//! on a record. A photo or playback URL that fails validation drops the
//! whole record; an invalid thumbnail merely degrades it, because a missing
//! preview is usable and an untrusted playback URL is not.

use url::Url;

use crate::hosts::is_trusted_media_host;
use crate::twitter::types::{MediaInfo, MediaKind, MediaType, RawMediaEntry, VideoVariant};

/// Build a validated [`MediaInfo`] for `entry` at `index` in the flattened
/// media list, or `None` if no trusted playback/display URL exists.
pub fn extract_media_info(
    entry: &RawMediaEntry,
    tweet_id: &str,
    index: usize,
    allow_list: &[String],
) -> Option<MediaInfo> {
    let (url, media_type) = match entry.kind {
        MediaKind::Photo => {
            let orig = original_quality_url(&entry.preview_url)?;
            (validated(&orig, allow_list, "photo", entry)?, MediaType::Image)
        }
        MediaKind::Video => {
            let variant = best_mp4_variant(entry)?;
            (
                validated(&variant.url, allow_list, "video", entry)?,
                MediaType::Video,
            )
        }
        MediaKind::AnimatedGif => {
            let variant = best_mp4_variant(entry)?;
            (
                validated(&variant.url, allow_list, "gif", entry)?,
                MediaType::Gif,
            )
        }
    };

    // Prefer the entry's permalink when present and trusted; otherwise the
    // playback URL stands in. Never carry an unvalidated permalink.
    let original_url = entry
        .expanded_url
        .as_deref()
        .and_then(|e| validated(e, allow_list, "original", entry))
        .unwrap_or_else(|| url.clone());

    // Degraded-but-usable on failure.
    let thumbnail_url = validated(&entry.preview_url, allow_list, "thumbnail", entry);

    Some(MediaInfo {
        url,
        original_url,
        thumbnail_url,
        media_type,
        index,
        source_location: entry.source_location,
        tweet_id: tweet_id.to_string(),
        width: entry.width,
        height: entry.height,
    })
}

fn validated(
    candidate: &str,
    allow_list: &[String],
    field: &'static str,
    entry: &RawMediaEntry,
) -> Option<String> {
    if is_trusted_media_host(candidate, allow_list) {
        Some(candidate.to_string())
    } else {
        tracing::warn!(
            media_id = %entry.external_id,
            field,
            url = %candidate,
            "media.untrusted_url"
        );
        None
    }
}

/// Canonical playback variant: highest bitrate among `video/mp4` candidates,
/// a missing bitrate ranking below every declared one. Variant sets with no
/// mp4 at all (e.g. HLS manifests only) are unsupported and rejected.
fn best_mp4_variant(entry: &RawMediaEntry) -> Option<&VideoVariant> {
    let best = entry
        .variants
        .iter()
        .filter(|v| v.content_type == "video/mp4")
        .max_by_key(|v| v.bitrate);
    if best.is_none() {
        tracing::warn!(
            media_id = %entry.external_id,
            variants = entry.variants.len(),
            "media.no_mp4_variant"
        );
    }
    best
}

/// Original-quality form of a media CDN URL: the extension moves into a
/// `format` query param and `name=orig` requests the untranscoded asset.
fn original_quality_url(preview: &str) -> Option<String> {
    let mut url = Url::parse(preview).ok()?;
    let path = url.path().to_string();
    if let Some((stem, ext)) = path.rsplit_once('.') {
        if !ext.is_empty() && !ext.contains('/') {
            url.set_path(stem);
            url.set_query(Some(&format!("format={ext}&name=orig")));
            return Some(url.to_string());
        }
    }
    url.set_query(Some("name=orig"));
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twitter::types::SourceLocation;

    fn hosts() -> Vec<String> {
        vec!["twimg.com".to_string(), "x.com".to_string()]
    }

    fn photo_entry(preview: &str) -> RawMediaEntry {
        RawMediaEntry {
            external_id: "m1".into(),
            kind: MediaKind::Photo,
            preview_url: preview.into(),
            expanded_url: None,
            variants: Vec::new(),
            width: Some(800),
            height: Some(600),
            source_location: SourceLocation::Original,
        }
    }

    fn video_entry(variants: Vec<VideoVariant>) -> RawMediaEntry {
        RawMediaEntry {
            external_id: "m2".into(),
            kind: MediaKind::Video,
            preview_url: "https://pbs.twimg.com/ext_tw_video_thumb/1/pu/img/t.jpg".into(),
            expanded_url: None,
            variants,
            width: None,
            height: None,
            source_location: SourceLocation::Original,
        }
    }

    fn mp4(bitrate: Option<u64>, url: &str) -> VideoVariant {
        VideoVariant {
            content_type: "video/mp4".into(),
            bitrate,
            url: url.into(),
        }
    }

    #[test]
    fn photo_url_is_original_quality_form() {
        let info =
            extract_media_info(&photo_entry("https://pbs.twimg.com/media/abc.jpg"), "1", 0, &hosts())
                .expect("trusted photo");
        assert_eq!(info.url, "https://pbs.twimg.com/media/abc?format=jpg&name=orig");
        assert_eq!(info.media_type, MediaType::Image);
        assert_eq!(
            info.thumbnail_url.as_deref(),
            Some("https://pbs.twimg.com/media/abc.jpg")
        );
        assert_eq!(info.width, Some(800));
    }

    #[test]
    fn untrusted_photo_is_dropped() {
        let info = extract_media_info(
            &photo_entry("https://evil.com/twimg.com/abc.jpg"),
            "1",
            0,
            &hosts(),
        );
        assert!(info.is_none());
    }

    #[test]
    fn highest_bitrate_mp4_wins_and_null_ranks_lowest() {
        let entry = video_entry(vec![
            mp4(Some(800_000), "https://video.twimg.com/low.mp4"),
            mp4(Some(2_000_000), "https://video.twimg.com/high.mp4"),
            mp4(None, "https://video.twimg.com/unknown.mp4"),
        ]);
        let info = extract_media_info(&entry, "1", 3, &hosts()).expect("video extracted");
        assert_eq!(info.url, "https://video.twimg.com/high.mp4");
        assert_eq!(info.media_type, MediaType::Video);
        assert_eq!(info.index, 3);
    }

    #[test]
    fn extreme_bitrates_compare_without_wrapping() {
        let entry = video_entry(vec![
            mp4(Some(u64::MAX), "https://video.twimg.com/max.mp4"),
            mp4(Some(2_000_000), "https://video.twimg.com/high.mp4"),
            mp4(None, "https://video.twimg.com/unknown.mp4"),
        ]);
        let info = extract_media_info(&entry, "1", 0, &hosts()).expect("video extracted");
        assert_eq!(info.url, "https://video.twimg.com/max.mp4");
    }

    #[test]
    fn hls_only_variant_set_is_rejected() {
        let entry = video_entry(vec![VideoVariant {
            content_type: "application/x-mpegURL".into(),
            bitrate: None,
            url: "https://video.twimg.com/pl/manifest.m3u8".into(),
        }]);
        assert!(extract_media_info(&entry, "1", 0, &hosts()).is_none());
    }

    #[test]
    fn untrusted_playback_variant_drops_record() {
        let entry = video_entry(vec![mp4(
            Some(1_000_000),
            "https://video.twimg.com.evil.net/x.mp4",
        )]);
        assert!(extract_media_info(&entry, "1", 0, &hosts()).is_none());
    }

    #[test]
    fn untrusted_thumbnail_degrades_but_record_survives() {
        let mut entry = video_entry(vec![mp4(Some(64_000), "https://video.twimg.com/ok.mp4")]);
        entry.preview_url = "https://cdn.evil.net/thumb.jpg".into();
        let info = extract_media_info(&entry, "1", 0, &hosts()).expect("record survives");
        assert!(info.thumbnail_url.is_none());
        assert_eq!(info.url, "https://video.twimg.com/ok.mp4");
    }

    #[test]
    fn untrusted_expanded_url_falls_back_to_playback_url() {
        let mut entry = video_entry(vec![mp4(Some(64_000), "https://video.twimg.com/ok.mp4")]);
        entry.expanded_url = Some("https://phish.example/x/status/1".into());
        let info = extract_media_info(&entry, "1", 0, &hosts()).expect("record survives");
        assert_eq!(info.original_url, "https://video.twimg.com/ok.mp4");
    }

    #[test]
    fn trusted_expanded_url_is_kept_as_original() {
        let mut entry = photo_entry("https://pbs.twimg.com/media/abc.jpg");
        entry.expanded_url = Some("https://x.com/alice/status/1/photo/1".into());
        let info = extract_media_info(&entry, "1", 0, &hosts()).expect("photo extracted");
        assert_eq!(info.original_url, "https://x.com/alice/status/1/photo/1");
    }

    #[test]
    fn gif_maps_to_gif_type() {
        let mut entry = video_entry(vec![mp4(None, "https://video.twimg.com/tweet_video/g.mp4")]);
        entry.kind = MediaKind::AnimatedGif;
        let info = extract_media_info(&entry, "1", 0, &hosts()).expect("gif extracted");
        assert_eq!(info.media_type, MediaType::Gif);
    }

    #[test]
    fn extensionless_preview_still_gets_orig_query() {
        let url = original_quality_url("https://pbs.twimg.com/media/abc").unwrap();
        assert_eq!(url, "https://pbs.twimg.com/media/abc?name=orig");
    }
}
