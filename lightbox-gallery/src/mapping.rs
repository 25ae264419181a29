//! Page-type-aware orchestration of navigation and extraction.
//!
//! This is the hard boundary of the pipeline: whatever goes wrong inside a
//! strategy — fetch failure, unresolvable payload, missing tweet id — is
//! caught here, logged, and surfaced to the caller as `None`. Interactive
//! callers degrade to "open the gallery at the first item", never to an
//! error dialog.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use lightbox_common::{GalleryError, Result};
use lightbox_social::twitter::media::extract_media_info;
use lightbox_social::twitter::navigate::resolve_tweet;
use lightbox_social::twitter::types::MediaInfo;
use lightbox_social::twitter::TweetDetailApi;

use crate::click::{resolve_click_index, ClickCandidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    Timeline,
    PhotoDetail,
    VideoDetail,
}

/// What the DOM collaborator knows about the click.
#[derive(Debug, Clone, Default)]
pub struct ClickedElement {
    /// Tweet id recovered from the surrounding timeline article, if any.
    pub tweet_id: Option<String>,
    /// URL of the page the click happened on.
    pub page_url: String,
    /// Best-effort media URL extracted from the clicked node or its
    /// ancestors (background-image unwrapping included, upstream of here).
    pub extracted_url: Option<String>,
}

/// Resolved, validated media list for one tweet. Immutable once produced;
/// owned by the gallery session.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MediaMapping {
    pub tweet_id: String,
    pub author_handle: Option<String>,
    pub media: Vec<MediaInfo>,
    #[serde(skip)]
    generation: u64,
}

impl MediaMapping {
    /// Initial gallery position for the click that produced this mapping,
    /// applying the documented open-at-0 policy on a miss.
    pub fn initial_index(&self, candidate: &ClickCandidate) -> usize {
        resolve_click_index(candidate, &self.media).unwrap_or(0)
    }
}

/// Network collaborator seam: anything that can produce a tweet-detail
/// payload for an id. The live implementation is [`TweetDetailApi`]; tests
/// inject stubs.
#[async_trait]
pub trait TweetSource: Send + Sync {
    async fn tweet_detail(&self, tweet_id: &str) -> anyhow::Result<Value>;
}

#[async_trait]
impl TweetSource for TweetDetailApi {
    async fn tweet_detail(&self, tweet_id: &str) -> anyhow::Result<Value> {
        TweetDetailApi::tweet_detail(self, tweet_id).await
    }
}

pub struct MediaMappingService {
    source: Arc<dyn TweetSource>,
    trusted_hosts: Vec<String>,
    /// Monotonic call counter; lets callers detect a slow stale response
    /// racing a fresher one. See [`MediaMappingService::is_stale`].
    generation: AtomicU64,
}

impl MediaMappingService {
    pub fn new(source: Arc<dyn TweetSource>, trusted_hosts: Vec<String>) -> Self {
        Self {
            source,
            trusted_hosts,
            generation: AtomicU64::new(0),
        }
    }

    /// Map a click to the tweet's validated media list.
    ///
    /// Hard boundary: any error inside is logged and mapped to `None`.
    pub async fn map_media(
        &self,
        clicked: &ClickedElement,
        page_type: PageType,
    ) -> Option<MediaMapping> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        match self.try_map(clicked, page_type, generation).await {
            Ok(mapping) => Some(mapping),
            Err(err) => {
                tracing::warn!(?page_type, error = %err, "mapping.failed");
                None
            }
        }
    }

    /// Whether a newer `map_media` call has started since `mapping` was
    /// produced. Callers discard stale mappings instead of overwriting a
    /// fresher gallery state with a slow response.
    pub fn is_stale(&self, mapping: &MediaMapping) -> bool {
        self.generation.load(Ordering::SeqCst) > mapping.generation
    }

    async fn try_map(
        &self,
        clicked: &ClickedElement,
        page_type: PageType,
        generation: u64,
    ) -> Result<MediaMapping> {
        let tweet_id = tweet_id_for(page_type, clicked).ok_or_else(|| {
            GalleryError::Strategy(format!("no tweet id resolvable on {page_type:?} page"))
        })?;

        let payload = self
            .source
            .tweet_detail(&tweet_id)
            .await
            .map_err(GalleryError::Fetch)?;

        let tweet = resolve_tweet(&payload).ok_or_else(|| {
            GalleryError::Strategy(format!("payload for {tweet_id} did not resolve to a tweet"))
        })?;

        // Flattened contract order: originals first, quoted appended after.
        // Index equals the record's final position so the gallery can use it
        // directly as a scroll target.
        let mut media: Vec<MediaInfo> = Vec::new();
        for entry in tweet.media_in_order() {
            let index = media.len();
            if let Some(info) = extract_media_info(entry, &tweet.id, index, &self.trusted_hosts) {
                media.push(info);
            }
        }

        tracing::debug!(
            tweet_id = %tweet.id,
            media_count = media.len(),
            has_quote = tweet.quoted.is_some(),
            "mapping.resolved"
        );

        Ok(MediaMapping {
            tweet_id: tweet.id.clone(),
            author_handle: tweet.author_handle.clone(),
            media,
            generation,
        })
    }
}

/// Per-page-type tweet id strategy. Detail pages carry the id in the URL
/// path; timeline clicks rely on the DOM collaborator.
fn tweet_id_for(page_type: PageType, clicked: &ClickedElement) -> Option<String> {
    match page_type {
        PageType::Timeline => clicked
            .tweet_id
            .clone()
            .or_else(|| tweet_id_from_url(&clicked.page_url)),
        PageType::PhotoDetail | PageType::VideoDetail => tweet_id_from_url(&clicked.page_url)
            .or_else(|| clicked.tweet_id.clone()),
    }
}

/// Numeric id following a `status` path segment, e.g.
/// `https://x.com/alice/status/123/photo/1` -> `123`.
pub fn tweet_id_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let mut segments = url.path_segments()?;
    while let Some(segment) = segments.next() {
        if segment == "status" {
            let id = segments.next()?;
            if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
                return Some(id.to_string());
            }
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StubSource(Value);

    #[async_trait]
    impl TweetSource for StubSource {
        async fn tweet_detail(&self, _tweet_id: &str) -> anyhow::Result<Value> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TweetSource for FailingSource {
        async fn tweet_detail(&self, tweet_id: &str) -> anyhow::Result<Value> {
            anyhow::bail!("boom fetching {tweet_id}")
        }
    }

    fn hosts() -> Vec<String> {
        vec!["twimg.com".into(), "x.com".into(), "twitter.com".into()]
    }

    fn simple_payload(id: &str) -> Value {
        json!({ "data": { "tweetResult": { "result": {
            "rest_id": id,
            "core": { "user_results": { "result": { "legacy": { "screen_name": "alice" } } } },
            "legacy": {
                "full_text": "hello",
                "extended_entities": { "media": [{
                    "id_str": "m1",
                    "type": "photo",
                    "media_url_https": "https://pbs.twimg.com/media/abc.jpg"
                }]}
            }
        }}}})
    }

    #[test]
    fn detail_pages_take_the_id_from_the_url() {
        let clicked = ClickedElement {
            tweet_id: Some("999".into()),
            page_url: "https://x.com/alice/status/123/photo/1".into(),
            extracted_url: None,
        };
        assert_eq!(
            tweet_id_for(PageType::PhotoDetail, &clicked).as_deref(),
            Some("123")
        );
        assert_eq!(
            tweet_id_for(PageType::VideoDetail, &clicked).as_deref(),
            Some("123")
        );
        // Timeline prefers the DOM-recovered id.
        assert_eq!(
            tweet_id_for(PageType::Timeline, &clicked).as_deref(),
            Some("999")
        );
    }

    #[test]
    fn tweet_id_from_url_rejects_non_numeric_ids() {
        assert_eq!(tweet_id_from_url("https://x.com/a/status/12x"), None);
        assert_eq!(tweet_id_from_url("https://x.com/a/status/"), None);
        assert_eq!(tweet_id_from_url("https://x.com/a"), None);
        assert_eq!(tweet_id_from_url("not a url"), None);
        assert_eq!(
            tweet_id_from_url("https://x.com/a/status/42").as_deref(),
            Some("42")
        );
    }

    #[tokio::test]
    async fn maps_a_timeline_click() {
        let service = MediaMappingService::new(Arc::new(StubSource(simple_payload("1"))), hosts());
        let clicked = ClickedElement {
            tweet_id: Some("1".into()),
            page_url: "https://x.com/home".into(),
            extracted_url: None,
        };
        let mapping = service
            .map_media(&clicked, PageType::Timeline)
            .await
            .expect("mapping produced");
        assert_eq!(mapping.tweet_id, "1");
        assert_eq!(mapping.author_handle.as_deref(), Some("alice"));
        assert_eq!(mapping.media.len(), 1);
        assert_eq!(mapping.media[0].index, 0);
    }

    #[tokio::test]
    async fn fetch_errors_are_swallowed_at_the_boundary() {
        let service = MediaMappingService::new(Arc::new(FailingSource), hosts());
        let clicked = ClickedElement {
            tweet_id: Some("1".into()),
            ..Default::default()
        };
        assert!(service.map_media(&clicked, PageType::Timeline).await.is_none());
    }

    #[tokio::test]
    async fn unresolvable_payload_maps_to_none() {
        let service =
            MediaMappingService::new(Arc::new(StubSource(json!({ "data": {} }))), hosts());
        let clicked = ClickedElement {
            tweet_id: Some("1".into()),
            ..Default::default()
        };
        assert!(service.map_media(&clicked, PageType::Timeline).await.is_none());
    }

    #[tokio::test]
    async fn missing_tweet_id_maps_to_none() {
        let service = MediaMappingService::new(Arc::new(StubSource(simple_payload("1"))), hosts());
        let clicked = ClickedElement::default();
        assert!(service.map_media(&clicked, PageType::Timeline).await.is_none());
    }

    #[tokio::test]
    async fn earlier_mapping_goes_stale_when_a_newer_call_starts() {
        let service = MediaMappingService::new(Arc::new(StubSource(simple_payload("1"))), hosts());
        let clicked = ClickedElement {
            tweet_id: Some("1".into()),
            ..Default::default()
        };
        let first = service
            .map_media(&clicked, PageType::Timeline)
            .await
            .unwrap();
        assert!(!service.is_stale(&first));

        let second = service
            .map_media(&clicked, PageType::Timeline)
            .await
            .unwrap();
        assert!(service.is_stale(&first));
        assert!(!service.is_stale(&second));
    }

    #[tokio::test]
    async fn initial_index_applies_open_at_zero_policy() {
        let service = MediaMappingService::new(Arc::new(StubSource(simple_payload("1"))), hosts());
        let clicked = ClickedElement {
            tweet_id: Some("1".into()),
            ..Default::default()
        };
        let mapping = service
            .map_media(&clicked, PageType::Timeline)
            .await
            .unwrap();
        let miss = ClickCandidate {
            extracted_url: Some("https://pbs.twimg.com/media/unrelated.png".into()),
        };
        assert_eq!(mapping.initial_index(&miss), 0);
    }
}
