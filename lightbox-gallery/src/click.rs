//! Click-to-index resolution over a resolved media list.
//!
//! Strategies are a plain ordered list of `(name, confidence, fn)` tuples —
//! no inheritance, no state. Each strategy is pure over its inputs: no DOM,
//! no network, no mutation. A miss is reported as `None`; the open-at-0
//! fallback is the caller's documented policy, applied at the service layer
//! so the miss stays observable here.

use url::Url;

use lightbox_social::twitter::types::MediaInfo;

/// URL extracted from the clicked DOM node by the UI collaborator.
/// Constructed at click time, consumed once, discarded.
#[derive(Debug, Clone, Default)]
pub struct ClickCandidate {
    pub extracted_url: Option<String>,
}

pub struct ClickStrategy {
    pub name: &'static str,
    pub confidence: u8,
    pub matcher: fn(&str, &[MediaInfo]) -> Option<usize>,
}

/// Ordered by descending confidence; first match wins.
pub const STRATEGIES: &[ClickStrategy] = &[ClickStrategy {
    name: "direct-media",
    confidence: 99,
    matcher: direct_media_match,
}];

/// Resolve which media item a click corresponds to.
///
/// Returns the 0-based index into `media`, or `None` when the candidate
/// carries no URL or no strategy matches.
pub fn resolve_click_index(candidate: &ClickCandidate, media: &[MediaInfo]) -> Option<usize> {
    let url = candidate.extracted_url.as_deref()?;
    for strategy in STRATEGIES {
        if let Some(index) = (strategy.matcher)(url, media) {
            tracing::debug!(
                strategy = strategy.name,
                confidence = strategy.confidence,
                index,
                "click.matched"
            );
            return Some(index);
        }
    }
    tracing::debug!(url, "click.no_match");
    None
}

/// Exact URL match first (lowest index wins), then a query-stripped basename
/// comparison as the fallback. Exact always beats normalized, even when the
/// normalized pass would match an earlier index.
fn direct_media_match(url: &str, media: &[MediaInfo]) -> Option<usize> {
    if let Some(index) = media.iter().position(|m| {
        m.url == url || m.original_url == url || m.thumbnail_url.as_deref() == Some(url)
    }) {
        return Some(index);
    }

    let clicked = normalized_basename(url)?;
    media.iter().position(|m| {
        [
            Some(m.url.as_str()),
            Some(m.original_url.as_str()),
            m.thumbnail_url.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|u| normalized_basename(u).as_deref() == Some(clicked.as_str()))
    })
}

/// Last non-empty path segment with the query string stripped.
fn normalized_basename(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()
        .map(str::to_string)
}
