//! Navigation over the nested GraphQL tweet-detail response.
//!
//! The wrapper shape around the tweet node varies release-to-release:
//! sometimes `data.tweetResult.result` is the tweet, sometimes it is wrapped
//! one level under `.tweet`, and quoted tweets can arrive inside a
//! `TweetWithVisibilityResults` envelope. Rather than a rigid type, the
//! navigator carries an ordered list of named unwrap attempts and takes the
//! first node that structurally looks like a tweet.

use serde_json::Value;

use crate::twitter::types::{ApiMediaEntry, RawMediaEntry, ResolvedTweet, SourceLocation};

/// Quote nesting beyond this depth is a firm non-goal and ignored.
const MAX_QUOTE_DEPTH: u8 = 1;

type Projection = for<'a> fn(&'a Value) -> Option<&'a Value>;

/// Unwrap attempts, tried in order. Each is a pure projection; adding a new
/// wrapper shape when the upstream API drifts again means adding one row.
const UNWRAP_ATTEMPTS: &[(&str, Projection)] = &[
    ("direct", project_direct),
    ("tweet_wrapper", project_tweet_wrapper),
    ("visibility_wrapper", project_visibility_wrapper),
];

fn project_direct(node: &Value) -> Option<&Value> {
    Some(node)
}

fn project_tweet_wrapper(node: &Value) -> Option<&Value> {
    node.get("tweet")
}

fn project_visibility_wrapper(node: &Value) -> Option<&Value> {
    match node.get("__typename").and_then(Value::as_str) {
        Some("TweetWithVisibilityResults") => node.get("tweet"),
        _ => None,
    }
}

fn looks_like_tweet(node: &Value) -> bool {
    node.get("legacy").is_some() && node.pointer("/core/user_results").is_some()
}

fn unwrap_tweet_node(result: &Value) -> Option<&Value> {
    for &(name, project) in UNWRAP_ATTEMPTS {
        if let Some(node) = project(result) {
            if looks_like_tweet(node) {
                tracing::trace!(attempt = name, "navigate.unwrapped");
                return Some(node);
            }
        }
    }
    tracing::debug!("navigate.no_tweet_node");
    None
}

/// Normalize a tweet-detail response into a [`ResolvedTweet`].
///
/// Accepts either a full response (`data.tweetResult.result` present) or a
/// bare result node. Structural misses are non-fatal and yield partial
/// results; the one hard rule is that a tweet whose author handle cannot be
/// resolved is not actionable and maps to `None`.
pub fn resolve_tweet(api_response: &Value) -> Option<ResolvedTweet> {
    let result = api_response
        .pointer("/data/tweetResult/result")
        .unwrap_or(api_response);
    resolve_node(result, 0)
}

fn resolve_node(result: &Value, depth: u8) -> Option<ResolvedTweet> {
    let node = unwrap_tweet_node(result)?;

    let Some(author) = node
        .pointer("/core/user_results/result/legacy/screen_name")
        .and_then(Value::as_str)
    else {
        tracing::warn!("navigate.author_missing");
        return None;
    };

    // Present by `looks_like_tweet`.
    let legacy = node.get("legacy")?;

    let id = node
        .get("rest_id")
        .and_then(Value::as_str)
        .or_else(|| legacy.get("id_str").and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    let text = legacy
        .get("full_text")
        .or_else(|| legacy.get("text"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let source_location = if depth == 0 {
        SourceLocation::Original
    } else {
        SourceLocation::Quoted
    };
    let media_entries = media_entries(legacy, source_location);

    let quoted = if depth < MAX_QUOTE_DEPTH {
        node.get("quoted_status_result")
            .and_then(|q| q.get("result"))
            .and_then(|r| resolve_node(r, depth + 1))
            .filter(|q| {
                let self_reference = !id.is_empty() && q.id == id;
                if self_reference {
                    tracing::warn!(tweet_id = %id, "navigate.quoted_self_reference_dropped");
                }
                !self_reference
            })
            .map(Box::new)
    } else {
        None
    };

    Some(ResolvedTweet {
        id,
        author_handle: Some(author.to_string()),
        text,
        media_entries,
        quoted,
    })
}

/// Media entries from `extended_entities.media`, falling back to
/// `entities.media`. Entries that fail to deserialize are skipped.
fn media_entries(legacy: &Value, source_location: SourceLocation) -> Vec<RawMediaEntry> {
    let list = legacy
        .pointer("/extended_entities/media")
        .or_else(|| legacy.pointer("/entities/media"))
        .and_then(Value::as_array);
    let Some(list) = list else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|v| serde_json::from_value::<ApiMediaEntry>(v.clone()).ok())
        .filter_map(|raw| RawMediaEntry::from_api(raw, source_location))
        .collect()
}
