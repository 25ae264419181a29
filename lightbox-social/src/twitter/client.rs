//! Thin wrapper around the tweet-detail GraphQL endpoint.
//!
//! Shapes the `variables`/`features` query params and delegates transport,
//! retries, and safe logging to the shared HTTP client. The response is
//! returned as raw JSON because the wrapper shape varies; normalisation is
//! the navigator's job.

use anyhow::Result;
use lightbox_http::{HttpClient, RequestOpts};
use serde_json::Value;
use std::borrow::Cow;
use std::time::Duration;

// Rotates with front-end deploys; overridable because stale ids 404.
const DEFAULT_QUERY_ID: &str = "7xdlmKfKUJQP7D7woCL5CA";

#[derive(Clone)]
pub struct TweetDetailApi {
    http: HttpClient,
    bearer: Option<String>,
    query_id: String,
}

impl TweetDetailApi {
    pub fn new(base_url: &str, bearer: Option<String>, timeout_secs: u64) -> Result<Self> {
        // `Url::join` treats the last path segment as a file unless the base
        // ends with a slash.
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let http = HttpClient::new(&base)?.with_timeout(Duration::from_secs(timeout_secs));
        Ok(Self {
            http,
            bearer,
            query_id: DEFAULT_QUERY_ID.to_string(),
        })
    }

    pub fn with_query_id(mut self, query_id: impl Into<String>) -> Self {
        self.query_id = query_id.into();
        self
    }

    /// Fetch the raw tweet-detail payload for `tweet_id`.
    pub async fn tweet_detail(&self, tweet_id: &str) -> Result<Value> {
        let variables = serde_json::json!({
            "tweetId": tweet_id,
            "withCommunity": false,
            "includePromotedContent": false,
            "withVoice": false,
        })
        .to_string();
        let features = serde_json::json!({
            "creator_subscriptions_tweet_preview_api_enabled": true,
            "longform_notetweets_consumption_enabled": true,
            "view_counts_everywhere_api_enabled": true,
            "tweet_awards_web_tipping_enabled": false,
        })
        .to_string();

        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("variables", variables.into()),
            ("features", features.into()),
        ];
        let path = format!("graphql/{}/TweetResultByRestId", self.query_id);

        let resp: Value = self
            .http
            .get_json(
                &path,
                RequestOpts {
                    bearer: self.bearer.as_deref(),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await?;

        tracing::debug!(tweet_id, "twitter.tweet_detail.fetched");
        Ok(resp)
    }
}
