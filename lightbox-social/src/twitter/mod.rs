//! Twitter/X integration surface: the tweet-detail API wrapper, tweet-tree
//! navigation over the GraphQL response, and media entry extraction.
pub mod client;
pub mod media;
pub mod navigate;
pub mod types;

pub use client::TweetDetailApi;
