//! Platform extraction slice: trusted-host validation, tweet-tree
//! navigation, and media entry extraction.
//!
//! Only the Twitter/X pipeline is implemented. The navigator tolerates the
//! wrapper-shape drift of the GraphQL tweet-detail API; the extractor never
//! emits a URL that has not passed the hostname allow-list.
pub mod hosts;
pub mod twitter;
