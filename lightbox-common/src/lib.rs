//! Shared error types and observability helpers for the Lightbox crates.
//!
//! This crate is intentionally small so every other member can depend on it
//! without pulling in the HTTP or extraction stacks: a single error taxonomy
//! for the mapping boundary and the centralised `tracing` initialiser.

pub mod observability;

/// Error taxonomy for the media-mapping boundary.
///
/// Lower layers (navigator, extractor, validator) never construct these for
/// data-shape problems — they return `None`/empty/`false`. These variants
/// exist for the genuinely exceptional paths that the mapping service must
/// catch and log before degrading to "no mapping".
#[derive(thiserror::Error, Debug)]
pub enum GalleryError {
    /// A page-type strategy could not even get started (no tweet id, etc.).
    #[error("strategy error: {0}")]
    Strategy(String),

    /// The tweet-detail fetch collaborator reported an error.
    #[error("fetch error: {0}")]
    Fetch(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation exceeded the configured timeout.
    #[error("timeout occurred")]
    Timeout,
}

/// Convenient alias for results that use [`GalleryError`].
pub type Result<T> = std::result::Result<T, GalleryError>;
