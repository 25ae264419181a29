//! Gallery-side consumers of the extraction pipeline: click-to-index
//! resolution and the page-type-aware media mapping service.
pub mod click;
pub mod mapping;

pub use click::{resolve_click_index, ClickCandidate};
pub use mapping::{ClickedElement, MediaMapping, MediaMappingService, PageType, TweetSource};
