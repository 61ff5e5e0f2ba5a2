//! HTML highlighting of query matches.
//!
//! Output is always escaped HTML. Matches are wrapped in
//! `<mark class="...">` and marks never overlap: each pattern only claims
//! text no earlier pattern has claimed.

pub mod cache;
pub mod highlighter;
pub mod marks;

pub use cache::{CacheKey, HighlightCache};
pub use highlighter::{
    DEFAULT_CACHE_CAPACITY, HighlightMode, Highlighter, MONETARY_EXACT_CLASS,
    MONETARY_PARTIAL_CLASS, MONETARY_RANGE_CLASS, MONETARY_TEXT_CLASS, TEXT_CLASS,
    highlight_monetary, highlight_text,
};
pub use marks::{MarkSpan, Occupancy, escape_html};
