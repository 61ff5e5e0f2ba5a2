//! # recordseek
//!
//! Query matching and relevance ranking over an in-memory corpus of business
//! records: invoices, bills, purchase orders, receipts, payments, documents,
//! people, organizations and daily logs.
//!
//! ## Features
//!
//! - Boolean queries with `AND`, `OR` and `NOT`
//! - Currency-aware matching with progressive restriction and `$N-$N` ranges
//! - Additive relevance scoring with monetary tiers
//! - Facet counts, facet filtering and grouped results
//! - Non-overlapping HTML highlighting with a bounded cache
//!
//! ```
//! use recordseek::prelude::*;
//!
//! let engine = SearchEngine::new(Vec::new(), SearchConfig::default()).unwrap();
//! let results = engine.search("lumber", &FacetSelections::new(), None);
//! assert_eq!(results.total_results, 0);
//! ```

pub mod analysis;
pub mod cli;
pub mod error;
pub mod highlight;
pub mod query;
pub mod record;
pub mod search;
pub mod util;

pub mod prelude {
    pub use crate::error::{RecordSeekError, Result};
    pub use crate::highlight::{HighlightMode, Highlighter};
    pub use crate::query::{ParsedQuery, ScoredRecord, parse_query};
    pub use crate::record::{Corpus, EntityType, Record};
    pub use crate::search::{
        FacetKey, FacetSelections, GroupBy, GroupLimits, RequestTicket, SearchConfig,
        SearchEngine, SearchResults,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
