//! Search engine, facets and result grouping.

pub mod config;
pub mod engine;
pub mod facet;
pub mod group;

pub use self::config::{GroupLimits, SearchConfig};
pub use self::engine::{RequestTicket, SearchEngine, SearchResults};
pub use self::facet::{
    FacetCounts, FacetKey, FacetSelections, FacetValueCount, GROUP_BY_KEY, compute_facets,
    facet_value, matches_selections,
};
pub use self::group::{
    ENTITY_TYPE_PRIORITY, GroupBy, GroupKey, ResultGroup, apply_group_limits, build_groups,
};
