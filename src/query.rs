//! Query parsing, record matching and relevance scoring.

pub mod matcher;
pub mod monetary;
pub mod parser;
pub mod scorer;

// Re-export commonly used types
pub use matcher::{
    RecordText, matches_boolean_query, matches_monetary_query, matches_parsed, matches_query,
    matches_query_with_monetary_support,
};
pub use monetary::{
    AmountRange, MonetaryAmount, MonetaryQuery, MonetaryTokens, extract_monetary_tokens,
    has_monetary_potential, is_close_match, matches_monetary_string, parse_monetary_query,
};
pub use parser::{BooleanOperator, ParsedQuery, extract_search_terms_from_query, parse_query};
pub use scorer::{
    ScoredRecord, calculate_boolean_score, calculate_monetary_relevance_score,
    calculate_relevance_score, score_parsed, sort_by_recency, sort_by_relevance,
};
