//! Text analysis for queries.
//!
//! Query text is only ever split on whitespace and lowercased: there is no
//! stemming and no punctuation stripping.

pub mod tokenizer;
