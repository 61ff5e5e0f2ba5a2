//! Boolean query parser.
//!
//! Queries may combine sub-queries with the uppercase keywords `AND`, `OR`
//! and `NOT`. Parsing splits greedily on the *first* occurrence of a
//! keyword, trying `AND`, then `OR`, then `NOT`, and recurses on both
//! halves. This is not operator-precedence parsing: `a AND b OR c` becomes
//! `a AND (b OR c)` while `a OR b AND c` becomes `(a OR b) AND c`.
//!
//! Anything that does not split is a [`ParsedQuery::Simple`] leaf, so
//! parsing never fails.
//!
//! ```
//! use recordseek::query::parser::{parse_query, BooleanOperator, ParsedQuery};
//!
//! let parsed = parse_query("lumber AND maple");
//! assert!(matches!(
//!     parsed,
//!     ParsedQuery::Boolean { operator: BooleanOperator::And, .. }
//! ));
//! assert_eq!(parse_query(" lumber "), ParsedQuery::Simple("lumber".into()));
//! ```

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::tokenize;

lazy_static! {
    static ref AND_PATTERN: Regex = Regex::new(r"^(.+?)\s+AND\s+(.+)$").unwrap();
    static ref OR_PATTERN: Regex = Regex::new(r"^(.+?)\s+OR\s+(.+)$").unwrap();
    static ref NOT_PATTERN: Regex = Regex::new(r"^(.+?)\s+NOT\s+(.+)$").unwrap();
    static ref NOT_PREFIX_PATTERN: Regex = Regex::new(r"^NOT\s+(.+)$").unwrap();
}

/// Boolean keyword joining two sub-queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOperator {
    And,
    Or,
    Not,
}

impl BooleanOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOperator::And => "AND",
            BooleanOperator::Or => "OR",
            BooleanOperator::Not => "NOT",
        }
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsedQuery {
    /// Plain query text, matched token by token.
    Simple(String),
    /// Two sub-queries joined by an operator.
    ///
    /// `right` is `None` only for a leading `NOT`, which negates `left`.
    /// `NOT` with both sides means `left AND NOT right`.
    Boolean {
        operator: BooleanOperator,
        left: Box<ParsedQuery>,
        right: Option<Box<ParsedQuery>>,
    },
}

impl ParsedQuery {
    fn binary(operator: BooleanOperator, left: &str, right: &str) -> Self {
        ParsedQuery::Boolean {
            operator,
            left: Box::new(parse_query(left)),
            right: Some(Box::new(parse_query(right))),
        }
    }

    /// Whether this expression contains any operator.
    pub fn is_boolean(&self) -> bool {
        matches!(self, ParsedQuery::Boolean { .. })
    }

    /// Text of every `Simple` leaf, left to right.
    pub fn leaves(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a str>) {
        match self {
            ParsedQuery::Simple(text) => leaves.push(text),
            ParsedQuery::Boolean { left, right, .. } => {
                left.collect_leaves(leaves);
                if let Some(right) = right {
                    right.collect_leaves(leaves);
                }
            }
        }
    }
}

impl fmt::Display for ParsedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedQuery::Simple(text) => write!(f, "{text}"),
            ParsedQuery::Boolean {
                operator,
                left,
                right: Some(right),
            } => write!(f, "({left} {operator} {right})"),
            ParsedQuery::Boolean {
                operator,
                left,
                right: None,
            } => write!(f, "({operator} {left})"),
        }
    }
}

/// Parse raw query text into a [`ParsedQuery`].
pub fn parse_query(query: &str) -> ParsedQuery {
    let trimmed = query.trim();

    if let Some(caps) = AND_PATTERN.captures(trimmed) {
        return ParsedQuery::binary(BooleanOperator::And, &caps[1], &caps[2]);
    }
    if let Some(caps) = OR_PATTERN.captures(trimmed) {
        return ParsedQuery::binary(BooleanOperator::Or, &caps[1], &caps[2]);
    }
    if let Some(caps) = NOT_PATTERN.captures(trimmed) {
        return ParsedQuery::binary(BooleanOperator::Not, &caps[1], &caps[2]);
    }
    if let Some(caps) = NOT_PREFIX_PATTERN.captures(trimmed) {
        return ParsedQuery::Boolean {
            operator: BooleanOperator::Not,
            left: Box::new(parse_query(&caps[1])),
            right: None,
        };
    }

    ParsedQuery::Simple(trimmed.to_string())
}

/// Distinct lowercase tokens of every leaf of a (possibly boolean) query,
/// in first-seen order.
pub fn extract_search_terms_from_query(query: &str) -> Vec<String> {
    let parsed = parse_query(query);
    let mut terms: Vec<String> = Vec::new();
    for leaf in parsed.leaves() {
        for token in tokenize(leaf) {
            if !terms.contains(&token) {
                terms.push(token);
            }
        }
    }
    terms
}
