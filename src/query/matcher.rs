//! Record matching.
//!
//! Decides whether a record satisfies a query. Plain text matching requires
//! every query token to be a substring of the record's haystack. Monetary
//! matching looks at the amounts of financial records. Boolean expressions
//! combine both per leaf.
//!
//! Quick-navigation (`Buildertrend`) records bypass all of this and match
//! only when the query equals one of their trigger phrases.

use std::cell::OnceCell;

use crate::analysis::tokenizer::tokenize;
use crate::query::monetary::{
    MonetaryTokens, extract_monetary_tokens, has_monetary_potential, parse_monetary_query,
};
use crate::query::parser::{BooleanOperator, ParsedQuery};
use crate::record::field_metadata::{
    FieldMetadata, LINE_ITEM_DESCRIPTION, LINE_ITEM_QUANTITY, LINE_ITEM_TITLE, LINE_ITEM_TOTAL,
    LINE_ITEM_UNIT_PRICE,
};
use crate::record::{FinancialRecord, LineItem, Record};
use crate::util::number::format_plain;

/// A record with its lowercased text computed at most once.
///
/// Boolean queries evaluate several leaves against the same record; this
/// keeps the haystack from being rebuilt for each of them.
#[derive(Debug)]
pub struct RecordText<'a> {
    record: &'a Record,
    haystack: OnceCell<String>,
    title: OnceCell<String>,
    summary: OnceCell<String>,
}

impl<'a> RecordText<'a> {
    pub fn new(record: &'a Record) -> Self {
        RecordText {
            record,
            haystack: OnceCell::new(),
            title: OnceCell::new(),
            summary: OnceCell::new(),
        }
    }

    pub fn record(&self) -> &'a Record {
        self.record
    }

    pub fn haystack(&self) -> &str {
        self.haystack.get_or_init(|| self.record.haystack())
    }

    pub fn title(&self) -> &str {
        self.title.get_or_init(|| self.record.title().to_lowercase())
    }

    pub fn summary(&self) -> &str {
        self.summary.get_or_init(|| self.record.summary().to_lowercase())
    }
}

fn flagged_line_item_text(item: &LineItem, metadata: &FieldMetadata, visible: bool) -> String {
    let mut parts: Vec<String> = Vec::new();
    if metadata.is_monetary(LINE_ITEM_TITLE) {
        parts.push(item.title.clone());
    }
    if metadata.is_monetary(LINE_ITEM_DESCRIPTION) {
        parts.push(item.description.clone());
    }
    if visible && metadata.is_monetary(LINE_ITEM_TOTAL) {
        parts.push(format_plain(item.total));
    }
    if visible && metadata.is_monetary(LINE_ITEM_UNIT_PRICE) {
        parts.push(format_plain(item.unit_price));
    }
    if metadata.is_monetary(LINE_ITEM_QUANTITY) {
        parts.push(format_plain(item.quantity));
    }
    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Lowercased text of the line-item fields flagged as monetary.
pub(crate) fn monetary_line_item_text(item: &LineItem, metadata: &FieldMetadata) -> String {
    flagged_line_item_text(item, metadata, true)
}

/// Implicit-query fallback: some line item's monetary-flagged text contains
/// every text token.
///
/// A purely numeric query has no text tokens; its amounts are looked up
/// instead, but only in flagged fields other than totals and unit prices,
/// which the amount comparison already covered.
fn matches_monetary_text_fallback(financial: &FinancialRecord, tokens: &MonetaryTokens) -> bool {
    let (terms, visible): (Vec<&str>, bool) = if tokens.text_tokens.is_empty() {
        (tokens.amounts.iter().map(|a| a.text.as_str()).collect(), false)
    } else {
        (tokens.text_tokens.iter().map(String::as_str).collect(), true)
    };
    if terms.is_empty() {
        return false;
    }
    let metadata = &financial.header.field_metadata;
    financial.line_items.iter().any(|item| {
        let text = flagged_line_item_text(item, metadata, visible);
        !text.is_empty() && terms.iter().all(|term| text.contains(term))
    })
}

fn matches_text(text: &RecordText<'_>, query: &str) -> bool {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return true;
    }
    let haystack = text.haystack();
    tokens.iter().all(|token| haystack.contains(token.as_str()))
}

fn matches_monetary(record: &Record, query: &str) -> bool {
    let monetary = parse_monetary_query(query);
    let tokens = extract_monetary_tokens(query);
    if tokens.is_empty() {
        return true;
    }

    let Some(financial) = record.as_financial() else {
        return false;
    };

    if let Some(range) = tokens.range {
        return financial.visible_amounts().any(|value| range.contains(value));
    }

    let amount_hit = tokens
        .amounts
        .iter()
        .any(|amount| financial.visible_amounts().any(|value| amount.matches(value)));
    if amount_hit {
        return true;
    }

    // An explicit `$` query never falls back to descriptions or quantities.
    if monetary.is_monetary {
        return false;
    }

    matches_monetary_text_fallback(financial, &tokens)
}

fn matches_leaf(text: &RecordText<'_>, query: &str) -> bool {
    let record = text.record();
    if let Some(quick_nav) = record.as_buildertrend() {
        return quick_nav.is_triggered_by(query);
    }

    if parse_monetary_query(query).is_monetary {
        return matches_monetary(record, query);
    }
    if matches_text(text, query) {
        return true;
    }
    has_monetary_potential(query) && matches_monetary(record, query)
}

fn matches_expression(text: &RecordText<'_>, parsed: &ParsedQuery) -> bool {
    match parsed {
        ParsedQuery::Simple(query) => matches_leaf(text, query),
        ParsedQuery::Boolean {
            operator: BooleanOperator::Not,
            left,
            right: None,
        } => !matches_expression(text, left),
        ParsedQuery::Boolean {
            operator: BooleanOperator::Not,
            left,
            right: Some(right),
        } => matches_expression(text, left) && !matches_expression(text, right),
        ParsedQuery::Boolean {
            operator: BooleanOperator::And,
            left,
            right,
        } => {
            matches_expression(text, left)
                && right.as_ref().is_none_or(|right| matches_expression(text, right))
        }
        ParsedQuery::Boolean {
            operator: BooleanOperator::Or,
            left,
            right,
        } => {
            matches_expression(text, left)
                || right.as_ref().is_some_and(|right| matches_expression(text, right))
        }
    }
}

/// Plain text match: every query token is a substring of the haystack.
/// An empty query matches every record.
pub fn matches_query(record: &Record, query: &str) -> bool {
    if let Some(quick_nav) = record.as_buildertrend() {
        return quick_nav.is_triggered_by(query);
    }
    matches_text(&RecordText::new(record), query)
}

/// Monetary match against a financial record's total, line totals and unit
/// prices.
///
/// Ranges match when any of those values falls inside. Amounts match by
/// closeness or progressive restriction. Implicit queries (no `$`) may also
/// match line-item text flagged as monetary.
pub fn matches_monetary_query(record: &Record, query: &str) -> bool {
    if let Some(quick_nav) = record.as_buildertrend() {
        return quick_nav.is_triggered_by(query);
    }
    matches_monetary(record, query)
}

/// Text match with a monetary fallback for queries that look numeric.
/// Explicit `$` queries are matched as amounts only.
pub fn matches_query_with_monetary_support(record: &Record, query: &str) -> bool {
    matches_leaf(&RecordText::new(record), query)
}

/// Evaluate a parsed expression against a record.
pub fn matches_boolean_query(record: &Record, parsed: &ParsedQuery) -> bool {
    matches_parsed(&RecordText::new(record), parsed)
}

/// Same as [`matches_boolean_query`], reusing cached record text.
///
/// Quick-navigation records only ever match a single trigger phrase, never
/// a composed expression.
pub fn matches_parsed(text: &RecordText<'_>, parsed: &ParsedQuery) -> bool {
    if text.record().as_buildertrend().is_some() && parsed.is_boolean() {
        return false;
    }
    matches_expression(text, parsed)
}
