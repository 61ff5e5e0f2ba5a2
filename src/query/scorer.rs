//! Relevance scoring and result ordering.
//!
//! Scores are additive. The text score rewards the query appearing in the
//! title and summary. The monetary score (financial records only) rewards
//! amount matches on fields the user can see, with extra weight for exact
//! values and values near the center of a requested range. Boolean
//! expressions combine leaf scores with `min` for `AND` and `max` for `OR`.

use std::cmp::Ordering;

use serde::{Serialize, Serializer};

use crate::analysis::tokenizer::tokenize;
use crate::query::matcher::{RecordText, matches_parsed, monetary_line_item_text};
use crate::query::monetary::{
    AmountRange, MonetaryAmount, extract_monetary_tokens, has_monetary_potential,
    is_close_match, matches_monetary_string, parse_monetary_query,
};
use crate::query::parser::{BooleanOperator, ParsedQuery};
use crate::record::Record;
use crate::record::field_metadata::{SUMMARY, TITLE};
use crate::util::number::format_plain;

const TITLE_CONTAINS_QUERY: f64 = 100.0;
const TITLE_TOKEN: f64 = 20.0;
const SUMMARY_TOKEN: f64 = 10.0;
const HAYSTACK_TOKEN: f64 = 5.0;
const TITLE_FULL_QUERY: f64 = 50.0;
const SUMMARY_FULL_QUERY: f64 = 25.0;

const VISIBLE_MATCH: f64 = 2000.0;
const VISIBLE_EXACT: f64 = 1000.0;
const NEGATION_MATCH: f64 = 10.0;

/// Tolerances of the exact, near and loose numeric tiers.
const TIER_TOLERANCES: [f64; 3] = [0.0, 0.01, 1.0];

/// Per-field weights of the monetary score.
#[derive(Debug, Clone, Copy)]
struct FieldWeights {
    visible: f64,
    range: f64,
    tiers: [f64; 3],
    progressive: f64,
}

const TOTAL_VALUE: FieldWeights = FieldWeights {
    visible: 500.0,
    range: 800.0,
    tiers: [1000.0, 800.0, 600.0],
    progressive: 750.0,
};

const LINE_ITEM_TOTAL: FieldWeights = FieldWeights {
    visible: 300.0,
    range: 700.0,
    tiers: [900.0, 700.0, 500.0],
    progressive: 650.0,
};

const LINE_ITEM_UNIT_PRICE: FieldWeights = FieldWeights {
    visible: 200.0,
    range: 600.0,
    tiers: [800.0, 600.0, 400.0],
    progressive: 550.0,
};

const LINE_ITEM_TEXT_TOKEN: f64 = 50.0;
const TITLE_TEXT_TOKEN: f64 = 10.0;
const SUMMARY_TEXT_TOKEN: f64 = 5.0;

/// A matched record with its score.
#[derive(Debug, Clone, Copy)]
pub struct ScoredRecord<'a> {
    pub record: &'a Record,
    pub score: f64,
}

impl Serialize for ScoredRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ScoredRecord", 2)?;
        state.serialize_field("id", self.record.id())?;
        state.serialize_field("score", &self.score)?;
        state.end()
    }
}

fn text_score(text: &RecordText<'_>, query: &str) -> f64 {
    let query = query.trim().to_lowercase();
    let tokens = tokenize(&query);
    if tokens.is_empty() {
        return 0.0;
    }

    let title = text.title();
    let summary = text.summary();
    let haystack = text.haystack();
    let mut score = 0.0;

    if title.contains(&query) {
        score += TITLE_CONTAINS_QUERY;
    }
    for token in &tokens {
        if title.contains(token.as_str()) {
            score += TITLE_TOKEN;
        }
        if summary.contains(token.as_str()) {
            score += SUMMARY_TOKEN;
        }
        if haystack.contains(token.as_str()) {
            score += HAYSTACK_TOKEN;
        }
    }
    if title.contains(&query) {
        score += TITLE_FULL_QUERY;
    }
    if summary.contains(&query) {
        score += SUMMARY_FULL_QUERY;
    }
    score
}

fn tier_score(value: f64, amount: &MonetaryAmount, weights: &FieldWeights) -> f64 {
    TIER_TOLERANCES
        .iter()
        .zip(weights.tiers)
        .find(|(tolerance, _)| is_close_match(value, amount.value, **tolerance))
        .map_or(0.0, |(_, points)| points)
}

/// Score contributions of one visible field.
#[derive(Debug, Default)]
struct FieldScore {
    points: f64,
    visible_matches: usize,
    exact: bool,
}

fn score_field(
    value: f64,
    amounts: &[MonetaryAmount],
    range: Option<AmountRange>,
    weights: &FieldWeights,
) -> FieldScore {
    let mut field = FieldScore::default();
    let plain = format_plain(value);

    for amount in amounts {
        if amount.matches(value) {
            field.points += weights.visible;
            field.visible_matches += 1;
            field.exact |= is_close_match(value, amount.value, 0.0);
        }
        field.points += tier_score(value, amount, weights);
        if matches_monetary_string(&amount.text, &plain) {
            field.points += weights.progressive;
        }
    }
    if let Some(range) = range {
        field.points += weights.range * range.proximity(value);
    }
    field
}

fn count_contained(text: &str, tokens: &[String]) -> usize {
    tokens
        .iter()
        .filter(|token| text.contains(token.as_str()))
        .count()
}

fn monetary_score(text: &RecordText<'_>, query: &str) -> f64 {
    let record = text.record();
    let Some(financial) = record.as_financial() else {
        return 0.0;
    };

    let is_explicit = parse_monetary_query(query).is_monetary;
    let tokens = extract_monetary_tokens(query);
    if tokens.is_empty() {
        return 0.0;
    }

    let mut fields = vec![score_field(
        financial.total_value,
        &tokens.amounts,
        tokens.range,
        &TOTAL_VALUE,
    )];
    for item in &financial.line_items {
        fields.push(score_field(item.total, &tokens.amounts, tokens.range, &LINE_ITEM_TOTAL));
        fields.push(score_field(
            item.unit_price,
            &tokens.amounts,
            tokens.range,
            &LINE_ITEM_UNIT_PRICE,
        ));
    }

    let mut score: f64 = fields.iter().map(|field| field.points).sum();
    if fields.iter().any(|field| field.visible_matches > 0) {
        score += VISIBLE_MATCH;
    }
    if fields.iter().any(|field| field.exact) {
        score += VISIBLE_EXACT;
    }

    if !is_explicit && !tokens.text_tokens.is_empty() {
        let metadata = &financial.header.field_metadata;
        for item in &financial.line_items {
            let item_text = monetary_line_item_text(item, metadata);
            score += LINE_ITEM_TEXT_TOKEN * count_contained(&item_text, &tokens.text_tokens) as f64;
        }
        if metadata.is_monetary(TITLE) {
            score += TITLE_TEXT_TOKEN * count_contained(text.title(), &tokens.text_tokens) as f64;
        }
        if metadata.is_monetary(SUMMARY) {
            score +=
                SUMMARY_TEXT_TOKEN * count_contained(text.summary(), &tokens.text_tokens) as f64;
        }
    }

    score
}

fn leaf_score(text: &RecordText<'_>, query: &str) -> f64 {
    let mut score = text_score(text, query);
    if parse_monetary_query(query).is_monetary || has_monetary_potential(query) {
        score += monetary_score(text, query);
    }
    score
}

fn expression_score(text: &RecordText<'_>, parsed: &ParsedQuery) -> f64 {
    match parsed {
        ParsedQuery::Simple(query) => leaf_score(text, query),
        ParsedQuery::Boolean {
            operator: BooleanOperator::Not,
            left,
            right: None,
        } => {
            if expression_score(text, left) > 0.0 {
                NEGATION_MATCH
            } else {
                0.0
            }
        }
        ParsedQuery::Boolean {
            operator: BooleanOperator::Not,
            left,
            right: Some(right),
        } => {
            if matches_parsed(text, right) {
                0.0
            } else {
                expression_score(text, left)
            }
        }
        ParsedQuery::Boolean {
            operator: BooleanOperator::And,
            left,
            right,
        } => {
            let left = expression_score(text, left);
            match right {
                Some(right) => left.min(expression_score(text, right)),
                None => left,
            }
        }
        ParsedQuery::Boolean {
            operator: BooleanOperator::Or,
            left,
            right,
        } => {
            let left = expression_score(text, left);
            match right {
                Some(right) => left.max(expression_score(text, right)),
                None => left,
            }
        }
    }
}

/// Text relevance of a record for a plain query.
pub fn calculate_relevance_score(record: &Record, query: &str) -> f64 {
    text_score(&RecordText::new(record), query)
}

/// Monetary relevance of a record; zero for non-financial records.
pub fn calculate_monetary_relevance_score(record: &Record, query: &str) -> f64 {
    monetary_score(&RecordText::new(record), query)
}

/// Relevance of a record for a parsed (possibly boolean) query.
pub fn calculate_boolean_score(record: &Record, parsed: &ParsedQuery) -> f64 {
    expression_score(&RecordText::new(record), parsed)
}

/// Same as [`calculate_boolean_score`], reusing cached record text.
pub fn score_parsed(text: &RecordText<'_>, parsed: &ParsedQuery) -> f64 {
    expression_score(text, parsed)
}

fn by_recency(a: &Record, b: &Record) -> Ordering {
    b.updated_at().cmp(&a.updated_at())
}

/// Order by descending score, most recently updated first among ties.
pub fn sort_by_relevance(scored: &mut [ScoredRecord<'_>]) {
    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| by_recency(a.record, b.record))
    });
}

/// Order by most recently updated.
pub fn sort_by_recency(records: &mut [ScoredRecord<'_>]) {
    records.sort_by(|a, b| by_recency(a.record, b.record));
}
