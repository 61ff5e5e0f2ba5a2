//! Query-driven `<mark>` highlighting.

use std::fmt;
use std::ops::Range;

use lazy_static::lazy_static;
use log::trace;
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::tokenize;
use crate::highlight::cache::{CacheKey, HighlightCache};
use crate::highlight::marks::{Occupancy, render};
use crate::query::monetary::{
    AmountRange, MonetaryAmount, extract_monetary_tokens, normalize_monetary,
};
use crate::query::parser::{extract_search_terms_from_query, parse_query};
use crate::util::number::{format_plain, format_with_separators};

pub const TEXT_CLASS: &str = "search-highlight";
pub const MONETARY_EXACT_CLASS: &str = "monetary-highlight-exact";
pub const MONETARY_PARTIAL_CLASS: &str = "monetary-highlight-partial";
pub const MONETARY_RANGE_CLASS: &str = "monetary-highlight-range";
pub const MONETARY_TEXT_CLASS: &str = "monetary-highlight-text";

/// Default number of cached renders.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

lazy_static! {
    static ref NUMBER_PATTERN: Regex = Regex::new(r"\$?[\d,]+(\.\d{2})?").unwrap();
}

/// How query text is located in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightMode {
    #[default]
    Text,
    Monetary,
}

impl HighlightMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightMode::Text => "text",
            HighlightMode::Monetary => "monetary",
        }
    }

    pub fn parse(mode: &str) -> Option<HighlightMode> {
        match mode {
            "text" => Some(HighlightMode::Text),
            "monetary" => Some(HighlightMode::Monetary),
            _ => None,
        }
    }
}

impl fmt::Display for HighlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim every free, case-insensitive occurrence of each term, longest
/// term first.
fn claim_terms(text: &str, terms: &[String], class: &'static str, occupancy: &mut Occupancy) {
    let mut sorted: Vec<&str> = terms
        .iter()
        .map(String::as_str)
        .filter(|t| !t.is_empty())
        .collect();
    sorted.sort_by_key(|term| std::cmp::Reverse(term.chars().count()));

    for term in sorted {
        let Ok(regex) = Regex::new(&format!("(?i){}", regex::escape(term))) else {
            continue;
        };
        for mat in regex.find_iter(text) {
            occupancy.claim(mat.range(), class);
        }
    }
}

/// Highlight query terms in plain text. Boolean queries contribute the
/// terms of every leaf.
pub fn highlight_text(text: &str, query: &str) -> String {
    let terms = extract_search_terms_from_query(query);
    let mut occupancy = Occupancy::new();
    claim_terms(text, &terms, TEXT_CLASS, &mut occupancy);
    render(text, occupancy)
}

/// Ways an amount is commonly printed, longest first.
fn formatted_forms(value: f64) -> Vec<String> {
    let value = value.abs();
    let mut forms = vec![
        format_with_separators(value, Some(2)),
        format!("{value:.2}"),
        format_with_separators(value, None),
        format_plain(value),
    ];
    forms.sort_by_key(|form| std::cmp::Reverse(form.len()));
    forms.dedup();
    forms
}

/// Whether `range` covers a whole number rather than a piece of a longer one.
fn is_whole_number(text: &str, range: &Range<usize>) -> bool {
    let before = text[..range.start].chars().next_back();
    if before.is_some_and(|c| c.is_ascii_digit() || c == ',' || c == '.') {
        return false;
    }
    let mut after = text[range.end..].chars();
    match after.next() {
        Some(c) if c.is_ascii_digit() => false,
        Some(',') | Some('.') => !after.next().is_some_and(|c| c.is_ascii_digit()),
        _ => true,
    }
}

/// Claim printed occurrences of `value`, including a leading `$`.
fn claim_formatted(text: &str, value: f64, class: &'static str, occupancy: &mut Occupancy) {
    for form in formatted_forms(value) {
        for (start, matched) in text.match_indices(form.as_str()) {
            let mut range = start..start + matched.len();
            if !is_whole_number(text, &range) {
                continue;
            }
            if text[..range.start].ends_with('$') {
                range.start -= 1;
            }
            occupancy.claim(range, class);
        }
    }
}

/// Numeric substrings of `text` with their parsed values.
fn numbers(text: &str) -> Vec<(Range<usize>, f64)> {
    NUMBER_PATTERN
        .find_iter(text)
        .filter_map(|mat| {
            let trimmed = mat.as_str().trim_end_matches(',');
            if !trimmed.chars().any(|c| c.is_ascii_digit()) {
                return None;
            }
            let value = normalize_monetary(trimmed).parse::<f64>().ok()?;
            Some((mat.start()..mat.start() + trimmed.len(), value))
        })
        .collect()
}

#[derive(Debug, Default)]
struct MonetaryTerms {
    explicit_values: Vec<f64>,
    amounts: Vec<MonetaryAmount>,
    ranges: Vec<AmountRange>,
    text_tokens: Vec<String>,
}

impl MonetaryTerms {
    fn from_query(query: &str) -> Self {
        let mut terms = MonetaryTerms::default();
        for leaf in parse_query(query).leaves() {
            for token in tokenize(leaf) {
                if token.starts_with('$') {
                    if let Ok(value) = normalize_monetary(&token).parse::<f64>() {
                        terms.explicit_values.push(value);
                    }
                }
            }
            let tokens = extract_monetary_tokens(leaf);
            terms.amounts.extend(tokens.amounts);
            terms.ranges.extend(tokens.range);
            terms.text_tokens.extend(tokens.text_tokens);
        }
        terms
    }
}

/// Highlight amounts in text: exact `$` amounts first, then progressive
/// partial matches, then range hits, then leftover words.
pub fn highlight_monetary(text: &str, query: &str) -> String {
    let terms = MonetaryTerms::from_query(query);
    let mut occupancy = Occupancy::new();

    for value in &terms.explicit_values {
        claim_formatted(text, *value, MONETARY_EXACT_CLASS, &mut occupancy);
    }

    let numbers = numbers(text);
    if !terms.amounts.is_empty() {
        for (range, value) in &numbers {
            if terms.amounts.iter().any(|amount| amount.matches(*value)) {
                occupancy.claim(range.clone(), MONETARY_PARTIAL_CLASS);
            }
        }
    }

    for amount_range in &terms.ranges {
        claim_formatted(text, amount_range.min, MONETARY_RANGE_CLASS, &mut occupancy);
        claim_formatted(text, amount_range.max, MONETARY_RANGE_CLASS, &mut occupancy);
        for (range, value) in &numbers {
            if amount_range.contains(*value) {
                occupancy.claim(range.clone(), MONETARY_RANGE_CLASS);
            }
        }
    }

    claim_terms(text, &terms.text_tokens, MONETARY_TEXT_CLASS, &mut occupancy);
    render(text, occupancy)
}

/// Renders highlights and remembers recent renders.
#[derive(Debug)]
pub struct Highlighter {
    cache: Mutex<HighlightCache>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Highlighter::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl Highlighter {
    pub fn new(cache_capacity: usize) -> Self {
        Highlighter {
            cache: Mutex::new(HighlightCache::new(cache_capacity)),
        }
    }

    /// Escaped HTML for `text` with query matches marked.
    pub fn highlight(&self, text: &str, query: &str, mode: HighlightMode) -> String {
        let key = CacheKey::new(mode, text, query);
        if let Some(html) = self.cache.lock().get(&key, text) {
            trace!("Highlight cache hit for query '{query}'");
            return html.to_string();
        }

        let html = match mode {
            HighlightMode::Text => highlight_text(text, query),
            HighlightMode::Monetary => highlight_monetary(text, query),
        };
        self.cache.lock().insert(key, text, html.clone());
        html
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }
}
