//! Currency-aware query parsing.
//!
//! A query whose trimmed form starts with `$` is an *explicit* monetary
//! query. Queries that merely look numeric (digits, `.`, `,`) are *implicit*
//! monetary queries and are tried against amounts opportunistically.
//!
//! Numeric matching follows progressive restriction: the more digits and
//! precision a query carries, the stricter it matches.
//!
//! ```
//! use recordseek::query::monetary::matches_monetary_string;
//!
//! // One digit: first-digit rule.
//! assert!(matches_monetary_string("9", "946"));
//! // Two or three digits: prefix of a value with at least as many digits.
//! assert!(matches_monetary_string("$94", "946"));
//! assert!(!matches_monetary_string("946", "94"));
//! // Decimal digits: the value must be a prefix of the query.
//! assert!(matches_monetary_string("946.00", "946"));
//! assert!(!matches_monetary_string("946.00", "9460"));
//! // Trailing dot: any decimal expansion of the whole number.
//! assert!(matches_monetary_string("946.", "946.75"));
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::tokenizer::tokenize;
use crate::util::number::{format_plain, parse_leading_float};

/// Default tolerance for [`is_close_match`].
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Absorbs binary floating point noise around tolerance boundaries.
const FLOAT_SLACK: f64 = 1e-9;

lazy_static! {
    static ref RANGE_PATTERNS: [Regex; 4] = {
        let number = r"(\d[\d,]*(?:\.\d+)?)";
        [
            Regex::new(&format!(r"^{number}\s*-\s*{number}$")).unwrap(),
            Regex::new(&format!(r"(?i)^{number}\s+to\s+{number}$")).unwrap(),
            Regex::new(&format!(r"^\$\s*{number}\s*-\s*\$?\s*{number}$")).unwrap(),
            Regex::new(&format!(r"(?i)^\$\s*{number}\s+to\s+\$?\s*{number}$")).unwrap(),
        ]
    };
}

/// Result of [`parse_monetary_query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonetaryQuery {
    /// Whether the query starts with `$`.
    pub is_monetary: bool,
    /// The query with the leading `$` removed and surrounding whitespace trimmed.
    pub search_query: String,
}

/// Classify a query as explicit monetary and strip its `$` prefix.
pub fn parse_monetary_query(query: &str) -> MonetaryQuery {
    let trimmed = query.trim();
    match trimmed.strip_prefix('$') {
        Some(rest) => MonetaryQuery {
            is_monetary: true,
            search_query: rest.trim().to_string(),
        },
        None => MonetaryQuery {
            is_monetary: false,
            search_query: trimmed.to_string(),
        },
    }
}

/// Whether text looks like it could be an amount: it contains `$`, `.` or
/// `,`, or it is made of digits only.
pub fn has_monetary_potential(text: &str) -> bool {
    let text = text.trim();
    text.contains(['$', '.', ','])
        || (!text.is_empty() && text.chars().all(|c| c.is_ascii_digit()))
}

/// Inclusive amount range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
}

impl AmountRange {
    /// Create a range; reversed endpoints are swapped.
    pub fn new(a: f64, b: f64) -> Self {
        AmountRange {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Closeness to the center: 1.0 at the center, 0.0 at either endpoint,
    /// and 0.0 outside the range.
    pub fn proximity(&self, value: f64) -> f64 {
        if !self.contains(value) {
            return 0.0;
        }
        let half_width = (self.max - self.min) / 2.0;
        if half_width <= 0.0 {
            return 1.0;
        }
        (1.0 - (value - self.center()).abs() / half_width).clamp(0.0, 1.0)
    }
}

/// An amount typed in a query, with the normalized text it was typed as.
///
/// The text is kept because `800`, `800.` and `800.00` parse to the same
/// value but match differently.
#[derive(Debug, Clone, PartialEq)]
pub struct MonetaryAmount {
    pub value: f64,
    pub text: String,
}

impl MonetaryAmount {
    /// Whether a field value satisfies this amount, numerically or by
    /// progressive string restriction.
    pub fn matches(&self, value: f64) -> bool {
        is_close_match(value, self.value, DEFAULT_TOLERANCE)
            || matches_monetary_string(&self.text, &format_plain(value))
    }
}

/// Amounts, leftover text tokens and an optional range extracted from a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonetaryTokens {
    pub amounts: Vec<MonetaryAmount>,
    pub text_tokens: Vec<String>,
    pub range: Option<AmountRange>,
}

impl MonetaryTokens {
    /// True when nothing was extracted; such a query matches everything.
    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty() && self.text_tokens.is_empty() && self.range.is_none()
    }
}

/// Strip `$`, `,` and whitespace.
pub fn normalize_monetary(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect()
}

fn parse_normalized(text: &str) -> Option<f64> {
    normalize_monetary(text)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Split a query into amounts, text tokens and an optional range.
///
/// Range forms (`N-N`, `N to N`, `$N-$N`, `$N to $N`) are tried first and
/// short-circuit everything else.
pub fn extract_monetary_tokens(query: &str) -> MonetaryTokens {
    let trimmed = query.trim();

    for pattern in RANGE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(trimmed) {
            if let (Some(a), Some(b)) = (parse_normalized(&caps[1]), parse_normalized(&caps[2])) {
                return MonetaryTokens {
                    range: Some(AmountRange::new(a, b)),
                    ..Default::default()
                };
            }
        }
    }

    let mut tokens = MonetaryTokens::default();
    for token in tokenize(trimmed) {
        let cleaned = normalize_monetary(&token);
        if cleaned.contains('-') || cleaned.contains(" to ") {
            tokens.text_tokens.push(token);
            continue;
        }
        match parse_leading_float(&cleaned) {
            Some(value) => tokens.amounts.push(MonetaryAmount {
                value,
                text: cleaned,
            }),
            None => tokens.text_tokens.push(token),
        }
    }
    tokens
}

/// Absolute-difference comparison.
pub fn is_close_match(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance + FLOAT_SLACK
}

fn strip_trailing_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

fn integer_digit_count(text: &str) -> usize {
    text.split('.')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .count()
}

fn prefix_match(query: &str, data: &str) -> bool {
    data.starts_with(query) || (data.len() < query.len() && query.starts_with(data))
}

/// Progressive-restriction comparison of a typed amount against a field value.
///
/// Both sides are normalized first. Exact equality always matches. Otherwise
/// the rule depends on the query's shape:
///
/// - decimal digits present: equal after stripping trailing zeros, or the
///   stripped value is a prefix of the stripped query, so `946.5` accepts
///   `946` and even `9`;
/// - trailing `.`: the value starts with the integer part;
/// - 4+ significant digits: prefix either way;
/// - 3 or 2 digits: prefix, and the value needs at least as many integer digits;
/// - 1 digit: the value's first digit equals it.
pub fn matches_monetary_string(query: &str, data: &str) -> bool {
    let q = normalize_monetary(query);
    let d = normalize_monetary(data);
    if q.is_empty() || d.is_empty() {
        return false;
    }
    if q == d {
        return true;
    }

    if let Some((integer, fraction)) = q.split_once('.') {
        if !fraction.is_empty() {
            return strip_trailing_zeros(&q).starts_with(strip_trailing_zeros(&d));
        }
        return !integer.is_empty() && d.starts_with(integer);
    }

    if !q.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let significant = q.trim_start_matches('0');
    match significant.len() {
        0 => false,
        1 => d.chars().find(|c| c.is_ascii_digit()) == significant.chars().next(),
        n @ (2 | 3) => integer_digit_count(&d) >= n && prefix_match(&q, &d),
        _ => prefix_match(&q, &d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_monetary_query() {
        let parsed = parse_monetary_query("  $1,250 ");
        assert!(parsed.is_monetary);
        assert_eq!(parsed.search_query, "1,250");

        let parsed = parse_monetary_query("1250");
        assert!(!parsed.is_monetary);
        assert_eq!(parsed.search_query, "1250");

        let parsed = parse_monetary_query("lumber $5");
        assert!(!parsed.is_monetary);
    }

    #[test]
    fn test_has_monetary_potential() {
        assert!(has_monetary_potential("$5"));
        assert!(has_monetary_potential("1,200"));
        assert!(has_monetary_potential("12.5"));
        assert!(has_monetary_potential(" 946 "));
        assert!(!has_monetary_potential("lumber"));
        assert!(!has_monetary_potential("2x4"));
        assert!(!has_monetary_potential("22 studs"));
        assert!(!has_monetary_potential(""));
    }

    #[test]
    fn test_extract_ranges() {
        let cases = [
            ("1000-2000", (1000.0, 2000.0)),
            ("1,000 - 2,000", (1000.0, 2000.0)),
            ("1000 to 2000", (1000.0, 2000.0)),
            ("1000 TO 2000", (1000.0, 2000.0)),
            ("$1000-$2000", (1000.0, 2000.0)),
            ("$1,000 to $2,500.50", (1000.0, 2500.5)),
            ("$2000-1000", (1000.0, 2000.0)),
        ];
        for (query, (min, max)) in cases {
            let tokens = extract_monetary_tokens(query);
            assert_eq!(
                tokens.range,
                Some(AmountRange { min, max }),
                "query {query:?}"
            );
            assert!(tokens.amounts.is_empty());
            assert!(tokens.text_tokens.is_empty());
        }
    }

    #[test]
    fn test_extract_amounts_and_text() {
        let tokens = extract_monetary_tokens("$1,250.00 Lumber 22");
        assert!(tokens.range.is_none());
        assert_eq!(
            tokens.amounts,
            vec![
                MonetaryAmount {
                    value: 1250.0,
                    text: "1250.00".into()
                },
                MonetaryAmount {
                    value: 22.0,
                    text: "22".into()
                },
            ]
        );
        assert_eq!(tokens.text_tokens, vec!["lumber"]);
    }

    #[test]
    fn test_dash_tokens_stay_text() {
        let tokens = extract_monetary_tokens("2024-01 invoice");
        assert!(tokens.amounts.is_empty());
        assert_eq!(tokens.text_tokens, vec!["2024-01", "invoice"]);
    }

    #[test]
    fn test_empty_tokens() {
        assert!(extract_monetary_tokens("").is_empty());
        assert!(extract_monetary_tokens("   ").is_empty());
        assert!(!extract_monetary_tokens("x").is_empty());
    }

    #[test]
    fn test_is_close_match() {
        assert!(is_close_match(946.0, 946.0, DEFAULT_TOLERANCE));
        assert!(is_close_match(946.0, 946.01, DEFAULT_TOLERANCE));
        assert!(!is_close_match(946.0, 946.02, DEFAULT_TOLERANCE));
        assert!(is_close_match(946.0, 947.0, 1.0));
    }

    #[test]
    fn test_exact_string_equality() {
        assert!(matches_monetary_string("$1,250", "1250"));
        assert!(matches_monetary_string("0", "0"));
    }

    #[test]
    fn test_single_digit_first_digit_rule() {
        assert!(matches_monetary_string("5", "5"));
        assert!(matches_monetary_string("5", "512"));
        assert!(matches_monetary_string("5", "5000.25"));
        assert!(!matches_monetary_string("5", "45"));
        assert!(!matches_monetary_string("5", "15"));
    }

    #[test]
    fn test_two_digit_rule() {
        assert!(matches_monetary_string("43", "43"));
        assert!(matches_monetary_string("43", "4321"));
        assert!(!matches_monetary_string("43", "4"));
        assert!(!matches_monetary_string("43", "143"));
        assert!(!matches_monetary_string("22", "946"));
    }

    #[test]
    fn test_three_digit_rule() {
        assert!(matches_monetary_string("946", "946"));
        assert!(matches_monetary_string("946", "9460"));
        assert!(matches_monetary_string("946", "946.5"));
        assert!(!matches_monetary_string("946", "94"));
        assert!(!matches_monetary_string("946", "1946"));
    }

    #[test]
    fn test_four_plus_digit_rule() {
        assert!(matches_monetary_string("1250", "12500"));
        assert!(matches_monetary_string("12500", "1250"));
        assert!(!matches_monetary_string("1250", "1350"));
        assert!(!matches_monetary_string("12500", "1350"));
    }

    #[test]
    fn test_decimal_with_digits_matches_value_prefixes() {
        assert!(matches_monetary_string("800.00", "800"));
        assert!(matches_monetary_string("800.50", "800.5"));
        assert!(matches_monetary_string("800.55", "800.5"));
        assert!(!matches_monetary_string("800.00", "8000"));
        assert!(matches_monetary_string("800.00", "8"));
        assert!(matches_monetary_string("800.55", "800"));
        assert!(matches_monetary_string("946.5", "946"));
        assert!(!matches_monetary_string("800.50", "800.75"));
        assert!(!matches_monetary_string("800.50", "801"));
    }

    #[test]
    fn test_trailing_dot_matches_whole_number_expansions() {
        assert!(matches_monetary_string("800.", "800"));
        assert!(matches_monetary_string("800.", "800.99"));
        assert!(matches_monetary_string("800.", "8001"));
        assert!(!matches_monetary_string("800.", "80"));
        assert!(!matches_monetary_string(".", "800"));
    }

    #[test]
    fn test_non_numeric_query_never_matches() {
        assert!(!matches_monetary_string("abc", "123"));
        assert!(!matches_monetary_string("", "123"));
        assert!(!matches_monetary_string("$", "123"));
    }

    #[test]
    fn test_amount_range_proximity() {
        let range = AmountRange::new(1000.0, 2000.0);
        assert_eq!(range.proximity(1500.0), 1.0);
        assert_eq!(range.proximity(1000.0), 0.0);
        assert_eq!(range.proximity(1250.0), 0.5);
        assert_eq!(range.proximity(2500.0), 0.0);
        assert_eq!(AmountRange::new(5.0, 5.0).proximity(5.0), 1.0);
    }

    #[test]
    fn test_monetary_amount_matches() {
        let amount = MonetaryAmount {
            value: 946.0,
            text: "946".into(),
        };
        assert!(amount.matches(946.0));
        assert!(amount.matches(946.005));
        assert!(amount.matches(9460.0));
        assert!(!amount.matches(43.0));
    }
}
