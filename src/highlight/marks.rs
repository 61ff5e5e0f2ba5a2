//! Non-overlapping mark spans and HTML rendering.

use std::ops::Range;

/// A byte range of the source text wrapped in `<mark class="...">`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkSpan {
    pub range: Range<usize>,
    pub class: &'static str,
}

/// Ranges already claimed by a mark. Later claims that overlap any of them
/// are refused, so rendered marks never nest or overlap.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    claimed: Vec<MarkSpan>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no claimed range overlaps `range`.
    pub fn is_free(&self, range: &Range<usize>) -> bool {
        self.claimed
            .iter()
            .all(|span| range.end <= span.range.start || span.range.end <= range.start)
    }

    /// Claim a non-empty free range. Returns whether the claim succeeded.
    pub fn claim(&mut self, range: Range<usize>, class: &'static str) -> bool {
        if range.is_empty() || !self.is_free(&range) {
            return false;
        }
        self.claimed.push(MarkSpan { range, class });
        true
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    /// Claimed spans in text order.
    pub fn into_spans(mut self) -> Vec<MarkSpan> {
        self.claimed.sort_by_key(|span| span.range.start);
        self.claimed
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render `text` as escaped HTML with each claimed span wrapped in a mark.
pub fn render(text: &str, occupancy: Occupancy) -> String {
    let mut result = String::with_capacity(text.len() + occupancy.len() * 40);
    let mut last_pos = 0;

    for span in occupancy.into_spans() {
        result.push_str(&escape_html(&text[last_pos..span.range.start]));
        result.push_str("<mark class=\"");
        result.push_str(span.class);
        result.push_str("\">");
        result.push_str(&escape_html(&text[span.range.clone()]));
        result.push_str("</mark>");
        last_pos = span.range.end;
    }

    result.push_str(&escape_html(&text[last_pos..]));
    result
}
