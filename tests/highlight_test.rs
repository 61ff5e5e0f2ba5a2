//! Highlighting through the engine, including the render cache.

use recordseek::highlight::{
    MONETARY_EXACT_CLASS, MONETARY_RANGE_CLASS, TEXT_CLASS, highlight_monetary, highlight_text,
};
use recordseek::prelude::*;

fn assert_marks_do_not_nest(html: &str) {
    let mut depth = 0;
    let mut rest = html;
    while let Some(pos) = rest.find('<') {
        rest = &rest[pos..];
        if rest.starts_with("<mark") {
            depth += 1;
            assert_eq!(depth, 1, "nested mark in {html}");
        } else if rest.starts_with("</mark>") {
            depth -= 1;
            assert_eq!(depth, 0, "unbalanced mark in {html}");
        }
        rest = &rest[1..];
    }
    assert_eq!(depth, 0, "unclosed mark in {html}");
}

#[test]
fn test_text_highlight_escapes_and_marks() {
    let html = highlight_text("Framing <Lumber> & studs", "lumber OR studs");
    assert_eq!(
        html,
        format!(
            "Framing &lt;<mark class=\"{TEXT_CLASS}\">Lumber</mark>&gt; &amp; \
             <mark class=\"{TEXT_CLASS}\">studs</mark>"
        )
    );
}

#[test]
fn test_overlapping_terms_produce_flat_marks() {
    let html = highlight_text("Framing framework frames", "fram framing framework");
    assert_marks_do_not_nest(&html);
    assert!(html.contains(&format!("<mark class=\"{TEXT_CLASS}\">framework</mark>")));

    let html = highlight_monetary(
        "Paid $1,250.00 on 1,250 studs, range $1,000 to $2,000",
        "$1,250 1000-2,000",
    );
    assert_marks_do_not_nest(&html);
}

#[test]
fn test_monetary_exact_mark_covers_dollar_sign() {
    let html = highlight_monetary("22 studs at $43.00 for $946.00", "$946");
    assert!(html.contains(&format!(
        "<mark class=\"{MONETARY_EXACT_CLASS}\">$946.00</mark>"
    )));
    assert!(html.starts_with("22 studs"));
}

#[test]
fn test_monetary_range_marks_values_inside() {
    let html = highlight_monetary("Bids came in at $1,500 and $4,200", "$1000-$2000");
    assert!(html.contains(&format!(
        "<mark class=\"{MONETARY_RANGE_CLASS}\">$1,500</mark>"
    )));
    assert!(!html.contains("4,200</mark>"));
}

#[test]
fn test_engine_highlight_is_cached_and_stable() -> Result<()> {
    let engine = SearchEngine::new(Vec::new(), SearchConfig::default())?;
    let text = "Framing lumber delivered, invoice total $946.00";

    let first = engine.highlight(text, "lumber", HighlightMode::Text);
    let second = engine.highlight(text, "lumber", HighlightMode::Text);
    assert_eq!(first, second);
    assert_eq!(first, highlight_text(text, "lumber"));

    let monetary = engine.highlight(text, "$946", HighlightMode::Monetary);
    assert_eq!(monetary, highlight_monetary(text, "$946"));
    assert_ne!(monetary, first);

    engine.clear_highlight_cache();
    assert_eq!(engine.highlight(text, "lumber", HighlightMode::Text), first);

    Ok(())
}

#[test]
fn test_long_texts_with_shared_prefix_are_not_confused() -> Result<()> {
    let engine = SearchEngine::new(Vec::new(), SearchConfig::default())?;
    let prefix = "x".repeat(80);
    let a = format!("{prefix} lumber");
    let b = format!("{prefix} concrete");

    let html_a = engine.highlight(&a, "lumber", HighlightMode::Text);
    let html_b = engine.highlight(&b, "lumber", HighlightMode::Text);
    assert!(html_a.contains("</mark>"));
    assert!(!html_b.contains("<mark"));

    Ok(())
}
