//! Criterion benchmarks for recordseek.
//!
//! Covers the full search pipeline over a generated corpus and both
//! highlighting modes.

use std::hint::black_box;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use recordseek::highlight::{HighlightMode, highlight_monetary, highlight_text};
use recordseek::record::{
    DocumentRecord, FinancialRecord, LineItem, LineItemType, Record, RecordHeader,
};
use recordseek::search::{FacetSelections, SearchConfig, SearchEngine};

const WORDS: [&str; 16] = [
    "framing", "lumber", "concrete", "drywall", "electrical", "plumbing", "roofing", "permit",
    "inspection", "studs", "rebar", "insulation", "trim", "paint", "footing", "siding",
];
const PROJECTS: [&str; 4] = ["Maple", "Oak", "Cedar", "Birch"];

fn phrase(rng: &mut StdRng, len: usize) -> String {
    (0..len)
        .map(|_| WORDS[rng.random_range(0..WORDS.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate a mixed corpus of bills and documents.
fn generate_corpus(count: usize) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(42);
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let issued = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    (0..count)
        .map(|i| {
            let header = RecordHeader::new(
                format!("rec-{i}"),
                phrase(&mut rng, 3),
                base + Duration::hours(i as i64),
            )
            .with_summary(phrase(&mut rng, 8))
            .with_project(PROJECTS[rng.random_range(0..PROJECTS.len())]);

            if i % 3 == 0 {
                Record::Document(DocumentRecord {
                    header,
                    document_type: "Plan".into(),
                    author: String::new(),
                })
            } else {
                let mut bill = FinancialRecord::new(
                    header,
                    0.0,
                    issued + Duration::days(rng.random_range(0..365)),
                );
                let mut total = 0.0;
                for _ in 0..rng.random_range(1..5) {
                    let quantity = rng.random_range(1..50) as f64;
                    let unit_price = rng.random_range(5..500) as f64;
                    total += quantity * unit_price;
                    bill = bill.with_line_item(LineItem::new(
                        phrase(&mut rng, 2),
                        LineItemType::Material,
                        quantity,
                        unit_price,
                        quantity * unit_price,
                    ));
                }
                bill.total_value = total;
                Record::Bill(bill)
            }
        })
        .collect()
}

/// Benchmark the search pipeline.
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    let corpus = generate_corpus(5_000);
    group.throughput(Throughput::Elements(corpus.len() as u64));
    let engine = SearchEngine::new(corpus, SearchConfig::default()).unwrap();
    let selections = FacetSelections::new();

    for (name, query) in [
        ("empty", ""),
        ("text", "framing lumber"),
        ("boolean", "lumber AND concrete NOT paint"),
        ("monetary_exact", "$946"),
        ("monetary_range", "$1000-$5000"),
        ("implicit_numeric", "250"),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(engine.search(black_box(query), &selections, None)))
        });
    }

    let filtered = FacetSelections::new().with("entityType", "Bill").with("project", "Oak");
    group.bench_function("text_with_selections", |b| {
        b.iter(|| black_box(engine.search(black_box("lumber"), &filtered, Some("project"))))
    });

    group.finish();
}

/// Benchmark highlighting.
fn bench_highlight(c: &mut Criterion) {
    let mut group = c.benchmark_group("highlight");

    let mut rng = StdRng::seed_from_u64(7);
    let text = format!(
        "{} totalling $1,250.00 across 22 units at $43.50; {}",
        phrase(&mut rng, 40),
        phrase(&mut rng, 40)
    );

    group.bench_function("text_uncached", |b| {
        b.iter(|| black_box(highlight_text(black_box(&text), "lumber OR concrete")))
    });

    group.bench_function("monetary_uncached", |b| {
        b.iter(|| black_box(highlight_monetary(black_box(&text), "$1,250 lumber")))
    });

    let engine = SearchEngine::new(Vec::new(), SearchConfig::default()).unwrap();
    group.bench_function("monetary_cached", |b| {
        b.iter(|| black_box(engine.highlight(black_box(&text), "$1,250", HighlightMode::Monetary)))
    });

    group.finish();
}

criterion_group!(benches, bench_search, bench_highlight);

criterion_main!(benches);
