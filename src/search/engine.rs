//! The search entry point: match, score, facet and group a corpus.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use log::{debug, warn};
use serde::Serialize;

use crate::error::Result;
use crate::highlight::{HighlightMode, Highlighter};
use crate::query::matcher::{RecordText, matches_parsed};
use crate::query::parser::{ParsedQuery, parse_query};
use crate::query::scorer::{ScoredRecord, score_parsed, sort_by_recency, sort_by_relevance};
use crate::record::{Corpus, Record};
use crate::search::config::SearchConfig;
use crate::search::facet::{FacetCounts, FacetSelections, compute_facets, matches_selections};
use crate::search::group::{GroupBy, ResultGroup, apply_group_limits, build_groups};

/// Identifies one search request. Issuing a newer ticket supersedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Everything a host needs to render one search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults<'a> {
    pub total_results: usize,
    /// Matched records in ranked order.
    pub matched_records: Vec<&'a Record>,
    pub scored_order: Vec<ScoredRecord<'a>>,
    /// Counts over the matched records.
    pub facets: FacetCounts,
    /// Groups after per-group limits.
    pub groups: Vec<ResultGroup<'a>>,
}

struct PreparedSearch<'q> {
    parsed: ParsedQuery,
    has_text: bool,
    selections: &'q FacetSelections,
    group_by: GroupBy,
    today: NaiveDate,
}

/// In-memory search engine over a fixed list of records.
#[derive(Debug)]
pub struct SearchEngine {
    records: Vec<Record>,
    config: SearchConfig,
    highlighter: Highlighter,
    sequence: AtomicU64,
}

impl SearchEngine {
    /// Create an engine after validating its configuration.
    pub fn new(records: Vec<Record>, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let highlighter = Highlighter::new(config.highlight_cache_capacity);
        Ok(SearchEngine {
            records,
            config,
            highlighter,
            sequence: AtomicU64::new(0),
        })
    }

    pub fn from_corpus(corpus: Corpus, config: SearchConfig) -> Result<Self> {
        Self::new(corpus.into_records(), config)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Start a request, superseding every earlier ticket.
    pub fn begin_request(&self) -> RequestTicket {
        RequestTicket(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no newer request has started since `ticket`.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.sequence.load(Ordering::SeqCst) == ticket.0
    }

    /// Run a search to completion.
    ///
    /// `group_by` overrides any `groupBy` selection; both default to
    /// grouping by entity type.
    pub fn search<'a>(
        &'a self,
        query: &str,
        selections: &FacetSelections,
        group_by: Option<&str>,
    ) -> SearchResults<'a> {
        self.search_as_of(query, selections, group_by, Utc::now().date_naive())
    }

    /// Same as [`SearchEngine::search`], bucketing issue dates relative to `today`.
    pub fn search_as_of<'a>(
        &'a self,
        query: &str,
        selections: &FacetSelections,
        group_by: Option<&str>,
        today: NaiveDate,
    ) -> SearchResults<'a> {
        let start = Instant::now();
        let prepared = self.prepare(query, selections, group_by, today);
        let mut matched = Vec::new();
        for batch in self.records.chunks(self.config.batch_size) {
            Self::collect_batch(batch, &prepared, &mut matched);
        }
        let results = self.finish(matched, &prepared);
        debug!(
            "Search '{}' matched {} of {} records in {:?}",
            query,
            results.total_results,
            self.records.len(),
            start.elapsed()
        );
        results
    }

    /// Run a search in batches, yielding to the runtime between them.
    ///
    /// Returns `None` once a newer request has started.
    pub async fn search_cooperative<'a>(
        &'a self,
        ticket: RequestTicket,
        query: &str,
        selections: &FacetSelections,
        group_by: Option<&str>,
    ) -> Option<SearchResults<'a>> {
        let start = Instant::now();
        let prepared = self.prepare(query, selections, group_by, Utc::now().date_naive());
        let mut matched = Vec::new();

        for (index, batch) in self.records.chunks(self.config.batch_size).enumerate() {
            if !self.is_current(ticket) {
                debug!(
                    "Request {} superseded after {} batches",
                    ticket.sequence(),
                    index
                );
                return None;
            }
            Self::collect_batch(batch, &prepared, &mut matched);
            tokio::task::yield_now().await;
        }

        if !self.is_current(ticket) {
            debug!("Request {} superseded before completion", ticket.sequence());
            return None;
        }

        let results = self.finish(matched, &prepared);
        debug!(
            "Request {} for '{}' matched {} records in {:?}",
            ticket.sequence(),
            query,
            results.total_results,
            start.elapsed()
        );
        Some(results)
    }

    /// Escaped HTML of `text` with matches of `query` marked.
    pub fn highlight(&self, text: &str, query: &str, mode: HighlightMode) -> String {
        self.highlighter.highlight(text, query, mode)
    }

    pub fn clear_highlight_cache(&self) {
        self.highlighter.clear_cache();
    }

    fn prepare<'q>(
        &self,
        query: &str,
        selections: &'q FacetSelections,
        group_by: Option<&str>,
        today: NaiveDate,
    ) -> PreparedSearch<'q> {
        let requested = group_by.or_else(|| selections.group_by());
        let group_by = match requested {
            None => GroupBy::default(),
            Some(value) => GroupBy::parse(value).unwrap_or_else(|| {
                warn!("Unknown groupBy '{value}', grouping by entity type");
                GroupBy::default()
            }),
        };

        for key in selections.unknown_keys() {
            warn!("Ignoring selection on unknown facet '{key}'");
        }

        PreparedSearch {
            parsed: parse_query(query),
            has_text: !query.trim().is_empty(),
            selections,
            group_by,
            today,
        }
    }

    fn collect_batch<'a>(
        batch: &'a [Record],
        prepared: &PreparedSearch<'_>,
        matched: &mut Vec<ScoredRecord<'a>>,
    ) {
        for record in batch {
            if !matches_selections(record, prepared.selections, prepared.today) {
                continue;
            }
            let text = RecordText::new(record);
            if !matches_parsed(&text, &prepared.parsed) {
                continue;
            }
            let score = if prepared.has_text {
                score_parsed(&text, &prepared.parsed)
            } else {
                0.0
            };
            matched.push(ScoredRecord { record, score });
        }
    }

    fn finish<'a>(
        &self,
        mut matched: Vec<ScoredRecord<'a>>,
        prepared: &PreparedSearch<'_>,
    ) -> SearchResults<'a> {
        if prepared.has_text {
            sort_by_relevance(&mut matched);
        } else {
            sort_by_recency(&mut matched);
        }

        let facets = compute_facets(matched.iter().map(|s| s.record), prepared.today);
        let groups = apply_group_limits(
            build_groups(&matched, prepared.group_by),
            &self.config.group_limits,
        );

        SearchResults {
            total_results: matched.len(),
            matched_records: matched.iter().map(|s| s.record).collect(),
            scored_order: matched,
            facets,
            groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::record::{
        BuildertrendRecord, DocumentRecord, EntityType, FinancialRecord, LineItem,
        LineItemType, RecordHeader,
    };
    use crate::search::config::GroupLimits;
    use crate::search::facet::FacetKey;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn header(id: &str, title: &str, day: u32) -> RecordHeader {
        RecordHeader::new(id, title, Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap())
    }

    fn corpus() -> Vec<Record> {
        vec![
            Record::Bill(
                FinancialRecord::new(
                    header("bill-1", "Framing Lumber", 10).with_project("Maple"),
                    946.0,
                    today(),
                )
                .with_line_item(LineItem::new(
                    "Studs",
                    LineItemType::Material,
                    22.0,
                    43.0,
                    946.0,
                )),
            ),
            Record::Document(DocumentRecord {
                header: header("doc-1", "Lumber delivery schedule", 12).with_project("Oak"),
                document_type: "Schedule".into(),
                author: String::new(),
            }),
            Record::Document(DocumentRecord {
                header: header("doc-2", "Electrical permit", 20),
                document_type: "Permit".into(),
                author: String::new(),
            }),
            Record::Buildertrend(BuildertrendRecord {
                header: header("bt-1", "Schedule", 1),
                path: "/schedule".into(),
                description: "Open the schedule".into(),
                trigger_queries: vec!["schedule".into()],
            }),
        ]
    }

    fn engine() -> SearchEngine {
        SearchEngine::new(corpus(), SearchConfig::default().with_batch_size(2)).unwrap()
    }

    fn ids<'a>(results: &SearchResults<'a>) -> Vec<&'a str> {
        results.matched_records.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SearchConfig::default().with_batch_size(0);
        assert!(SearchEngine::new(Vec::new(), config).is_err());
    }

    #[test]
    fn test_empty_query_orders_by_recency() {
        let engine = engine();
        let results = engine.search_as_of("", &FacetSelections::new(), None, today());
        assert_eq!(ids(&results), vec!["doc-2", "doc-1", "bill-1"]);
        assert_eq!(results.total_results, 3);
        assert!(results.scored_order.iter().all(|s| s.score == 0.0));
    }

    #[test]
    fn test_text_query_ranks_by_score() {
        let engine = engine();
        let results = engine.search_as_of("lumber", &FacetSelections::new(), None, today());
        // Equal scores, so the more recently updated document comes first.
        assert_eq!(ids(&results), vec!["doc-1", "bill-1"]);
        assert_eq!(results.scored_order[0].score, results.scored_order[1].score);

        let results = engine.search_as_of("framing lumber", &FacetSelections::new(), None, today());
        assert_eq!(ids(&results), vec!["bill-1"]);
    }

    #[test]
    fn test_trigger_phrase_reaches_quick_nav() {
        let engine = engine();
        let results = engine.search_as_of("Schedule", &FacetSelections::new(), None, today());
        assert!(ids(&results).contains(&"bt-1"));
        assert_eq!(results.groups[0].key.entity_type(), Some(EntityType::Buildertrend));
    }

    #[test]
    fn test_selections_filter_and_facets_follow() {
        let engine = engine();
        let selections = FacetSelections::new().with("entityType", "Document");
        let results = engine.search_as_of("", &selections, None, today());
        assert_eq!(ids(&results), vec!["doc-2", "doc-1"]);
        assert_eq!(results.facets.total(FacetKey::EntityType), results.total_results);
        assert_eq!(results.facets.count(FacetKey::DocumentType, "Permit"), 1);
    }

    #[test]
    fn test_group_by_selection_and_override() {
        let engine = engine();
        let mut selections = FacetSelections::new();
        selections.set_group_by("project");

        let results = engine.search_as_of("", &selections, None, today());
        let labels: Vec<_> = results.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Maple", "Oak", "No Project"]);

        let results = engine.search_as_of("", &selections, Some("entityType"), today());
        let labels: Vec<_> = results.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Document", "Bill"]);

        let results = engine.search_as_of("", &selections, Some("bogus"), today());
        assert_eq!(results.groups.len(), 2);
    }

    #[test]
    fn test_group_limits_applied() {
        let config = SearchConfig::default()
            .with_group_limits(GroupLimits::new(5).with_limit(EntityType::Document, 1));
        let engine = SearchEngine::new(corpus(), config).unwrap();
        let results = engine.search_as_of("", &FacetSelections::new(), None, today());
        assert_eq!(results.total_results, 3);
        assert_eq!(results.groups[0].records.len(), 1);
        assert_eq!(results.groups[0].total, 2);
    }

    #[test]
    fn test_request_tickets() {
        let engine = engine();
        let first = engine.begin_request();
        assert!(engine.is_current(first));
        let second = engine.begin_request();
        assert!(!engine.is_current(first));
        assert!(engine.is_current(second));
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_cooperative_search_matches_sync() {
        let engine = engine();
        let ticket = engine.begin_request();
        let results = engine
            .search_cooperative(ticket, "lumber", &FacetSelections::new(), None)
            .await
            .unwrap();
        let sync = engine.search("lumber", &FacetSelections::new(), None);
        assert_eq!(ids(&results), ids(&sync));
        assert_eq!(ids(&results), vec!["doc-1", "bill-1"]);
    }

    #[tokio::test]
    async fn test_superseded_search_returns_none() {
        let engine = engine();
        let stale = engine.begin_request();
        engine.begin_request();
        let results = engine
            .search_cooperative(stale, "lumber", &FacetSelections::new(), None)
            .await;
        assert!(results.is_none());
    }

    #[test]
    fn test_highlight_uses_cache() {
        let engine = engine();
        let html = engine.highlight("Framing Lumber", "lumber", HighlightMode::Text);
        assert_eq!(
            html,
            "Framing <mark class=\"search-highlight\">Lumber</mark>"
        );
        assert_eq!(
            engine.highlight("Framing Lumber", "lumber", HighlightMode::Text),
            html
        );
        engine.clear_highlight_cache();
    }
}
