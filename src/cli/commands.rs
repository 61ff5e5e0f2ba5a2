//! Command implementations for the recordseek CLI.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use log::{debug, info};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::Result;
use crate::highlight::HighlightMode;
use crate::record::Corpus;
use crate::search::{FacetSelections, GROUP_BY_KEY, SearchConfig, SearchEngine};

/// Execute a CLI command.
pub fn execute_command(args: RecordSeekArgs) -> Result<()> {
    match &args.command {
        Command::Search(search_args) => search_corpus(search_args, &args),
        Command::Facets(facets_args) => show_facets(facets_args, &args),
        Command::Highlight(highlight_args) => highlight_query(highlight_args, &args),
    }
}

/// Build facet selections from `key=value` pairs. `groupBy` keeps its last value.
pub fn build_selections(pairs: &[(String, String)]) -> FacetSelections {
    let mut selections = FacetSelections::new();
    for (key, value) in pairs {
        if key == GROUP_BY_KEY {
            selections.set_group_by(value.as_str());
        } else {
            selections.select(key.as_str(), value.as_str());
        }
    }
    selections
}

/// Load a corpus (empty on failure) and an engine configured from `config`.
pub fn load_engine(corpus: &Path, config: Option<&Path>) -> Result<SearchEngine> {
    let config = match config {
        Some(path) => {
            info!("Loading search configuration from {}", path.display());
            SearchConfig::from_path(path).with_context(|| {
                format!("failed to load search configuration from {}", path.display())
            })?
        }
        None => SearchConfig::default(),
    };

    let corpus = Corpus::load_or_empty(corpus);
    debug!("Corpus holds {} records", corpus.len());
    SearchEngine::from_corpus(corpus, config)
}

/// Search a corpus.
fn search_corpus(args: &SearchArgs, cli_args: &RecordSeekArgs) -> Result<()> {
    let engine = load_engine(&args.corpus, args.config.as_deref())?;
    let selections = build_selections(&args.selections);

    let start = Instant::now();
    let results = engine.search(&args.query, &selections, args.group_by.as_deref());
    let duration_ms = start.elapsed().as_millis() as u64;

    output_result(
        "Search completed",
        &SearchReport::new(&args.query, &results, duration_ms),
        cli_args,
    )
}

/// Show facet counts.
fn show_facets(args: &FacetsArgs, cli_args: &RecordSeekArgs) -> Result<()> {
    let engine = load_engine(&args.corpus, args.config.as_deref())?;
    let selections = build_selections(&args.selections);
    let results = engine.search(&args.query, &selections, None);

    output_result(
        "Facet counts",
        &FacetReport {
            query: args.query.clone(),
            total_results: results.total_results,
            facets: results.facets,
        },
        cli_args,
    )
}

/// Highlight query matches in text.
fn highlight_query(args: &HighlightArgs, cli_args: &RecordSeekArgs) -> Result<()> {
    let mode = HighlightMode::from(args.mode);
    let engine = SearchEngine::new(Vec::new(), SearchConfig::default())?;
    let html = engine.highlight(&args.text, &args.query, mode);

    output_result(
        "Highlighted text",
        &HighlightReport {
            mode: mode.to_string(),
            query: args.query.clone(),
            html,
        },
        cli_args,
    )
}
