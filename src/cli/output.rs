//! Output formatting for CLI commands.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::args::{OutputFormat, RecordSeekArgs};
use crate::error::Result;
use crate::search::{FacetCounts, SearchResults};

/// One ranked record in a search report.
#[derive(Debug, Clone, Serialize)]
pub struct HitReport {
    pub id: String,
    pub entity_type: String,
    pub title: String,
    pub score: f64,
}

/// One result group in a search report.
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub label: String,
    pub total: usize,
    pub hits: Vec<HitReport>,
}

/// Result structure for search operations.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub total_results: usize,
    pub duration_ms: u64,
    pub groups: Vec<GroupReport>,
    pub facets: FacetCounts,
}

impl SearchReport {
    pub fn new(query: &str, results: &SearchResults<'_>, duration_ms: u64) -> Self {
        let groups = results
            .groups
            .iter()
            .map(|group| GroupReport {
                label: group.label.clone(),
                total: group.total,
                hits: group
                    .records
                    .iter()
                    .map(|scored| HitReport {
                        id: scored.record.id().to_string(),
                        entity_type: scored.record.entity_type().to_string(),
                        title: scored.record.title().to_string(),
                        score: scored.score,
                    })
                    .collect(),
            })
            .collect();

        SearchReport {
            query: query.to_string(),
            total_results: results.total_results,
            duration_ms,
            groups,
            facets: results.facets.clone(),
        }
    }
}

/// Result structure for facet counts.
#[derive(Debug, Clone, Serialize)]
pub struct FacetReport {
    pub query: String,
    pub total_results: usize,
    pub facets: FacetCounts,
}

/// Result structure for highlighting.
#[derive(Debug, Clone, Serialize)]
pub struct HighlightReport {
    pub mode: String,
    pub query: String,
    pub html: String,
}

/// Types that have a human-readable rendering.
pub trait HumanReadable {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()>;
}

fn write_facets(facets: &FacetCounts, out: &mut dyn Write) -> io::Result<()> {
    if facets.is_empty() {
        return Ok(());
    }
    writeln!(out, "Facets:")?;
    for (key, values) in facets.iter() {
        let rendered: Vec<String> = values
            .iter()
            .map(|entry| format!("{} ({})", entry.value, entry.count))
            .collect();
        writeln!(out, "  {key}: {}", rendered.join(", "))?;
    }
    Ok(())
}

impl HumanReadable for SearchReport {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "Found {} result(s) for \"{}\" in {} ms",
            self.total_results, self.query, self.duration_ms
        )?;

        for group in &self.groups {
            writeln!(out)?;
            writeln!(out, "{} ({})", group.label, group.total)?;
            writeln!(out, "─────────────")?;
            for (i, hit) in group.hits.iter().enumerate() {
                writeln!(
                    out,
                    "{:>3}. {} [{}] (Score: {:.1})",
                    i + 1,
                    hit.title,
                    hit.id,
                    hit.score
                )?;
            }
            if group.hits.len() < group.total {
                writeln!(out, "     ... {} more", group.total - group.hits.len())?;
            }
        }

        writeln!(out)?;
        write_facets(&self.facets, out)
    }
}

impl HumanReadable for FacetReport {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.query.trim().is_empty() {
            writeln!(out, "{} record(s)", self.total_results)?;
        } else {
            writeln!(
                out,
                "{} record(s) matching \"{}\"",
                self.total_results, self.query
            )?;
        }
        write_facets(&self.facets, out)
    }
}

impl HumanReadable for HighlightReport {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", self.html)
    }
}

/// Write a result in the requested format.
pub fn write_result<T: Serialize + HumanReadable>(
    message: &str,
    result: &T,
    args: &RecordSeekArgs,
    out: &mut dyn Write,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                writeln!(out, "{message}")?;
                writeln!(out)?;
            }
            result.write_human(out)?;
        }
        OutputFormat::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

/// Output a result to stdout in the requested format.
pub fn output_result<T: Serialize + HumanReadable>(
    message: &str,
    result: &T,
    args: &RecordSeekArgs,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_result(message, result, args, &mut out)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn args(extra: &[&str]) -> RecordSeekArgs {
        let mut argv = vec!["recordseek"];
        argv.extend_from_slice(extra);
        argv.extend_from_slice(&["highlight", "text", "query"]);
        RecordSeekArgs::try_parse_from(argv).unwrap()
    }

    fn render<T: Serialize + HumanReadable>(result: &T, args: &RecordSeekArgs) -> String {
        let mut out = Vec::new();
        write_result("Done", result, args, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn report() -> SearchReport {
        SearchReport {
            query: "lumber".into(),
            total_results: 3,
            duration_ms: 2,
            groups: vec![GroupReport {
                label: "Bill".into(),
                total: 3,
                hits: vec![HitReport {
                    id: "bill-1".into(),
                    entity_type: "Bill".into(),
                    title: "Framing Lumber".into(),
                    score: 175.0,
                }],
            }],
            facets: FacetCounts::default(),
        }
    }

    #[test]
    fn test_human_search_report() {
        let text = render(&report(), &args(&[]));
        assert!(text.starts_with("Found 3 result(s) for \"lumber\" in 2 ms"));
        assert!(text.contains("Bill (3)"));
        assert!(text.contains("  1. Framing Lumber [bill-1] (Score: 175.0)"));
        assert!(text.contains("... 2 more"));
        assert!(!text.contains("Done"));
    }

    #[test]
    fn test_verbose_prints_message() {
        let text = render(&report(), &args(&["-vv"]));
        assert!(text.starts_with("Done\n\n"));
    }

    #[test]
    fn test_json_output() {
        let highlight = HighlightReport {
            mode: "text".into(),
            query: "lumber".into(),
            html: "<mark class=\"search-highlight\">lumber</mark>".into(),
        };
        let text = render(&highlight, &args(&["--format", "json"]));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["mode"], "text");
        assert_eq!(text.lines().count(), 1);

        let pretty = render(&highlight, &args(&["--format", "json", "--pretty"]));
        assert!(pretty.lines().count() > 1);
    }
}
