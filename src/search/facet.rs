//! Faceted counts and facet-selection filtering.
//!
//! Every record has at most one derived value per facet key. Counts are
//! computed over the current result set; selections are OR within a key and
//! AND across keys. The special `groupBy` selection never filters.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use ahash::AHashMap;
use chrono::NaiveDate;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Selection key that reshapes grouping instead of filtering.
pub const GROUP_BY_KEY: &str = "groupBy";

/// A faceted dimension of the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacetKey {
    EntityType,
    Project,
    Status,
    DocumentType,
    Client,
    IssuedDate,
    TotalValue,
    PersonType,
    ContactOrganization,
    OrganizationType,
    TradeFocus,
    CostCodeCategory,
    CostCode,
}

impl FacetKey {
    pub const ALL: [FacetKey; 13] = [
        FacetKey::EntityType,
        FacetKey::Project,
        FacetKey::Status,
        FacetKey::DocumentType,
        FacetKey::Client,
        FacetKey::IssuedDate,
        FacetKey::TotalValue,
        FacetKey::PersonType,
        FacetKey::ContactOrganization,
        FacetKey::OrganizationType,
        FacetKey::TradeFocus,
        FacetKey::CostCodeCategory,
        FacetKey::CostCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FacetKey::EntityType => "entityType",
            FacetKey::Project => "project",
            FacetKey::Status => "status",
            FacetKey::DocumentType => "documentType",
            FacetKey::Client => "client",
            FacetKey::IssuedDate => "issuedDate",
            FacetKey::TotalValue => "totalValue",
            FacetKey::PersonType => "personType",
            FacetKey::ContactOrganization => "contactOrganization",
            FacetKey::OrganizationType => "organizationType",
            FacetKey::TradeFocus => "tradeFocus",
            FacetKey::CostCodeCategory => "costCodeCategory",
            FacetKey::CostCode => "costCode",
        }
    }

    pub fn parse(key: &str) -> Option<FacetKey> {
        FacetKey::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for FacetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket label for how long ago a financial record was issued.
pub fn issued_date_bucket(issued: NaiveDate, today: NaiveDate) -> &'static str {
    let age = (today - issued).num_days();
    match age {
        i64::MIN..=7 => "Last 7 days",
        8..=30 => "Last 30 days",
        31..=90 => "Last 3 months",
        91..=180 => "Last 6 months",
        181..=365 => "Last year",
        366..=730 => "Last 2 years",
        _ => "Older",
    }
}

/// Bucket label for a financial record's total.
pub fn total_value_bucket(total: f64) -> &'static str {
    if total < 10_000.0 {
        "<$10k"
    } else if total < 50_000.0 {
        "$10k\u{2013}$50k"
    } else if total < 100_000.0 {
        "$50k\u{2013}$100k"
    } else {
        "$100k+"
    }
}

/// Most frequent value; ties go to the value seen first.
fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    let mut best: Option<(&'a str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The single value a record has for a facet key, if any.
pub fn facet_value(record: &Record, key: FacetKey, today: NaiveDate) -> Option<String> {
    let header = record.header();
    match key {
        FacetKey::EntityType => Some(record.entity_type().as_str().to_string()),
        FacetKey::Project => non_empty(header.project.as_deref()),
        FacetKey::Status => non_empty(header.status.as_deref()),
        FacetKey::Client => non_empty(header.client.as_deref()),
        FacetKey::DocumentType => match record {
            Record::Document(r) => non_empty(Some(&r.document_type)),
            _ => None,
        },
        FacetKey::IssuedDate => record
            .as_financial()
            .map(|r| issued_date_bucket(r.issued_date, today).to_string()),
        FacetKey::TotalValue => record
            .as_financial()
            .map(|r| total_value_bucket(r.total_value).to_string()),
        FacetKey::PersonType => match record {
            Record::Person(r) => non_empty(Some(&r.person_type)),
            _ => None,
        },
        FacetKey::ContactOrganization => match record {
            Record::Person(r) => non_empty(r.organization.as_deref()),
            _ => None,
        },
        FacetKey::OrganizationType => match record {
            Record::Organization(r) => non_empty(Some(&r.organization_type)),
            _ => None,
        },
        FacetKey::TradeFocus => match record {
            Record::Organization(r) => non_empty(r.trade_focus.as_deref()),
            _ => None,
        },
        FacetKey::CostCodeCategory => record.as_financial().and_then(|r| {
            non_empty(mode(
                r.line_items
                    .iter()
                    .filter_map(|item| item.cost_code_category.as_deref()),
            ))
        }),
        FacetKey::CostCode => record.as_financial().and_then(|r| {
            non_empty(mode(
                r.line_items.iter().filter_map(|item| item.cost_code.as_deref()),
            ))
        }),
    }
}

/// Count of records sharing one facet value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValueCount {
    pub value: String,
    pub count: usize,
}

/// Per-key value counts, each sorted by descending count then value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetCounts {
    facets: BTreeMap<FacetKey, Vec<FacetValueCount>>,
}

impl FacetCounts {
    /// Counts for one key; empty when no record has a value for it.
    pub fn get(&self, key: FacetKey) -> &[FacetValueCount] {
        self.facets.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Count of a single value.
    pub fn count(&self, key: FacetKey, value: &str) -> usize {
        self.get(key)
            .iter()
            .find(|entry| entry.value == value)
            .map_or(0, |entry| entry.count)
    }

    /// Sum of all counts for a key.
    pub fn total(&self, key: FacetKey) -> usize {
        self.get(key).iter().map(|entry| entry.count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FacetKey, &[FacetValueCount])> {
        self.facets.iter().map(|(key, values)| (*key, values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}

/// Count facet values over an already-filtered set of records.
pub fn compute_facets<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    today: NaiveDate,
) -> FacetCounts {
    let mut counts: AHashMap<FacetKey, AHashMap<String, usize>> = AHashMap::new();
    for record in records {
        for key in FacetKey::ALL {
            if let Some(value) = facet_value(record, key, today) {
                *counts.entry(key).or_default().entry(value).or_insert(0) += 1;
            }
        }
    }

    let facets = counts
        .into_iter()
        .map(|(key, values)| {
            let mut entries: Vec<FacetValueCount> = values
                .into_iter()
                .map(|(value, count)| FacetValueCount { value, count })
                .collect();
            entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
            (key, entries)
        })
        .collect();

    FacetCounts { facets }
}

/// Selected values per facet key, plus the optional `groupBy` choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetSelections(BTreeMap<String, BTreeSet<String>>);

impl FacetSelections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a selected value for a key. A `groupBy` value replaces the
    /// previous one.
    pub fn select<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        if key == GROUP_BY_KEY {
            self.set_group_by(value);
        } else {
            self.0.entry(key).or_default().insert(value.into());
        }
    }

    /// Builder form of [`FacetSelections::select`].
    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.select(key, value);
        self
    }

    /// Replace the `groupBy` choice; at most one value is kept.
    pub fn set_group_by<V: Into<String>>(&mut self, value: V) {
        self.0
            .insert(GROUP_BY_KEY.to_string(), BTreeSet::from([value.into()]));
    }

    pub fn group_by(&self) -> Option<&str> {
        self.0
            .get(GROUP_BY_KEY)
            .and_then(|values| values.iter().next())
            .map(String::as_str)
    }

    pub fn values(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.0.get(key)
    }

    /// Selections that filter: non-empty and not `groupBy`.
    pub fn filters(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.0
            .iter()
            .filter(|(key, values)| key.as_str() != GROUP_BY_KEY && !values.is_empty())
            .map(|(key, values)| (key.as_str(), values))
    }

    pub fn is_empty(&self) -> bool {
        self.filters().next().is_none()
    }

    /// Filtering keys that name no facet.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.filters()
            .map(|(key, _)| key)
            .filter(|key| FacetKey::parse(key).is_none())
    }
}

/// Whether a record's facet values satisfy every active selection.
///
/// Unknown keys are ignored.
pub fn matches_selections(record: &Record, selections: &FacetSelections, today: NaiveDate) -> bool {
    for (key, selected) in selections.filters() {
        let Some(facet) = FacetKey::parse(key) else {
            trace!("Skipping selection on unknown facet '{key}'");
            continue;
        };
        match facet_value(record, facet, today) {
            Some(value) if selected.contains(&value) => {}
            _ => return false,
        }
    }
    true
}
