//! Partitioning matched records into display groups.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::scorer::ScoredRecord;
use crate::record::{EntityType, Record};
use crate::search::config::GroupLimits;

/// Display order of entity-type groups.
pub const ENTITY_TYPE_PRIORITY: [EntityType; 10] = [
    EntityType::Buildertrend,
    EntityType::Document,
    EntityType::DailyLog,
    EntityType::Person,
    EntityType::Organization,
    EntityType::ClientInvoice,
    EntityType::PurchaseOrder,
    EntityType::Bill,
    EntityType::Receipt,
    EntityType::Payment,
];

/// Dimension used to partition results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupBy {
    #[default]
    EntityType,
    Project,
    Status,
    Client,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::EntityType => "entityType",
            GroupBy::Project => "project",
            GroupBy::Status => "status",
            GroupBy::Client => "client",
        }
    }

    pub fn parse(value: &str) -> Option<GroupBy> {
        [
            GroupBy::EntityType,
            GroupBy::Project,
            GroupBy::Status,
            GroupBy::Client,
        ]
        .into_iter()
        .find(|g| g.as_str() == value)
    }

    /// Capitalized name used in "No <Dimension>" labels.
    pub fn dimension(&self) -> &'static str {
        match self {
            GroupBy::EntityType => "Entity Type",
            GroupBy::Project => "Project",
            GroupBy::Status => "Status",
            GroupBy::Client => "Client",
        }
    }

    fn value_of<'r>(&self, record: &'r Record) -> Option<&'r str> {
        let header = record.header();
        let value = match self {
            GroupBy::EntityType => return Some(record.entity_type().as_str()),
            GroupBy::Project => header.project.as_deref(),
            GroupBy::Status => header.status.as_deref(),
            GroupBy::Client => header.client.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a result group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum GroupKey {
    EntityType(EntityType),
    Value(String),
    /// Records with no value for the grouping dimension.
    Missing(GroupBy),
}

impl GroupKey {
    pub fn label(&self) -> String {
        match self {
            GroupKey::EntityType(t) => t.as_str().to_string(),
            GroupKey::Value(v) => v.clone(),
            GroupKey::Missing(dimension) => format!("No {}", dimension.dimension()),
        }
    }

    pub fn entity_type(&self) -> Option<EntityType> {
        match self {
            GroupKey::EntityType(t) => Some(*t),
            _ => None,
        }
    }

    fn priority(&self) -> usize {
        match self {
            GroupKey::EntityType(t) => ENTITY_TYPE_PRIORITY
                .iter()
                .position(|p| p == t)
                .unwrap_or(ENTITY_TYPE_PRIORITY.len()),
            GroupKey::Value(_) => 0,
            GroupKey::Missing(_) => usize::MAX,
        }
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority()
            .cmp(&other.priority())
            .then_with(|| self.label().cmp(&other.label()))
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A labelled slice of the result set.
#[derive(Debug, Clone, Serialize)]
pub struct ResultGroup<'a> {
    pub key: GroupKey,
    pub label: String,
    /// Records before any group limit was applied.
    pub total: usize,
    pub records: Vec<ScoredRecord<'a>>,
}

impl ResultGroup<'_> {
    /// Whether the group limit hid some records.
    pub fn is_truncated(&self) -> bool {
        self.records.len() < self.total
    }
}

fn group_key(record: &Record, group_by: GroupBy) -> GroupKey {
    match (group_by, group_by.value_of(record)) {
        (GroupBy::EntityType, _) => GroupKey::EntityType(record.entity_type()),
        (_, Some(value)) => GroupKey::Value(value.to_string()),
        (_, None) => GroupKey::Missing(group_by),
    }
}

/// Partition records, keeping their order inside each group.
pub fn build_groups<'a>(records: &[ScoredRecord<'a>], group_by: GroupBy) -> Vec<ResultGroup<'a>> {
    let mut groups: Vec<ResultGroup<'a>> = Vec::new();
    for scored in records {
        let key = group_key(scored.record, group_by);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.records.push(*scored),
            None => groups.push(ResultGroup {
                label: key.label(),
                key,
                total: 0,
                records: vec![*scored],
            }),
        }
    }
    for group in &mut groups {
        group.total = group.records.len();
    }
    groups.sort_by(|a, b| a.key.cmp(&b.key));
    groups
}

/// Truncate each group to its cap and drop groups left empty.
pub fn apply_group_limits<'a>(
    groups: Vec<ResultGroup<'a>>,
    limits: &GroupLimits,
) -> Vec<ResultGroup<'a>> {
    groups
        .into_iter()
        .filter_map(|mut group| {
            let limit = limits.limit_for(group.key.entity_type());
            group.records.truncate(limit);
            (!group.records.is_empty()).then_some(group)
        })
        .collect()
}
