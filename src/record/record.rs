//! The [`Record`] sum type and its per-variant payloads.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::record::field_metadata::FieldMetadata;
use crate::record::line_item::LineItem;
use crate::util::number::format_plain;

/// Discriminant of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    ClientInvoice,
    PurchaseOrder,
    Bill,
    Receipt,
    Payment,
    Document,
    Person,
    Organization,
    DailyLog,
    Buildertrend,
}

impl EntityType {
    /// All entity types, in declaration order.
    pub const ALL: [EntityType; 10] = [
        EntityType::ClientInvoice,
        EntityType::PurchaseOrder,
        EntityType::Bill,
        EntityType::Receipt,
        EntityType::Payment,
        EntityType::Document,
        EntityType::Person,
        EntityType::Organization,
        EntityType::DailyLog,
        EntityType::Buildertrend,
    ];

    /// The `entityType` tag as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::ClientInvoice => "ClientInvoice",
            EntityType::PurchaseOrder => "PurchaseOrder",
            EntityType::Bill => "Bill",
            EntityType::Receipt => "Receipt",
            EntityType::Payment => "Payment",
            EntityType::Document => "Document",
            EntityType::Person => "Person",
            EntityType::Organization => "Organization",
            EntityType::DailyLog => "DailyLog",
            EntityType::Buildertrend => "Buildertrend",
        }
    }

    /// Parse a wire tag; unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<EntityType> {
        EntityType::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Whether records of this type carry amounts and line items.
    pub fn is_financial(&self) -> bool {
        matches!(
            self,
            EntityType::ClientInvoice
                | EntityType::PurchaseOrder
                | EntityType::Bill
                | EntityType::Receipt
                | EntityType::Payment
        )
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar value stored in a record's free-form metadata map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Flag(value) => write!(f, "{value}"),
            MetadataValue::Number(value) => f.write_str(&format_plain(*value)),
            MetadataValue::Text(value) => f.write_str(value),
        }
    }
}

/// Fields shared by every record variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordHeader {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetadataValue>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub field_metadata: FieldMetadata,
}

impl RecordHeader {
    /// Create a header with only the required fields set.
    pub fn new<I: Into<String>, T: Into<String>>(
        id: I,
        title: T,
        updated_at: DateTime<Utc>,
    ) -> Self {
        RecordHeader {
            id: id.into(),
            title: title.into(),
            summary: String::new(),
            project: None,
            client: None,
            status: None,
            tags: Vec::new(),
            metadata: BTreeMap::new(),
            updated_at,
            field_metadata: FieldMetadata::default(),
        }
    }

    pub fn with_summary<S: Into<String>>(mut self, summary: S) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_project<S: Into<String>>(mut self, project: S) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_client<S: Into<String>>(mut self, client: S) -> Self {
        self.client = Some(client.into());
        self
    }

    pub fn with_status<S: Into<String>>(mut self, status: S) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metadata<S: Into<String>>(mut self, key: S, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_field_metadata(mut self, field_metadata: FieldMetadata) -> Self {
        self.field_metadata = field_metadata;
        self
    }
}

/// Invoices, bills, purchase orders, receipts and payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    #[serde(flatten)]
    pub header: RecordHeader,
    pub total_value: f64,
    pub issued_date: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl FinancialRecord {
    pub fn new(header: RecordHeader, total_value: f64, issued_date: NaiveDate) -> Self {
        FinancialRecord {
            header,
            total_value,
            issued_date,
            due_date: None,
            line_items: Vec::new(),
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_line_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    /// Every amount a user sees: the total, then each line's total and unit price.
    pub fn visible_amounts(&self) -> impl Iterator<Item = f64> + '_ {
        std::iter::once(self.total_value).chain(
            self.line_items
                .iter()
                .flat_map(|item| item.monetary_values()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    #[serde(flatten)]
    pub header: RecordHeader,
    pub document_type: String,
    #[serde(default)]
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    #[serde(flatten)]
    pub header: RecordHeader,
    pub person_type: String,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub trade_specialty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRecord {
    #[serde(flatten)]
    pub header: RecordHeader,
    pub organization_type: String,
    #[serde(default)]
    pub trade_focus: Option<String>,
    #[serde(default)]
    pub primary_contact: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Site weather captured on a daily log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub conditions: String,
    #[serde(default)]
    pub high_temperature: Option<f64>,
    #[serde(default)]
    pub low_temperature: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogRecord {
    #[serde(flatten)]
    pub header: RecordHeader,
    pub log_date: NaiveDate,
    #[serde(default)]
    pub weather: WeatherReport,
    #[serde(default)]
    pub progress_notes: Vec<String>,
    #[serde(default)]
    pub crew_count: Option<u32>,
}

/// Synthetic quick-navigation entry, reachable only by its trigger phrases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildertrendRecord {
    #[serde(flatten)]
    pub header: RecordHeader,
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub trigger_queries: Vec<String>,
}

impl BuildertrendRecord {
    /// Exact, case-insensitive trigger phrase equality.
    pub fn is_triggered_by(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        !query.is_empty()
            && self
                .trigger_queries
                .iter()
                .any(|trigger| trigger.trim().to_lowercase() == query)
    }
}

/// A searchable business record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entityType")]
pub enum Record {
    ClientInvoice(FinancialRecord),
    PurchaseOrder(FinancialRecord),
    Bill(FinancialRecord),
    Receipt(FinancialRecord),
    Payment(FinancialRecord),
    Document(DocumentRecord),
    Person(PersonRecord),
    Organization(OrganizationRecord),
    DailyLog(DailyLogRecord),
    Buildertrend(BuildertrendRecord),
}

impl Record {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Record::ClientInvoice(_) => EntityType::ClientInvoice,
            Record::PurchaseOrder(_) => EntityType::PurchaseOrder,
            Record::Bill(_) => EntityType::Bill,
            Record::Receipt(_) => EntityType::Receipt,
            Record::Payment(_) => EntityType::Payment,
            Record::Document(_) => EntityType::Document,
            Record::Person(_) => EntityType::Person,
            Record::Organization(_) => EntityType::Organization,
            Record::DailyLog(_) => EntityType::DailyLog,
            Record::Buildertrend(_) => EntityType::Buildertrend,
        }
    }

    pub fn header(&self) -> &RecordHeader {
        match self {
            Record::ClientInvoice(r)
            | Record::PurchaseOrder(r)
            | Record::Bill(r)
            | Record::Receipt(r)
            | Record::Payment(r) => &r.header,
            Record::Document(r) => &r.header,
            Record::Person(r) => &r.header,
            Record::Organization(r) => &r.header,
            Record::DailyLog(r) => &r.header,
            Record::Buildertrend(r) => &r.header,
        }
    }

    pub fn id(&self) -> &str {
        &self.header().id
    }

    pub fn title(&self) -> &str {
        &self.header().title
    }

    pub fn summary(&self) -> &str {
        &self.header().summary
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.header().updated_at
    }

    pub fn field_metadata(&self) -> &FieldMetadata {
        &self.header().field_metadata
    }

    /// The financial payload, for the five money-carrying variants.
    pub fn as_financial(&self) -> Option<&FinancialRecord> {
        match self {
            Record::ClientInvoice(r)
            | Record::PurchaseOrder(r)
            | Record::Bill(r)
            | Record::Receipt(r)
            | Record::Payment(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_buildertrend(&self) -> Option<&BuildertrendRecord> {
        match self {
            Record::Buildertrend(r) => Some(r),
            _ => None,
        }
    }

    /// Concatenated, lowercased searchable text of the record.
    pub fn haystack(&self) -> String {
        let header = self.header();
        let mut parts: Vec<&str> = vec![&header.title, &header.summary];
        parts.extend(header.project.as_deref());
        parts.extend(header.client.as_deref());
        parts.extend(header.status.as_deref());
        parts.extend(header.tags.iter().map(String::as_str));

        let metadata_values: Vec<String> =
            header.metadata.values().map(|v| v.to_string()).collect();
        parts.extend(metadata_values.iter().map(String::as_str));

        match self {
            Record::ClientInvoice(r)
            | Record::PurchaseOrder(r)
            | Record::Bill(r)
            | Record::Receipt(r)
            | Record::Payment(r) => {
                for item in &r.line_items {
                    parts.push(&item.title);
                    parts.push(&item.description);
                    parts.push(item.item_type.as_str());
                    parts.push(&item.unit_of_measure);
                    parts.extend(item.cost_code.as_deref());
                    parts.extend(item.cost_code_category.as_deref());
                }
            }
            Record::Document(r) => {
                parts.push(&r.document_type);
                parts.push(&r.author);
            }
            Record::Person(r) => {
                parts.push(&r.person_type);
                parts.extend(r.job_title.as_deref());
                parts.extend(r.email.as_deref());
                parts.extend(r.phone.as_deref());
                parts.extend(r.organization.as_deref());
                parts.extend(r.trade_specialty.as_deref());
            }
            Record::Organization(r) => {
                parts.push(&r.organization_type);
                parts.extend(r.trade_focus.as_deref());
                parts.extend(r.primary_contact.as_deref());
                parts.extend(r.email.as_deref());
                parts.extend(r.phone.as_deref());
                parts.extend(r.address.as_deref());
            }
            Record::DailyLog(r) => {
                parts.push(&r.weather.conditions);
                parts.extend(r.weather.notes.as_deref());
                parts.extend(r.progress_notes.iter().map(String::as_str));
            }
            Record::Buildertrend(r) => {
                parts.push(&r.path);
                parts.push(&r.description);
                parts.extend(r.trigger_queries.iter().map(String::as_str));
            }
        }

        parts
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::record::line_item::LineItemType;

    fn header(id: &str, title: &str) -> RecordHeader {
        RecordHeader::new(id, title, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_entity_type_round_trip_names() {
        for entity_type in EntityType::ALL {
            assert_eq!(EntityType::parse(entity_type.as_str()), Some(entity_type));
        }
        assert_eq!(EntityType::parse("Invoice"), None);
        assert!(EntityType::Bill.is_financial());
        assert!(!EntityType::DailyLog.is_financial());
    }

    #[test]
    fn test_financial_haystack_includes_line_items() {
        let record = Record::Bill(
            FinancialRecord::new(
                header("b1", "Framing Lumber").with_project("Maple Street Remodel"),
                946.0,
                NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            )
            .with_line_item(
                LineItem::new("2x4 Studs", LineItemType::Material, 22.0, 43.0, 946.0)
                    .with_description("Kiln dried"),
            ),
        );

        let haystack = record.haystack();
        assert!(haystack.contains("framing lumber"));
        assert!(haystack.contains("maple street remodel"));
        assert!(haystack.contains("2x4 studs"));
        assert!(haystack.contains("kiln dried"));
        assert!(haystack.contains("material"));
        // Amounts and quantities are never part of the text.
        assert!(!haystack.contains("946"));
        assert!(!haystack.contains("22"));
    }

    #[test]
    fn test_metadata_values_join_haystack() {
        let record = Record::Document(DocumentRecord {
            header: header("d1", "Site Plan")
                .with_metadata("sheet", MetadataValue::Number(12.0))
                .with_metadata("revision", MetadataValue::Text("Rev B".into())),
            document_type: "Drawing".into(),
            author: "Avery Lin".into(),
        });

        let haystack = record.haystack();
        assert!(haystack.contains("12"));
        assert!(haystack.contains("rev b"));
        assert!(haystack.contains("drawing"));
        assert!(haystack.contains("avery lin"));
    }

    #[test]
    fn test_buildertrend_trigger() {
        let record = BuildertrendRecord {
            header: header("bt1", "Schedule"),
            path: "/app/schedule".into(),
            description: "Open the schedule".into(),
            trigger_queries: vec!["Schedule".into(), "gantt".into()],
        };
        assert!(record.is_triggered_by("schedule"));
        assert!(record.is_triggered_by("  GANTT "));
        assert!(!record.is_triggered_by("sched"));
        assert!(!record.is_triggered_by(""));
    }

    #[test]
    fn test_deserialize_tagged_record() {
        let json = r#"{
            "entityType": "Bill",
            "id": "bill-1",
            "title": "Concrete",
            "updatedAt": "2024-05-01T12:00:00Z",
            "totalValue": 1250.5,
            "issuedDate": "2024-04-30",
            "lineItems": [
                {"title": "Ready mix", "type": "Material", "quantity": 5,
                 "unitPrice": 250.1, "total": 1250.5, "costCode": "03-300",
                 "costCodeCategory": "Concrete"}
            ]
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.entity_type(), EntityType::Bill);
        let financial = record.as_financial().unwrap();
        assert_eq!(financial.total_value, 1250.5);
        assert_eq!(financial.line_items[0].cost_code.as_deref(), Some("03-300"));
        assert_eq!(
            financial.visible_amounts().collect::<Vec<_>>(),
            vec![1250.5, 1250.5, 250.1]
        );
    }
}
