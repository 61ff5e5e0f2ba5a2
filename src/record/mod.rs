//! Record model for the searchable business corpus.
//!
//! A [`Record`] is a tagged union keyed by `entityType`. Each variant carries
//! a shared [`RecordHeader`] plus its own fields; the engine only ever reads
//! records and never mutates them.

pub mod corpus;
pub mod field_metadata;
pub mod line_item;
#[allow(clippy::module_inception)]
pub mod record;

// Re-export commonly used types
pub use corpus::Corpus;
pub use field_metadata::{FieldKind, FieldMetadata};
pub use line_item::{LineItem, LineItemType};
pub use record::{
    BuildertrendRecord, DailyLogRecord, DocumentRecord, EntityType, FinancialRecord,
    MetadataValue, OrganizationRecord, PersonRecord, Record, RecordHeader, WeatherReport,
};
