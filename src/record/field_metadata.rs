//! Per-record flags telling which fields carry money.
//!
//! Implicit numeric queries (no leading `$`) may fall back to matching free
//! text, but only against fields the producer marked as monetary. A quantity
//! of `5` must never satisfy a `5` typed as an amount.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field name of a line item's total.
pub const LINE_ITEM_TOTAL: &str = "lineItemTotal";
/// Field name of a line item's unit price.
pub const LINE_ITEM_UNIT_PRICE: &str = "lineItemUnitPrice";
/// Field name of a line item's quantity.
pub const LINE_ITEM_QUANTITY: &str = "lineItemQuantity";
/// Field name of a line item's title.
pub const LINE_ITEM_TITLE: &str = "lineItemTitle";
/// Field name of a line item's description.
pub const LINE_ITEM_DESCRIPTION: &str = "lineItemDescription";
/// Field name of the record title.
pub const TITLE: &str = "title";
/// Field name of the record summary.
pub const SUMMARY: &str = "summary";

/// Classification of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// The field holds a currency amount.
    Monetary,
    /// The field holds anything else (quantities, descriptions, ...).
    NonMonetary,
}

/// Side-channel map from field name to [`FieldKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMetadata(BTreeMap<String, FieldKind>);

impl FieldMetadata {
    /// Create an empty map; every lookup falls back to the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a field with an explicit kind.
    pub fn with_field<S: Into<String>>(mut self, field: S, kind: FieldKind) -> Self {
        self.0.insert(field.into(), kind);
        self
    }

    /// Explicit kind recorded for a field, if any.
    pub fn get(&self, field: &str) -> Option<FieldKind> {
        self.0.get(field).copied()
    }

    /// Whether the field carries money.
    ///
    /// Unlisted fields default to monetary only for line-item totals and
    /// unit prices.
    pub fn is_monetary(&self, field: &str) -> bool {
        match self.get(field) {
            Some(kind) => kind == FieldKind::Monetary,
            None => matches!(field, LINE_ITEM_TOTAL | LINE_ITEM_UNIT_PRICE),
        }
    }
}
