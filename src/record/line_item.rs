//! Line items attached to financial records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of cost a line item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineItemType {
    Material,
    Labor,
    Subcontractor,
    Other,
    Equipment,
}

impl LineItemType {
    /// Display label used in the searchable text.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineItemType::Material => "Material",
            LineItemType::Labor => "Labor",
            LineItemType::Subcontractor => "Subcontractor",
            LineItemType::Other => "Other",
            LineItemType::Equipment => "Equipment",
        }
    }
}

impl fmt::Display for LineItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single priced line on an invoice, bill, purchase order, ...
///
/// `total` is expected to equal `quantity * unit_price` rounded, but that is
/// the producer's responsibility and is never checked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub item_type: LineItemType,
    pub quantity: f64,
    #[serde(default)]
    pub unit_of_measure: String,
    pub unit_price: f64,
    pub total: f64,
    #[serde(default)]
    pub cost_code: Option<String>,
    #[serde(default)]
    pub cost_code_category: Option<String>,
}

impl LineItem {
    /// Create a line item with empty description and no cost code.
    pub fn new<S: Into<String>>(
        title: S,
        item_type: LineItemType,
        quantity: f64,
        unit_price: f64,
        total: f64,
    ) -> Self {
        LineItem {
            title: title.into(),
            description: String::new(),
            item_type,
            quantity,
            unit_of_measure: String::new(),
            unit_price,
            total,
            cost_code: None,
            cost_code_category: None,
        }
    }

    /// Set the description.
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Set the unit of measure.
    pub fn with_unit_of_measure<S: Into<String>>(mut self, unit: S) -> Self {
        self.unit_of_measure = unit.into();
        self
    }

    /// Set the cost code and its category.
    pub fn with_cost_code<S: Into<String>, C: Into<String>>(mut self, code: S, category: C) -> Self {
        self.cost_code = Some(code.into());
        self.cost_code_category = Some(category.into());
        self
    }

    /// The currency amounts a user sees on this line: total and unit price.
    pub fn monetary_values(&self) -> [f64; 2] {
        [self.total, self.unit_price]
    }
}
