//! Catalog domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Part category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// Unclassified.
    #[serde(rename = "UNKNOWN")]
    Unknown,
    /// Propulsion.
    #[serde(rename = "ENGINE")]
    Engine,
    /// Fuel and fuel containment.
    #[serde(rename = "FUEL")]
    Fuel,
    /// Windows.
    #[serde(rename = "PORTHOLE")]
    Porthole,
    /// Aerodynamic surfaces.
    #[serde(rename = "WING")]
    Wing,
}

/// Physical dimensions and weight of a part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Length in centimeters.
    pub length_cm: f64,
    /// Width in centimeters.
    pub width_cm: f64,
    /// Height in centimeters.
    pub height_cm: f64,
    /// Weight in kilograms.
    pub weight_kg: f64,
}

/// Manufacturer of a part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    /// Manufacturer name.
    pub name: String,
    /// Country of origin as entered, surfaced for display.
    pub country: String,
    /// Official website.
    pub website: String,
}

/// A typed metadata value: string, integer, double or boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Boolean flag.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// Double-precision float.
    Double(f64),
    /// Free-form string.
    Str(String),
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Globally unique identifier.
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Detailed description.
    pub description: String,
    /// Unit price in integer minor units.
    pub price_cents: i64,
    /// Units currently available.
    pub stock_quantity: i64,
    /// Category of the part.
    pub category: Category,
    /// Physical dimensions, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    /// Manufacturer information, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<Manufacturer>,
    /// Free-form search tags.
    pub tags: Vec<String>,
    /// Typed key-value metadata.
    pub metadata: HashMap<String, MetadataValue>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Conjunctive multi-field part selection.
///
/// Within a field the values are alternatives; across fields every
/// non-empty field must match. The empty filter matches every part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartsFilter {
    /// Part ids to select.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<Uuid>,
    /// Exact part names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    /// Part categories.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,
    /// Manufacturer countries, matched case-insensitively.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub manufacturer_countries: Vec<String>,
    /// Tags; a part matches if the tag sets intersect.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl PartsFilter {
    /// Whether no field constrains the selection.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
            && self.names.is_empty()
            && self.categories.is_empty()
            && self.manufacturer_countries.is_empty()
            && self.tags.is_empty()
    }
}

/// Canonical form used for country comparisons and indexing.
#[must_use]
pub fn normalize_country(raw: &str) -> String {
    raw.trim().to_lowercase()
}
