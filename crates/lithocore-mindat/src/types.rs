//! Raw Mindat payload shapes.
//!
//! Every field except `id` is optional: the provider omits or nulls fields
//! freely, and entries that still fail to deserialize are skipped by the
//! client rather than failing the whole page.

use serde::Deserialize;

/// A hit from `GET geomaterials/`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawGeomaterial {
    pub id: i64,
    pub name: Option<String>,
    pub ima_formula: Option<String>,
    pub formula: Option<String>,
    pub colour: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub description_short: Option<String>,
}

/// A record from `GET localities/`.
///
/// Coordinates stay as raw JSON because the provider sends numbers, numeric
/// strings, empty strings or `null` depending on the record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawLocality {
    pub id: i64,
    pub name: Option<String>,
    pub latitude: Option<serde_json::Value>,
    pub longitude: Option<serde_json::Value>,
    pub description: Option<String>,
    pub status: Option<serde_json::Value>,
    pub country: Option<String>,
}

/// A record from `GET minerals/`, used only for its short description.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawMineral {
    pub id: i64,
    pub name: Option<String>,
    pub description_short: Option<String>,
}
