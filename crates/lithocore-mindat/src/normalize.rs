//! Normalization of raw Mindat payloads into `lithocore-core` records.
//!
//! All functions here are pure: the same raw input always yields the same
//! output.

use lithocore_core::{Coordinate, MineralSummary, NormalizedLocality, DESCRIPTION_PLACEHOLDER};

use crate::types::{RawGeomaterial, RawLocality};

/// A normalized batch split by whether each record can be drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partitioned {
    pub placeable: Vec<NormalizedLocality>,
    /// Records dropped for lacking a usable coordinate.
    pub unplaceable: usize,
}

impl Partitioned {
    #[must_use]
    pub fn total(&self) -> usize {
        self.placeable.len() + self.unplaceable
    }
}

/// Parses one coordinate component from a JSON number or numeric string.
///
/// Returns `None` for `null`, empty strings, non-numeric text and
/// non-finite values. Range checks happen in [`Coordinate::new`].
#[must_use]
pub fn parse_degrees(value: &serde_json::Value) -> Option<f64> {
    let degrees = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    degrees.is_finite().then_some(degrees)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn status_text(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => non_blank(Some(s)),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Converts a raw locality into its canonical shape.
///
/// A record is placeable only when both latitude and longitude parse to
/// finite, in-range degrees; otherwise `coordinate` is `None`.
#[must_use]
pub fn normalize_locality(raw: &RawLocality) -> NormalizedLocality {
    let latitude = raw.latitude.as_ref().and_then(parse_degrees);
    let longitude = raw.longitude.as_ref().and_then(parse_degrees);
    let coordinate = match (latitude, longitude) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon),
        _ => None,
    };

    NormalizedLocality {
        id: raw.id,
        name: non_blank(raw.name.as_deref()).unwrap_or_else(|| format!("Locality #{}", raw.id)),
        coordinate,
        description: non_blank(raw.description.as_deref())
            .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string()),
        country: non_blank(raw.country.as_deref()),
        raw_status: status_text(raw.status.as_ref()),
    }
}

/// Normalizes a batch and splits it into placeable records and a count of
/// unplaceable ones.
#[must_use]
pub fn partition_placeable(raw: &[RawLocality]) -> Partitioned {
    let mut out = Partitioned::default();
    for locality in raw.iter().map(normalize_locality) {
        if locality.is_placeable() {
            out.placeable.push(locality);
        } else {
            tracing::debug!(locality_id = locality.id, "locality has no usable coordinate; not placed");
            out.unplaceable += 1;
        }
    }
    out
}

/// Trims a geomaterial search hit to a [`MineralSummary`].
#[must_use]
pub fn normalize_geomaterial(raw: &RawGeomaterial) -> MineralSummary {
    MineralSummary {
        id: raw.id,
        name: non_blank(raw.name.as_deref()).unwrap_or_else(|| format!("Mineral #{}", raw.id)),
        formula: non_blank(raw.ima_formula.as_deref()).or_else(|| non_blank(raw.formula.as_deref())),
        colour: non_blank(raw.colour.as_deref()).or_else(|| non_blank(raw.color.as_deref())),
        description: non_blank(raw.description.as_deref())
            .or_else(|| non_blank(raw.description_short.as_deref())),
    }
}
