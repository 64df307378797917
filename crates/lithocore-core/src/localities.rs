use serde::{Deserialize, Serialize};

/// Description used when the provider supplies none.
pub const DESCRIPTION_PLACEHOLDER: &str = "No description available.";

/// A WGS84 position in decimal degrees.
///
/// Only constructible through [`Coordinate::new`], so both components are
/// always finite and inside their valid ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Returns `None` unless `latitude` is in `[-90, 90]` and `longitude` in
    /// `[-180, 180]`, both finite.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        (lat_ok && lon_ok).then_some(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(self) -> f64 {
        self.longitude
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            latitude: f64,
            longitude: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.latitude, raw.longitude).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "coordinate out of range: ({}, {})",
                raw.latitude, raw.longitude
            ))
        })
    }
}

/// A locality record in the canonical shape used downstream of the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLocality {
    /// Mindat locality ID.
    pub id: i64,
    pub name: String,
    /// `None` marks the record as unplaceable: it is counted but never drawn.
    pub coordinate: Option<Coordinate>,
    /// Provider description, or [`DESCRIPTION_PLACEHOLDER`].
    pub description: String,
    pub country: Option<String>,
    /// Status hint exactly as the provider sent it, if any.
    pub raw_status: Option<String>,
}

impl NormalizedLocality {
    #[must_use]
    pub fn is_placeable(&self) -> bool {
        self.coordinate.is_some()
    }

    /// Google Maps driving-directions link to the locality, for placeable records.
    #[must_use]
    pub fn route_link(&self) -> Option<String> {
        self.coordinate.map(route_link_to)
    }
}

/// Builds a Google Maps directions link ending at `coordinate`.
#[must_use]
pub fn route_link_to(coordinate: Coordinate) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&destination={},{}",
        coordinate.latitude(),
        coordinate.longitude()
    )
}

/// A geomaterial search hit, trimmed to what the map client needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineralSummary {
    pub id: i64,
    pub name: String,
    pub formula: Option<String>,
    pub colour: Option<String>,
    pub description: Option<String>,
}
