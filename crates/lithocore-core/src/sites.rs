//! Authored map layers: sample sites and potential zones.
//!
//! These are static demonstration data loaded once at start, not derived
//! from provider records and never passed through classification.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::localities::Coordinate;
use crate::ConfigError;

/// Explanation attached to zones that do not author their own.
pub const ZONE_PLACEHOLDER_EXPLANATION: &str =
    "Unverified prospect zone for demonstration; not derived from geological survey data.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSite {
    pub category: Category,
    pub name: String,
    pub mineral: String,
    pub latitude: f64,
    pub longitude: f64,
    pub color: Option<String>,
    pub description: String,
    pub route_link: Option<String>,
}

impl SampleSite {
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotentialZone {
    pub name: String,
    pub mineral: Option<String>,
    /// Outline as `[latitude, longitude]` pairs; the ring is implicitly closed.
    pub polygon: Vec<[f64; 2]>,
    pub explanation: Option<String>,
}

impl PotentialZone {
    /// Valid vertices of the outline, in authored order.
    #[must_use]
    pub fn vertices(&self) -> Vec<Coordinate> {
        self.polygon
            .iter()
            .filter_map(|[lat, lon]| Coordinate::new(*lat, *lon))
            .collect()
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        self.explanation
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(ZONE_PLACEHOLDER_EXPLANATION)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SitesFile {
    #[serde(default)]
    pub sites: Vec<SampleSite>,
    #[serde(default)]
    pub zones: Vec<PotentialZone>,
}

/// Load and validate the authored layers from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sites(path: &Path) -> Result<SitesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sites(&content)
}

/// Like [`load_sites`], but a missing file yields an empty [`SitesFile`].
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_sites_or_default(path: &Path) -> Result<SitesFile, ConfigError> {
    match load_sites(path) {
        Err(ConfigError::SitesFileIo { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            Ok(SitesFile::default())
        }
        other => other,
    }
}

/// Parse and validate authored layers from YAML text.
///
/// # Errors
///
/// Returns [`ConfigError::SitesFileParse`] for malformed YAML and
/// [`ConfigError::Validation`] for semantically invalid entries.
pub fn parse_sites(content: &str) -> Result<SitesFile, ConfigError> {
    let sites_file: SitesFile =
        serde_yaml::from_str(content).map_err(ConfigError::SitesFileParse)?;
    validate_sites(&sites_file)?;
    Ok(sites_file)
}

fn validate_sites(sites_file: &SitesFile) -> Result<(), ConfigError> {
    for site in &sites_file.sites {
        if site.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site name must be non-empty".to_string(),
            ));
        }

        if matches!(site.category, Category::SearchResult | Category::Potential) {
            return Err(ConfigError::Validation(format!(
                "site '{}' has category '{}'; sites must be official, unofficial or background",
                site.name, site.category
            )));
        }

        if site.coordinate().is_none() {
            return Err(ConfigError::Validation(format!(
                "site '{}' has invalid coordinates ({}, {})",
                site.name, site.latitude, site.longitude
            )));
        }
    }

    let mut seen_zones = HashSet::new();
    for zone in &sites_file.zones {
        if zone.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "zone name must be non-empty".to_string(),
            ));
        }

        if !seen_zones.insert(zone.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate zone name: '{}'",
                zone.name
            )));
        }

        if zone.vertices().len() != zone.polygon.len() {
            return Err(ConfigError::Validation(format!(
                "zone '{}' has a vertex with invalid coordinates",
                zone.name
            )));
        }

        if zone.polygon.len() < 3 {
            return Err(ConfigError::Validation(format!(
                "zone '{}' needs at least 3 vertices, got {}",
                zone.name,
                zone.polygon.len()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "sites_test.rs"]
mod tests;
