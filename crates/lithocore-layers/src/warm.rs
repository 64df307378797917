//! Start-up population of the map: authored layers and default minerals.

use futures::future::join_all;
use lithocore_core::{Category, SitesFile};
use lithocore_mindat::{partition_placeable, LocalityFilters, MindatError, RawLocality};
use serde::Serialize;

use crate::classifier::{classify, LocalityClassifier};
use crate::registry::{LayerRegistry, Marker, MarkerOrigin};
use crate::source::LocalitySource;

/// Outcome of a default-mineral warm load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarmLoadReport {
    /// `(mineral, markers placed)` for every successful lookup.
    pub loaded: Vec<(String, usize)>,
    /// `(mineral, reason)` for every failed lookup.
    pub failed: Vec<(String, String)>,
}

impl WarmLoadReport {
    #[must_use]
    pub fn placed(&self) -> usize {
        self.loaded.iter().map(|(_, n)| n).sum()
    }
}

pub(crate) type FetchedDefaults = Vec<(String, Result<Vec<RawLocality>, MindatError>)>;

/// Looks up every mineral concurrently and waits for the whole batch.
pub(crate) async fn fetch_defaults<S: LocalitySource>(
    source: &S,
    minerals: &[String],
    filters: &LocalityFilters,
) -> FetchedDefaults {
    let lookups: Vec<_> = minerals
        .iter()
        .map(|mineral| async move {
            let result = source.localities_by_mineral(mineral, filters).await;
            (mineral.clone(), result)
        })
        .collect();
    join_all(lookups).await
}

/// Classifies successful lookups into `official`/`unofficial`; failures are
/// logged and skipped. Markers are tagged [`MarkerOrigin::WarmLoad`], so later
/// searches leave them in place.
pub(crate) fn apply_defaults<C: LocalityClassifier + ?Sized>(
    registry: &mut LayerRegistry,
    classifier: &C,
    fetched: FetchedDefaults,
) -> WarmLoadReport {
    let mut report = WarmLoadReport::default();

    for (mineral, result) in fetched {
        match result {
            Ok(localities) => {
                let parts = partition_placeable(&localities);
                let mut placed = 0;
                for locality in parts.placeable {
                    let classified = classify(locality, classifier);
                    let marker = Marker::from_classified(&classified, Some(mineral.as_str()))
                        .map(|m| m.with_origin(MarkerOrigin::WarmLoad));
                    if let Some(marker) = marker {
                        registry.add_marker(classified.category, marker);
                        placed += 1;
                    }
                }
                tracing::debug!(
                    mineral = %mineral,
                    placed,
                    unplaceable = parts.unplaceable,
                    "default mineral loaded"
                );
                report.loaded.push((mineral, placed));
            }
            Err(e) => {
                tracing::warn!(
                    mineral = %mineral,
                    error = %e,
                    "default mineral load failed; skipping"
                );
                report.failed.push((mineral, e.to_string()));
            }
        }
    }

    tracing::info!(
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        placed = report.placed(),
        "default-mineral warm load finished"
    );
    report
}

/// Loads localities for each default mineral into the classified buckets.
///
/// Partial success: a failed lookup is logged and skipped and never aborts
/// the rest of the batch. Skipped entirely when no credential is
/// configured.
pub async fn warm_load<S, C>(
    source: &S,
    registry: &mut LayerRegistry,
    classifier: &C,
    minerals: &[String],
    filters: &LocalityFilters,
) -> WarmLoadReport
where
    S: LocalitySource,
    C: LocalityClassifier + ?Sized,
{
    if !source.has_credential() {
        tracing::warn!("skipping default-mineral warm load: MINDAT_API_KEY is not configured");
        return WarmLoadReport::default();
    }
    let fetched = fetch_defaults(source, minerals, filters).await;
    apply_defaults(registry, classifier, fetched)
}

/// Places authored sample sites and potential zones. Returns the number of
/// markers added.
pub fn seed_authored_layers(registry: &mut LayerRegistry, sites: &SitesFile) -> usize {
    let mut added = 0;

    for site in &sites.sites {
        if let Some(marker) = Marker::from_site(site) {
            registry.add_marker(site.category, marker);
            added += 1;
        } else {
            tracing::warn!(site = %site.name, "authored site has invalid coordinates; skipping");
        }
    }

    for zone in &sites.zones {
        if let Some(marker) = Marker::from_zone(zone) {
            registry.add_marker(Category::Potential, marker);
            added += 1;
        } else {
            tracing::warn!(
                zone = %zone.name,
                "authored zone has fewer than 3 valid vertices; skipping"
            );
        }
    }

    tracing::info!(
        sites = sites.sites.len(),
        zones = sites.zones.len(),
        added,
        "authored layers seeded"
    );
    added
}
