//! Per-category marker buckets and their visibility.

use std::collections::BTreeMap;

use lithocore_core::{Category, Coordinate, PotentialZone, SampleSite};
use serde::Serialize;

use crate::classifier::{explanation_for, ClassifiedLocality};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates", rename_all = "camelCase")]
pub enum Geometry {
    Point(Coordinate),
    /// Closed ring; the last vertex connects back to the first.
    Polygon(Vec<Coordinate>),
}

impl Geometry {
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        match self {
            Geometry::Point(point) => std::slice::from_ref(point),
            Geometry::Polygon(ring) => ring,
        }
    }
}

/// Where a marker came from, which decides how long it lives.
///
/// Only `Search` markers are removed when a new search starts; authored
/// sites and warm-loaded defaults stay for the life of the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerOrigin {
    Authored,
    WarmLoad,
    #[default]
    Search,
}

/// One drawable item in a layer bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub geometry: Geometry,
    pub title: String,
    pub mineral: Option<String>,
    pub description: String,
    pub explanation: String,
    pub route_link: Option<String>,
    /// Overrides the category's default colour.
    pub color: Option<String>,
    pub origin: MarkerOrigin,
}

impl Marker {
    /// Marker for a classified locality. Returns `None` for unplaceable
    /// records.
    #[must_use]
    pub fn from_classified(classified: &ClassifiedLocality, mineral: Option<&str>) -> Option<Self> {
        let locality = &classified.locality;
        let coordinate = locality.coordinate?;
        Some(Self {
            geometry: Geometry::Point(coordinate),
            title: locality.name.clone(),
            mineral: mineral.map(str::to_owned),
            description: locality.description.clone(),
            explanation: classified.explanation.to_string(),
            route_link: locality.route_link(),
            color: None,
            origin: MarkerOrigin::Search,
        })
    }

    #[must_use]
    pub fn with_origin(mut self, origin: MarkerOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Marker for an authored sample site. Returns `None` if the site's
    /// coordinates are invalid.
    #[must_use]
    pub fn from_site(site: &SampleSite) -> Option<Self> {
        let coordinate = site.coordinate()?;
        Some(Self {
            geometry: Geometry::Point(coordinate),
            title: site.name.clone(),
            mineral: Some(site.mineral.clone()),
            description: site.description.clone(),
            explanation: explanation_for(site.category).to_string(),
            route_link: site
                .route_link
                .clone()
                .or_else(|| Some(lithocore_core::route_link_to(coordinate))),
            color: site.color.clone(),
            origin: MarkerOrigin::Authored,
        })
    }

    /// Polygon marker for an authored potential zone.
    #[must_use]
    pub fn from_zone(zone: &PotentialZone) -> Option<Self> {
        let ring = zone.vertices();
        if ring.len() < 3 {
            return None;
        }
        Some(Self {
            geometry: Geometry::Polygon(ring),
            title: zone.name.clone(),
            mineral: zone.mineral.clone(),
            description: zone.explanation().to_string(),
            explanation: explanation_for(Category::Potential).to_string(),
            route_link: None,
            color: None,
            origin: MarkerOrigin::Authored,
        })
    }
}

#[derive(Debug, Clone, Default)]
struct Bucket {
    markers: Vec<Marker>,
    visible: bool,
}

/// Serializable view of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSnapshot {
    pub category: Category,
    pub label: &'static str,
    pub color: &'static str,
    pub visible: bool,
    pub count: usize,
    pub markers: Vec<Marker>,
}

/// Mapping from category to its marker bucket.
///
/// Not designed for concurrent writers: the session driving a search owns
/// it for the duration of a classify-and-populate pass.
#[derive(Debug, Clone)]
pub struct LayerRegistry {
    buckets: BTreeMap<Category, Bucket>,
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerRegistry {
    /// Empty registry. Search results and the classified buckets start
    /// visible; authored zones and background sites start hidden.
    #[must_use]
    pub fn new() -> Self {
        let buckets = Category::ALL
            .into_iter()
            .map(|category| {
                let visible = !matches!(category, Category::Potential | Category::Background);
                (
                    category,
                    Bucket {
                        markers: Vec::new(),
                        visible,
                    },
                )
            })
            .collect();
        Self { buckets }
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Bucket {
        self.buckets.entry(category).or_default()
    }

    pub fn clear(&mut self, category: Category) {
        self.bucket_mut(category).markers.clear();
    }

    /// Removes the markers a previous search placed in `category`, keeping
    /// authored and warm-loaded ones.
    pub fn clear_search_results(&mut self, category: Category) {
        self.bucket_mut(category)
            .markers
            .retain(|m| m.origin != MarkerOrigin::Search);
    }

    pub fn add_marker(&mut self, category: Category, marker: Marker) {
        self.bucket_mut(category).markers.push(marker);
    }

    /// Every point of every marker in `categories`, including polygon
    /// vertices. Used only to compute a containing viewport.
    #[must_use]
    pub fn all_points(&self, categories: &[Category]) -> Vec<Coordinate> {
        categories
            .iter()
            .filter_map(|category| self.buckets.get(category))
            .flat_map(|bucket| bucket.markers.iter())
            .flat_map(|marker| marker.geometry.points().iter().copied())
            .collect()
    }

    /// Like [`all_points`](Self::all_points), restricted to markers of one
    /// origin.
    #[must_use]
    pub fn points_from(&self, categories: &[Category], origin: MarkerOrigin) -> Vec<Coordinate> {
        categories
            .iter()
            .filter_map(|category| self.buckets.get(category))
            .flat_map(|bucket| bucket.markers.iter())
            .filter(|marker| marker.origin == origin)
            .flat_map(|marker| marker.geometry.points().iter().copied())
            .collect()
    }

    /// Number of markers of one origin in `category`.
    #[must_use]
    pub fn count_from(&self, category: Category, origin: MarkerOrigin) -> usize {
        self.bucket(category)
            .iter()
            .filter(|m| m.origin == origin)
            .count()
    }

    pub fn set_visible(&mut self, category: Category, visible: bool) {
        self.bucket_mut(category).visible = visible;
    }

    #[must_use]
    pub fn is_visible(&self, category: Category) -> bool {
        self.buckets.get(&category).is_some_and(|b| b.visible)
    }

    #[must_use]
    pub fn bucket(&self, category: Category) -> &[Marker] {
        self.buckets
            .get(&category)
            .map(|b| b.markers.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self, category: Category) -> usize {
        self.bucket(category).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(|b| b.markers.is_empty())
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<LayerSnapshot> {
        Category::ALL
            .into_iter()
            .map(|category| LayerSnapshot {
                category,
                label: category.legend_label(),
                color: category.default_color(),
                visible: self.is_visible(category),
                count: self.len(category),
                markers: self.bucket(category).to_vec(),
            })
            .collect()
    }
}
