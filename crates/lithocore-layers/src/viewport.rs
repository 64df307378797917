//! Viewport fitting over placed markers.

use lithocore_core::Coordinate;
use serde::Serialize;

/// Padding ratio applied before fitting, on each side.
pub const DEFAULT_PADDING: f64 = 0.2;

/// Smallest span, in degrees, a fitted viewport is widened to.
const MIN_SPAN_DEGREES: f64 = 0.01;

/// Axis-aligned geographic rectangle in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Smallest bounds containing every point, or `None` for an empty set.
    ///
    /// A single point (or a set with no extent on one axis) is widened to
    /// a minimum span so the viewport never collapses.
    #[must_use]
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds {
            south: first.latitude(),
            west: first.longitude(),
            north: first.latitude(),
            east: first.longitude(),
        };
        for point in iter {
            bounds.south = bounds.south.min(point.latitude());
            bounds.north = bounds.north.max(point.latitude());
            bounds.west = bounds.west.min(point.longitude());
            bounds.east = bounds.east.max(point.longitude());
        }
        Some(bounds.widen_degenerate())
    }

    fn widen_degenerate(self) -> Self {
        let mut out = self;
        if out.north - out.south < MIN_SPAN_DEGREES {
            let mid = (out.north + out.south) / 2.0;
            out.south = (mid - MIN_SPAN_DEGREES / 2.0).max(-90.0);
            out.north = (mid + MIN_SPAN_DEGREES / 2.0).min(90.0);
        }
        if out.east - out.west < MIN_SPAN_DEGREES {
            let mid = (out.east + out.west) / 2.0;
            out.west = (mid - MIN_SPAN_DEGREES / 2.0).max(-180.0);
            out.east = (mid + MIN_SPAN_DEGREES / 2.0).min(180.0);
        }
        out
    }

    /// Expands each side by `ratio` of the current height/width, clamped to
    /// valid degrees.
    #[must_use]
    pub fn pad(self, ratio: f64) -> Self {
        let lat_pad = (self.north - self.south) * ratio;
        let lon_pad = (self.east - self.west) * ratio;
        Bounds {
            south: (self.south - lat_pad).max(-90.0),
            west: (self.west - lon_pad).max(-180.0),
            north: (self.north + lat_pad).min(90.0),
            east: (self.east + lon_pad).min(180.0),
        }
    }

    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.south..=self.north).contains(&point.latitude())
            && (self.west..=self.east).contains(&point.longitude())
    }

    #[must_use]
    pub fn center(&self) -> Option<Coordinate> {
        Coordinate::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}
