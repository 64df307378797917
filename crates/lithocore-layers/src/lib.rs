//! Locality classification, map layers and the search session controller.
//!
//! Everything between the provider client and the rendering surface lives
//! here: classifying normalized localities, keeping per-category marker
//! buckets, fitting the viewport and driving one search at a time.

pub mod classifier;
pub mod error;
pub mod registry;
pub mod session;
pub mod source;
pub mod surface;
pub mod viewport;
pub mod warm;

pub use classifier::{
    classify, explanation_for, ClassifiedLocality, LexiconClassifier, LocalityClassifier,
};
pub use error::{SessionBusy, SessionFailure};
pub use registry::{Geometry, LayerRegistry, LayerSnapshot, Marker, MarkerOrigin};
pub use session::{
    SearchController, SearchMode, SearchOptions, SessionReport, SessionStatus,
    SharedSearchController,
};
pub use source::LocalitySource;
pub use surface::{Notice, NoticeLevel, RecordingSurface, RenderSurface};
pub use viewport::Bounds;
pub use warm::{seed_authored_layers, warm_load, WarmLoadReport};

#[cfg(test)]
mod testing;
