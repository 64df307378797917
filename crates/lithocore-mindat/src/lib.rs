//! Client for the Mindat REST API.
//!
//! Holds the API credential process-side, issues one request per operation
//! and normalizes the provider's payloads into `lithocore-core` types.

pub mod client;
pub mod credential;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::{LocalityFilters, MindatClient};
pub use credential::CredentialGuard;
pub use error::{ConfigurationError, MindatError, ProviderError, ProviderErrorKind};
pub use normalize::{normalize_geomaterial, normalize_locality, partition_placeable, Partitioned};
pub use types::{RawGeomaterial, RawLocality, RawMineral};
