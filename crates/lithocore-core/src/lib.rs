//! Shared configuration and domain types for the `LithoCore` locality map.

pub mod app_config;
pub mod category;
pub mod config;
pub mod error;
pub mod localities;
pub mod sites;

pub use app_config::{AppConfig, Environment};
pub use category::Category;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use localities::{
    route_link_to, Coordinate, MineralSummary, NormalizedLocality, DESCRIPTION_PLACEHOLDER,
};
pub use sites::{
    load_sites, load_sites_or_default, parse_sites, PotentialZone, SampleSite, SitesFile,
    ZONE_PLACEHOLDER_EXPLANATION,
};
