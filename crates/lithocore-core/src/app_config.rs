use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub sites_path: PathBuf,
    /// Mindat API key. Optional at startup; features that need it refuse to
    /// run until it is configured.
    pub mindat_api_key: Option<String>,
    pub mindat_base_url: String,
    pub provider_timeout_secs: u64,
    pub session_deadline_secs: u64,
    pub user_agent: String,
    /// Country filter for mineral-name locality lookups. `None` searches worldwide.
    pub search_country: Option<String>,
    pub mineral_page_size: u32,
    pub locality_page_size: u32,
    pub default_minerals: Vec<String>,
    pub rate_limit_per_minute: usize,
}

impl AppConfig {
    #[must_use]
    pub fn has_mindat_api_key(&self) -> bool {
        self.mindat_api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("sites_path", &self.sites_path)
            .field(
                "mindat_api_key",
                &self.mindat_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("mindat_base_url", &self.mindat_base_url)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("session_deadline_secs", &self.session_deadline_secs)
            .field("user_agent", &self.user_agent)
            .field("search_country", &self.search_country)
            .field("mineral_page_size", &self.mineral_page_size)
            .field("locality_page_size", &self.locality_page_size)
            .field("default_minerals", &self.default_minerals)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
