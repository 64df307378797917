//! HTTP client for the Mindat REST API.
//!
//! Wraps `reqwest` with credential handling, uniform provider errors and
//! lenient list parsing. Each operation issues exactly one GET; nothing is
//! retried.

use std::time::Duration;

use lithocore_core::{AppConfig, MineralSummary};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::credential::CredentialGuard;
use crate::error::{MindatError, ProviderError};
use crate::normalize::normalize_geomaterial;
use crate::types::{RawGeomaterial, RawLocality, RawMineral};

const DEFAULT_BASE_URL: &str = "https://api.mindat.org/v1/";
const DEFAULT_USER_AGENT: &str = "lithocore/0.1 (mineral-localities)";
const DEFAULT_MINERAL_PAGE_SIZE: u32 = 20;
const DEFAULT_LOCALITY_PAGE_SIZE: u32 = 200;

/// Optional narrowing for locality lookups by mineral name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalityFilters {
    pub country: Option<String>,
    pub colour: Option<String>,
    /// Overrides the client's locality page size.
    pub page_size: Option<u32>,
}

impl LocalityFilters {
    #[must_use]
    pub fn in_country(country: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            ..Self::default()
        }
    }
}

/// Client for the Mindat REST API.
///
/// Cheap to clone; clones share the underlying connection pool. Use
/// [`MindatClient::new`] for production or [`MindatClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct MindatClient {
    client: Client,
    credential: CredentialGuard,
    base_url: Url,
    mineral_page_size: u32,
    locality_page_size: u32,
}

impl MindatClient {
    /// Creates a client pointed at the production Mindat API.
    ///
    /// # Errors
    ///
    /// Returns [`MindatError::Provider`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        credential: CredentialGuard,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, MindatError> {
        Self::with_base_url(credential, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MindatError::Provider`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`MindatError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        credential: CredentialGuard,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, MindatError> {
        let user_agent = if user_agent.trim().is_empty() {
            DEFAULT_USER_AGENT
        } else {
            user_agent
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(ProviderError::from)?;

        // Exactly one trailing slash, so `Url::join` appends resource paths
        // instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| MindatError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            credential,
            base_url,
            mineral_page_size: DEFAULT_MINERAL_PAGE_SIZE,
            locality_page_size: DEFAULT_LOCALITY_PAGE_SIZE,
        })
    }

    /// Builds a client from application configuration.
    ///
    /// A missing credential is not an error here; it surfaces as
    /// [`MindatError::Configuration`] from the first operation.
    ///
    /// # Errors
    ///
    /// Same as [`MindatClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, MindatError> {
        let client = Self::with_base_url(
            CredentialGuard::new(config.mindat_api_key.clone()),
            config.provider_timeout_secs,
            &config.user_agent,
            &config.mindat_base_url,
        )?;
        Ok(client.with_page_sizes(config.mineral_page_size, config.locality_page_size))
    }

    #[must_use]
    pub fn with_page_sizes(mut self, mineral_page_size: u32, locality_page_size: u32) -> Self {
        self.mineral_page_size = mineral_page_size.max(1);
        self.locality_page_size = locality_page_size.max(1);
        self
    }

    #[must_use]
    pub fn credential(&self) -> &CredentialGuard {
        &self.credential
    }

    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.credential.has_credential()
    }

    /// Searches geomaterials by free text.
    ///
    /// Calls `GET geomaterials/?q=<query>&page_size=<n>`.
    ///
    /// # Errors
    ///
    /// - [`MindatError::Configuration`] if no credential is configured; no
    ///   request is sent.
    /// - [`MindatError::Provider`] on transport failure, non-2xx status or a
    ///   non-JSON body.
    pub async fn search_geomaterials(
        &self,
        query: &str,
    ) -> Result<Vec<MineralSummary>, MindatError> {
        let page_size = self.mineral_page_size.to_string();
        let url = self.build_url(
            "geomaterials/",
            &[("q", Some(query.trim())), ("page_size", Some(page_size.as_str()))],
        );
        let hits: Vec<RawGeomaterial> = self.get_results(url).await?;
        Ok(hits.iter().map(normalize_geomaterial).collect())
    }

    /// Looks up localities for a mineral name.
    ///
    /// Calls `GET localities/?mineral_name=<query>` with the optional
    /// `country`, `mineral_colour` and `page_size` filters.
    ///
    /// # Errors
    ///
    /// Same as [`MindatClient::search_geomaterials`].
    pub async fn fetch_localities_by_mineral(
        &self,
        query: &str,
        filters: &LocalityFilters,
    ) -> Result<Vec<RawLocality>, MindatError> {
        let page_size = filters
            .page_size
            .unwrap_or(self.locality_page_size)
            .to_string();
        let url = self.build_url(
            "localities/",
            &[
                ("mineral_name", Some(query.trim())),
                ("country", filters.country.as_deref()),
                ("mineral_colour", filters.colour.as_deref()),
                ("page_size", Some(page_size.as_str())),
            ],
        );
        self.get_results(url).await
    }

    /// Looks up localities for a geomaterial ID.
    ///
    /// Calls `GET localities/?geomaterial_id=<id>&page_size=<n>`.
    ///
    /// # Errors
    ///
    /// Same as [`MindatClient::search_geomaterials`].
    pub async fn fetch_localities_by_id(
        &self,
        mineral_id: i64,
    ) -> Result<Vec<RawLocality>, MindatError> {
        let id = mineral_id.to_string();
        let page_size = self.locality_page_size.to_string();
        let url = self.build_url(
            "localities/",
            &[("geomaterial_id", Some(id.as_str())), ("page_size", Some(page_size.as_str()))],
        );
        self.get_results(url).await
    }

    /// Fetches the short description of the first mineral matching `name`.
    ///
    /// Calls `GET minerals/?name=<name>`. Returns `Ok(None)` when there is no
    /// match or the match has no description.
    ///
    /// # Errors
    ///
    /// Same as [`MindatClient::search_geomaterials`].
    pub async fn fetch_mineral_description(
        &self,
        name: &str,
    ) -> Result<Option<String>, MindatError> {
        let url = self.build_url("minerals/", &[("name", Some(name.trim()))]);
        let minerals: Vec<RawMineral> = self.get_results(url).await?;
        Ok(minerals
            .into_iter()
            .next()
            .and_then(|m| m.description_short)
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty()))
    }

    /// Builds the request URL for `resource` with percent-encoded query
    /// parameters. `None` values and blank strings are omitted.
    fn build_url(&self, resource: &str, params: &[(&str, Option<&str>)]) -> Url {
        let mut url = self
            .base_url
            .join(resource)
            .unwrap_or_else(|_| self.base_url.clone());
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                if let Some(v) = v.map(str::trim).filter(|v| !v.is_empty()) {
                    pairs.append_pair(k, v);
                }
            }
        }
        url
    }

    /// Sends one authorized GET and parses the `results` list.
    ///
    /// The credential is checked before anything goes on the wire. A body
    /// without a `results` array yields an empty list, and entries that do
    /// not deserialize as `T` are skipped.
    async fn get_results<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, MindatError> {
        let headers = self.credential.authorize()?;
        let path = url.path().to_owned();

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(ProviderError::from)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(path = %path, status = status.as_u16(), "Mindat request failed");
            return Err(ProviderError::from_status(
                status.as_u16(),
                format!("{path} returned HTTP {}", status.as_u16()),
            )
            .into());
        }

        let body = response.text().await.map_err(ProviderError::from)?;
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ProviderError::malformed(format!("{path}: {e}")))?;

        let Some(entries) = value.get("results").and_then(serde_json::Value::as_array) else {
            tracing::debug!(path = %path, "Mindat response has no results array; treating as empty");
            return Ok(Vec::new());
        };

        let total = entries.len();
        let parsed: Vec<T> = entries
            .iter()
            .filter_map(|entry| serde_json::from_value::<T>(entry.clone()).ok())
            .collect();
        if parsed.len() < total {
            tracing::debug!(
                path = %path,
                skipped = total - parsed.len(),
                "skipped Mindat entries that failed to parse"
            );
        }
        Ok(parsed)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
