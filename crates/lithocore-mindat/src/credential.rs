//! Process-side holder for the Mindat API key.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::error::ConfigurationError;

/// Holds the provider credential and turns it into request headers.
///
/// The key is only ever exposed as an `Authorization` header value marked
/// sensitive; `Debug` output is redacted.
#[derive(Clone, Default)]
pub struct CredentialGuard {
    api_key: Option<String>,
}

impl CredentialGuard {
    /// Blank or whitespace-only keys are treated as absent.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty());
        Self { api_key }
    }

    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Builds the `Authorization: Token <key>` header map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when no key is configured, or when the
    /// key contains bytes that are not valid in an HTTP header.
    pub fn authorize(&self) -> Result<HeaderMap, ConfigurationError> {
        let key = self.api_key.as_deref().ok_or(ConfigurationError)?;
        let mut value =
            HeaderValue::from_str(&format!("Token {key}")).map_err(|_| ConfigurationError)?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

impl std::fmt::Debug for CredentialGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialGuard")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}
