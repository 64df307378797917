use thiserror::Error;

/// The provider credential is not configured.
///
/// Fatal to provider-backed features, never to the process.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("MINDAT_API_KEY is not configured")]
pub struct ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Transport failure: DNS, connect, TLS, or timeout.
    Unreachable,
    /// The provider answered with a non-2xx status other than 401/403.
    RequestRejected,
    /// The provider refused the credential (401/403).
    Unauthorized,
    /// The response body was not JSON.
    Malformed,
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderErrorKind::Unreachable => write!(f, "unreachable"),
            ProviderErrorKind::RequestRejected => write!(f, "request rejected"),
            ProviderErrorKind::Unauthorized => write!(f, "unauthorized"),
            ProviderErrorKind::Malformed => write!(f, "malformed response"),
        }
    }
}

/// Uniform failure shape for every provider operation.
///
/// `message` is diagnostic detail. It never contains the credential and is
/// not meant to be shown to end users.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Mindat provider {kind}{}: {message}", .status_code.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub status_code: Option<u16>,
    pub message: String,
}

impl ProviderError {
    #[must_use]
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Unreachable,
            status_code: None,
            message: message.into(),
        }
    }

    /// Maps a non-2xx HTTP status to the matching error kind.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = if status == 401 || status == 403 {
            ProviderErrorKind::Unauthorized
        } else {
            ProviderErrorKind::RequestRejected
        };
        Self {
            kind,
            status_code: Some(status),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Malformed,
            status_code: None,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return ProviderError::from_status(status.as_u16(), err.without_url().to_string());
        }
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.without_url().to_string()
        };
        ProviderError::unreachable(message)
    }
}

/// Errors returned by [`crate::MindatClient`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MindatError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("invalid Mindat base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
