//! In-memory [`LocalitySource`] for unit tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lithocore_mindat::{LocalityFilters, MindatError, ProviderError, RawLocality};

use crate::source::LocalitySource;

pub(crate) fn raw(id: i64, name: &str, lat: Option<f64>, lon: Option<f64>) -> RawLocality {
    RawLocality {
        id,
        name: Some(name.to_string()),
        latitude: lat.map(|v| serde_json::json!(v)),
        longitude: lon.map(|v| serde_json::json!(v)),
        description: None,
        status: None,
        country: Some("Switzerland".to_string()),
    }
}

pub(crate) fn provider_failure() -> MindatError {
    ProviderError::from_status(503, "localities/ returned HTTP 503").into()
}

#[derive(Clone)]
pub(crate) struct FakeSource {
    pub credential: bool,
    pub hang: bool,
    pub by_mineral: HashMap<String, Result<Vec<RawLocality>, MindatError>>,
    pub by_id: HashMap<i64, Result<Vec<RawLocality>, MindatError>>,
    pub description: Result<Option<String>, MindatError>,
    pub calls: Arc<AtomicUsize>,
}

impl Default for FakeSource {
    fn default() -> Self {
        Self {
            credential: true,
            hang: false,
            by_mineral: HashMap::new(),
            by_id: HashMap::new(),
            description: Ok(None),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FakeSource {
    pub fn with_mineral(
        mut self,
        name: &str,
        result: Result<Vec<RawLocality>, MindatError>,
    ) -> Self {
        self.by_mineral.insert(name.to_string(), result);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond<T: Send + 'static>(
        &self,
        result: Result<T, MindatError>,
    ) -> impl Future<Output = Result<T, MindatError>> + Send + 'static {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let hang = self.hang;
        async move {
            if hang {
                futures::future::pending::<()>().await;
            }
            result
        }
    }
}

impl LocalitySource for FakeSource {
    fn has_credential(&self) -> bool {
        self.credential
    }

    fn localities_by_mineral(
        &self,
        query: &str,
        _filters: &LocalityFilters,
    ) -> impl Future<Output = Result<Vec<RawLocality>, MindatError>> + Send {
        let result = self.by_mineral.get(query).cloned().unwrap_or_else(|| Ok(Vec::new()));
        self.respond(result)
    }

    fn localities_by_id(
        &self,
        mineral_id: i64,
    ) -> impl Future<Output = Result<Vec<RawLocality>, MindatError>> + Send {
        let result = self.by_id.get(&mineral_id).cloned().unwrap_or_else(|| Ok(Vec::new()));
        self.respond(result)
    }

    fn mineral_description(
        &self,
        _name: &str,
    ) -> impl Future<Output = Result<Option<String>, MindatError>> + Send {
        self.respond(self.description.clone())
    }
}
