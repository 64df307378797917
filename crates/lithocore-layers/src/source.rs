//! Where the session controller gets localities from.

use std::future::Future;

use lithocore_mindat::{LocalityFilters, MindatClient, MindatError, RawLocality};

/// Provider operations the controller and warm load depend on.
///
/// [`MindatClient`] is the production implementation; tests substitute
/// in-memory fakes.
pub trait LocalitySource: Send + Sync {
    fn has_credential(&self) -> bool;

    fn localities_by_mineral(
        &self,
        query: &str,
        filters: &LocalityFilters,
    ) -> impl Future<Output = Result<Vec<RawLocality>, MindatError>> + Send;

    fn localities_by_id(
        &self,
        mineral_id: i64,
    ) -> impl Future<Output = Result<Vec<RawLocality>, MindatError>> + Send;

    fn mineral_description(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, MindatError>> + Send;
}

impl LocalitySource for MindatClient {
    fn has_credential(&self) -> bool {
        MindatClient::has_credential(self)
    }

    fn localities_by_mineral(
        &self,
        query: &str,
        filters: &LocalityFilters,
    ) -> impl Future<Output = Result<Vec<RawLocality>, MindatError>> + Send {
        self.fetch_localities_by_mineral(query, filters)
    }

    fn localities_by_id(
        &self,
        mineral_id: i64,
    ) -> impl Future<Output = Result<Vec<RawLocality>, MindatError>> + Send {
        self.fetch_localities_by_id(mineral_id)
    }

    fn mineral_description(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, MindatError>> + Send {
        self.fetch_mineral_description(name)
    }
}
