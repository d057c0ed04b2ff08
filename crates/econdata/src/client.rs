//! A client forwarding to one backend.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use econdata_core::{
    BoxedReturn, DataApi, Entity, MetadataAttributeInformation, MetadataValuesReturn, Result,
    RevisionInfo, SearchFilter, SearchResult, Series, UnifiedSeriesRequest, UnifiedSeriesReturn,
    UploadSeriesRequest, VintageSeries,
};

/// Entry point forwarding every operation to a backend chosen at construction.
///
/// The backend is shared, so clones are cheap and talk to the same session or database.
///
/// # Example
///
/// ```rust,ignore
/// use econdata::{Client, DataApi, InMemoryDatabase};
///
/// let client = Client::local(InMemoryDatabase::new());
/// assert_eq!(client.backend(), "local");
/// let found = client.entity_search("gdp").await?;
/// ```
#[derive(Clone)]
pub struct Client {
    api: Arc<dyn DataApi>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("backend", &self.api.name())
            .finish()
    }
}

impl Client {
    /// Create a client over any backend.
    #[must_use]
    pub fn new(api: Arc<dyn DataApi>) -> Self {
        debug!(backend = api.name(), "Creating client");
        Self { api }
    }

    /// Create a client for the web API, authenticating with a bearer token.
    ///
    /// # Errors
    /// Returns [`DataError::Network`](econdata_core::DataError::Network) if the HTTP
    /// client cannot be built.
    #[cfg(feature = "web")]
    pub fn web(token: impl Into<String>) -> Result<Self> {
        Ok(Self::with_session(econdata_web::HttpSession::new(token)?))
    }

    /// Create a client for the web API over a configured session.
    #[cfg(feature = "web")]
    #[must_use]
    pub fn with_session(session: impl econdata_web::Session + 'static) -> Self {
        Self::new(Arc::new(econdata_web::WebApi::new(session)))
    }

    /// Create a client over a local database.
    #[cfg(feature = "local")]
    #[must_use]
    pub fn local(database: impl econdata_local::LocalDatabase + 'static) -> Self {
        Self::new(Arc::new(econdata_local::LocalApi::new(database)))
    }

    /// Name of the backend answering requests.
    #[must_use]
    pub fn backend(&self) -> &str {
        self.api.name()
    }

    /// Returns the backend.
    #[must_use]
    pub fn api(&self) -> &dyn DataApi {
        self.api.as_ref()
    }
}

#[async_trait]
impl DataApi for Client {
    fn name(&self) -> &str {
        self.api.name()
    }

    fn get_entities<'a>(&'a self, names: &[&str], raise_error: bool) -> BoxedReturn<'a, Entity> {
        self.api.get_entities(names, raise_error)
    }

    fn get_series<'a>(&'a self, names: &[&str], raise_error: bool) -> BoxedReturn<'a, Series> {
        self.api.get_series(names, raise_error)
    }

    fn get_revision_info<'a>(
        &'a self,
        names: &[&str],
        raise_error: bool,
    ) -> BoxedReturn<'a, RevisionInfo> {
        self.api.get_revision_info(names, raise_error)
    }

    fn get_vintage_series<'a>(
        &'a self,
        time: DateTime<Utc>,
        names: &[&str],
        raise_error: bool,
    ) -> BoxedReturn<'a, VintageSeries> {
        self.api.get_vintage_series(time, names, raise_error)
    }

    fn get_all_vintage_series<'a>(
        &'a self,
        name: &str,
        if_modified_since: Option<DateTime<Utc>>,
    ) -> BoxedReturn<'a, VintageSeries> {
        self.api.get_all_vintage_series(name, if_modified_since)
    }

    fn get_attribute_information<'a>(
        &'a self,
        names: &[&str],
    ) -> BoxedReturn<'a, MetadataAttributeInformation> {
        self.api.get_attribute_information(names)
    }

    fn list_values<'a>(&'a self, name: &str) -> Box<dyn MetadataValuesReturn + 'a> {
        self.api.list_values(name)
    }

    fn get_unified_series<'a>(
        &'a self,
        request: UnifiedSeriesRequest,
        raise_error: bool,
    ) -> Box<dyn UnifiedSeriesReturn + 'a> {
        self.api.get_unified_series(request, raise_error)
    }

    async fn entity_search_multi_filter(
        &self,
        filters: &[SearchFilter],
        include_discontinued: bool,
    ) -> Result<SearchResult> {
        self.api
            .entity_search_multi_filter(filters, include_discontinued)
            .await
    }

    async fn upload_series(&self, request: UploadSeriesRequest) -> Result<()> {
        self.api.upload_series(request).await
    }

    async fn delete_series(&self, name: &str) -> Result<()> {
        self.api.delete_series(name).await
    }
}
