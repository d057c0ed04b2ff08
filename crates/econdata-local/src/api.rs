//! The local backend.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use econdata_core::{
    BoxedReturn, DataApi, Entity, MetadataAttributeInformation, MetadataValuesReturn, Result,
    RevisionInfo, SearchFilter, SearchResult, Series, UnifiedSeriesRequest, UnifiedSeriesReturn,
    UploadSeriesRequest, VintageSeries,
};
use tracing::{debug, instrument};

use crate::{
    native::LocalDatabase,
    returns::{
        LocalAllVintageSeriesReturn, LocalAttributeInformationReturn, LocalEntitiesReturn,
        LocalListValuesReturn, LocalRevisionInfoReturn, LocalSeriesReturn,
        LocalUnifiedSeriesReturn, LocalVintageSeriesReturn, convert_entity,
    },
};

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

/// Backend answering from the desktop application's database.
#[derive(Clone, Debug)]
pub struct LocalApi {
    database: Arc<dyn LocalDatabase>,
}

impl LocalApi {
    /// Creates a backend over `database`.
    #[must_use]
    pub fn new(database: impl LocalDatabase + 'static) -> Self {
        Self {
            database: Arc::new(database),
        }
    }

    /// Creates a backend sharing an existing database.
    #[must_use]
    pub fn from_shared(database: Arc<dyn LocalDatabase>) -> Self {
        Self { database }
    }

    /// Returns the database.
    #[must_use]
    pub fn database(&self) -> &dyn LocalDatabase {
        self.database.as_ref()
    }
}

#[async_trait]
impl DataApi for LocalApi {
    fn name(&self) -> &str {
        "local"
    }

    fn get_entities<'a>(&'a self, names: &[&str], raise_error: bool) -> BoxedReturn<'a, Entity> {
        Box::new(LocalEntitiesReturn::new(self.database(), owned(names), raise_error))
    }

    fn get_series<'a>(&'a self, names: &[&str], raise_error: bool) -> BoxedReturn<'a, Series> {
        Box::new(LocalSeriesReturn::new(self.database(), owned(names), raise_error))
    }

    fn get_revision_info<'a>(
        &'a self,
        names: &[&str],
        raise_error: bool,
    ) -> BoxedReturn<'a, RevisionInfo> {
        Box::new(LocalRevisionInfoReturn::new(
            self.database(),
            owned(names),
            raise_error,
        ))
    }

    fn get_vintage_series<'a>(
        &'a self,
        time: DateTime<Utc>,
        names: &[&str],
        raise_error: bool,
    ) -> BoxedReturn<'a, VintageSeries> {
        Box::new(LocalVintageSeriesReturn::new(
            self.database(),
            time,
            owned(names),
            raise_error,
        ))
    }

    fn get_all_vintage_series<'a>(
        &'a self,
        name: &str,
        if_modified_since: Option<DateTime<Utc>>,
    ) -> BoxedReturn<'a, VintageSeries> {
        Box::new(LocalAllVintageSeriesReturn::new(
            self.database(),
            name.to_string(),
            if_modified_since,
        ))
    }

    fn get_attribute_information<'a>(
        &'a self,
        names: &[&str],
    ) -> BoxedReturn<'a, MetadataAttributeInformation> {
        Box::new(LocalAttributeInformationReturn::new(self.database(), owned(names)))
    }

    fn list_values<'a>(&'a self, name: &str) -> Box<dyn MetadataValuesReturn + 'a> {
        Box::new(LocalListValuesReturn::new(self.database(), name.to_string()))
    }

    fn get_unified_series<'a>(
        &'a self,
        request: UnifiedSeriesRequest,
        raise_error: bool,
    ) -> Box<dyn UnifiedSeriesReturn + 'a> {
        Box::new(LocalUnifiedSeriesReturn::new(
            self.database(),
            request,
            raise_error,
        ))
    }

    #[instrument(skip(self, filters), fields(count = filters.len()))]
    async fn entity_search_multi_filter(
        &self,
        filters: &[SearchFilter],
        include_discontinued: bool,
    ) -> Result<SearchResult> {
        let result = self.database.search(filters, include_discontinued)?;
        let entities = result
            .entities
            .iter()
            .map(|entity| convert_entity(&entity.name, entity))
            .collect::<Vec<_>>();

        debug!(
            count = entities.len(),
            truncated = result.is_truncated,
            "Search completed"
        );
        Ok(SearchResult {
            entities,
            is_truncated: result.is_truncated,
        })
    }

    #[instrument(skip(self, request), fields(name = request.name()))]
    async fn upload_series(&self, request: UploadSeriesRequest) -> Result<()> {
        self.database.upload_series(&request)
    }

    #[instrument(skip(self))]
    async fn delete_series(&self, name: &str) -> Result<()> {
        self.database.delete_series(name)
    }
}
