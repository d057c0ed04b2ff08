//! The web backend.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use econdata_core::{
    BoxedReturn, DataApi, Entity, MetadataAttributeInformation, MetadataValuesReturn, Result,
    RevisionInfo, SearchFilter, SearchResult, Series, UnifiedSeriesRequest, UnifiedSeriesReturn,
    UploadSeriesRequest, VintageSeries, fill_metadata,
};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    responses::{SearchRequest, SearchResponse},
    returns::{
        WebAllVintageSeriesReturn, WebAttributeInformationReturn, WebEntitiesReturn,
        WebListValuesReturn, WebRevisionInfoReturn, WebSeriesReturn, WebUnifiedSeriesReturn,
        WebVintageSeriesReturn,
    },
    session::Session,
};

const SEARCH_ENTITIES: &str = "v1/search/entities";
const UPLOAD_SERIES: &str = "v1/series/uploadseries";
const DELETE_SERIES: &str = "v1/series/deleteseries";

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

/// Backend answering through the provider's web API.
#[derive(Clone, Debug)]
pub struct WebApi {
    session: Arc<dyn Session>,
}

impl WebApi {
    /// Creates a backend using `session` for every request.
    #[must_use]
    pub fn new(session: impl Session + 'static) -> Self {
        Self {
            session: Arc::new(session),
        }
    }

    /// Creates a backend sharing an existing session.
    #[must_use]
    pub fn from_shared(session: Arc<dyn Session>) -> Self {
        Self { session }
    }

    /// Returns the session.
    #[must_use]
    pub fn session(&self) -> &dyn Session {
        self.session.as_ref()
    }
}

#[async_trait]
impl DataApi for WebApi {
    fn name(&self) -> &str {
        "web"
    }

    fn get_entities<'a>(&'a self, names: &[&str], raise_error: bool) -> BoxedReturn<'a, Entity> {
        Box::new(WebEntitiesReturn::new(self.session(), owned(names), raise_error))
    }

    fn get_series<'a>(&'a self, names: &[&str], raise_error: bool) -> BoxedReturn<'a, Series> {
        Box::new(WebSeriesReturn::new(self.session(), owned(names), raise_error))
    }

    fn get_revision_info<'a>(
        &'a self,
        names: &[&str],
        raise_error: bool,
    ) -> BoxedReturn<'a, RevisionInfo> {
        Box::new(WebRevisionInfoReturn::new(self.session(), owned(names), raise_error))
    }

    fn get_vintage_series<'a>(
        &'a self,
        time: DateTime<Utc>,
        names: &[&str],
        raise_error: bool,
    ) -> BoxedReturn<'a, VintageSeries> {
        Box::new(WebVintageSeriesReturn::new(
            self.session(),
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
        Box::new(WebAllVintageSeriesReturn::new(
            self.session(),
            name.to_string(),
            if_modified_since,
        ))
    }

    fn get_attribute_information<'a>(
        &'a self,
        names: &[&str],
    ) -> BoxedReturn<'a, MetadataAttributeInformation> {
        Box::new(WebAttributeInformationReturn::new(self.session(), owned(names)))
    }

    fn list_values<'a>(&'a self, name: &str) -> Box<dyn MetadataValuesReturn + 'a> {
        Box::new(WebListValuesReturn::new(self.session(), name.to_string()))
    }

    fn get_unified_series<'a>(
        &'a self,
        request: UnifiedSeriesRequest,
        raise_error: bool,
    ) -> Box<dyn UnifiedSeriesReturn + 'a> {
        Box::new(WebUnifiedSeriesReturn::new(self.session(), request, raise_error))
    }

    #[instrument(skip(self, filters), fields(count = filters.len()))]
    async fn entity_search_multi_filter(
        &self,
        filters: &[SearchFilter],
        include_discontinued: bool,
    ) -> Result<SearchResult> {
        let request = SearchRequest {
            filters: filters.to_vec(),
            include_discontinued,
            no_metadata: false,
        };
        let body = serde_json::to_value(&request)?;
        let value = self.session.post_or_raise(SEARCH_ENTITIES, &body).await?;
        let response: SearchResponse = serde_json::from_value(value)?;

        let entities = response
            .results
            .iter()
            .map(|metadata| {
                let name = metadata
                    .get("Name")
                    .or_else(|| metadata.get("PrimName"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Entity::new(name, fill_metadata(metadata, ""))
            })
            .collect::<Vec<_>>();

        debug!(
            count = entities.len(),
            truncated = response.is_truncated,
            "Search completed"
        );
        Ok(SearchResult {
            entities,
            is_truncated: response.is_truncated,
        })
    }

    #[instrument(skip(self, request), fields(name = request.name()))]
    async fn upload_series(&self, request: UploadSeriesRequest) -> Result<()> {
        let body = serde_json::to_value(&request)?;
        self.session.post_or_raise(UPLOAD_SERIES, &body).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_series(&self, name: &str) -> Result<()> {
        self.session
            .delete_or_raise(DELETE_SERIES, &[("n", name.to_string())])
            .await?;
        Ok(())
    }
}
