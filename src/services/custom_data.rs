//! Read access to custom entity data

use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use tracing::debug;

use super::pagination::{CursorStrategy, Page, PaginationHelper};
use crate::access::{AccessClass, DataOptions, OperationKind};
use crate::api::models::ItemDto;
use crate::api::{DataApi, DataScope};
use crate::error::{ApiErrorHandler, CloudSaveError};
use crate::{EntityData, Item, ItemKey, Query};

/// Custom data operations
///
/// Custom entities are written by game servers; clients can only read and query
/// them. These calls need a project id and an access token but no signed-in player.
#[derive(Clone)]
pub struct CustomDataService {
    api: DataApi,
    handler: Arc<ApiErrorHandler>,
}

impl CustomDataService {
    /// Service over `api`, classifying failures through `handler`
    pub fn new(api: DataApi, handler: Arc<ApiErrorHandler>) -> Self {
        Self { api, handler }
    }

    fn scope(custom_id: &str) -> DataScope {
        DataScope::Custom {
            id: custom_id.to_string(),
        }
    }

    /// Every key of `custom_id`
    ///
    /// Paging continues after the last key of each page. A page that comes
    /// back empty ends the walk even when the server still reports more results.
    pub async fn list_all_keys(&self, custom_id: &str) -> Result<Vec<ItemKey>, CloudSaveError> {
        let scope = Self::scope(custom_id);

        self.handler
            .run(|| async {
                let keys = PaginationHelper::paginate(
                    "custom keys",
                    CursorStrategy::LastItemKey,
                    |k: &ItemKey| k.key.as_str(),
                    |after| {
                        let scope = &scope;
                        async move {
                            let response = self.api.list_keys(scope, after.as_deref()).await?;
                            let next = response.links.next().map(str::to_string);
                            let keys = response.results.into_iter().map(ItemKey::from).collect();
                            Ok(Page::new(keys, next.as_deref()))
                        }
                    },
                )
                .await?;
                Ok(keys)
            })
            .await
    }

    /// Items of `custom_id` stored under `keys`
    ///
    /// An empty key set returns an empty map without contacting the service.
    pub async fn load<I, S>(
        &self,
        custom_id: &str,
        keys: I,
    ) -> Result<IndexMap<String, Item>, CloudSaveError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: IndexSet<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            debug!("No keys requested, skipping custom load");
            return Ok(IndexMap::new());
        }

        let keys: Vec<String> = keys.into_iter().collect();
        self.load_items(custom_id, Some(keys)).await
    }

    /// Every item of `custom_id`
    ///
    /// Paging continues after the last key of each page. A page that comes
    /// back empty ends the walk even when the server still reports more results.
    pub async fn load_all(&self, custom_id: &str) -> Result<IndexMap<String, Item>, CloudSaveError> {
        self.load_items(custom_id, None).await
    }

    async fn load_items(
        &self,
        custom_id: &str,
        keys: Option<Vec<String>>,
    ) -> Result<IndexMap<String, Item>, CloudSaveError> {
        let scope = Self::scope(custom_id);
        let keys = keys.as_deref();

        self.handler
            .run(|| async {
                let items = PaginationHelper::paginate(
                    "custom items",
                    CursorStrategy::LastItemKey,
                    |i: &ItemDto| i.key.as_str(),
                    |after| {
                        let scope = &scope;
                        async move {
                            let response = self.api.load_items(scope, keys, after.as_deref()).await?;
                            let next = response.links.next().map(str::to_string);
                            Ok(Page::new(response.results, next.as_deref()))
                        }
                    },
                )
                .await?;

                Ok(items
                    .into_iter()
                    .map(|dto| (dto.key.clone(), Item::from(dto)))
                    .collect())
            })
            .await
    }

    /// Custom entities whose indexed data matches `query`
    pub async fn query(
        &self,
        query: &Query,
        access_class: AccessClass,
    ) -> Result<Vec<EntityData>, CloudSaveError> {
        DataOptions {
            access_class,
            ..Default::default()
        }
        .validate(OperationKind::CustomQuery)?;

        self.handler
            .run(|| async {
                let response = self.api.query_custom(query).await?;
                Ok(response.results.into_iter().map(EntityData::from).collect())
            })
            .await
    }
}
