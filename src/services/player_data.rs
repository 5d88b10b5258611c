//! Key-value data of the signed-in player

use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use tracing::debug;

use super::batch::write_in_batches;
use super::pagination::{CursorStrategy, Page, PaginationHelper};
use crate::access::{AccessClass, DataOptions, OperationKind};
use crate::api::models::{ItemDto, SetItemBody};
use crate::api::{DataApi, DataScope};
use crate::config::SAVE_BATCH_SIZE;
use crate::error::{ApiErrorHandler, CloudSaveError};
use crate::{EntityData, Item, ItemKey, Query, SaveItem};

/// Player data operations
#[derive(Clone)]
pub struct PlayerDataService {
    api: DataApi,
    handler: Arc<ApiErrorHandler>,
}

impl PlayerDataService {
    /// Service over `api`, classifying failures through `handler`
    pub fn new(api: DataApi, handler: Arc<ApiErrorHandler>) -> Self {
        Self { api, handler }
    }

    fn read_scope(options: &DataOptions) -> DataScope {
        DataScope::Player {
            access_class: options.access_class,
            player_id: options.player_id.clone(),
        }
    }

    /// Every key in the addressed partition, in server order
    ///
    /// Paging continues after the last key of each page. A page that comes
    /// back empty ends the walk even when the server still reports more results.
    pub async fn list_all_keys(&self, options: &DataOptions) -> Result<Vec<ItemKey>, CloudSaveError> {
        options.validate(OperationKind::ListKeys)?;
        let scope = Self::read_scope(options);

        self.handler
            .run(|| async {
                let keys = PaginationHelper::paginate(
                    "player keys",
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

    /// Items stored under `keys`
    ///
    /// An empty key set returns an empty map without contacting the service.
    pub async fn load<I, S>(
        &self,
        keys: I,
        options: &DataOptions,
    ) -> Result<IndexMap<String, Item>, CloudSaveError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        options.validate(OperationKind::Load)?;
        let keys: IndexSet<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            debug!("No keys requested, skipping load");
            return Ok(IndexMap::new());
        }

        let keys: Vec<String> = keys.into_iter().collect();
        self.load_items(Some(keys), options).await
    }

    /// Every item in the addressed partition
    ///
    /// Paging continues after the last key of each page. A page that comes
    /// back empty ends the walk even when the server still reports more results.
    pub async fn load_all(&self, options: &DataOptions) -> Result<IndexMap<String, Item>, CloudSaveError> {
        options.validate(OperationKind::LoadAll)?;
        self.load_items(None, options).await
    }

    async fn load_items(
        &self,
        keys: Option<Vec<String>>,
        options: &DataOptions,
    ) -> Result<IndexMap<String, Item>, CloudSaveError> {
        let scope = Self::read_scope(options);
        let keys = keys.as_deref();

        self.handler
            .run(|| async {
                let items = PaginationHelper::paginate(
                    "player items",
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

    /// Write `data`, returning the new write lock of every key
    ///
    /// Repeated keys keep their last value. Writes larger than
    /// [`SAVE_BATCH_SIZE`] go out as sequential batches; if one fails the
    /// earlier batches stay written.
    pub async fn save<I, K>(
        &self,
        data: I,
        options: &DataOptions,
    ) -> Result<IndexMap<String, String>, CloudSaveError>
    where
        I: IntoIterator<Item = (K, SaveItem)>,
        K: Into<String>,
    {
        options.validate(OperationKind::Save)?;
        let data: IndexMap<String, SaveItem> =
            data.into_iter().map(|(k, v)| (k.into(), v)).collect();
        if data.is_empty() {
            debug!("Nothing to save");
            return Ok(IndexMap::new());
        }

        let bodies: Vec<SetItemBody> = data
            .into_iter()
            .map(|(key, item)| SetItemBody {
                key,
                value: item.value,
                write_lock: item.write_lock,
            })
            .collect();
        let access_class = options.access_class;

        self.handler
            .run(|| async move {
                write_in_batches(bodies, SAVE_BATCH_SIZE, |batch| async move {
                    let response = self.api.save_batch(access_class, batch).await?;
                    Ok(response
                        .results
                        .into_iter()
                        .map(|r| (r.key, r.write_lock))
                        .collect())
                })
                .await
            })
            .await
    }

    /// Write raw values without write-lock checks
    pub async fn save_values<I, K>(
        &self,
        data: I,
        options: &DataOptions,
    ) -> Result<IndexMap<String, String>, CloudSaveError>
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: Into<String>,
    {
        self.save(
            data.into_iter().map(|(k, v)| (k, SaveItem::new(v))),
            options,
        )
        .await
    }

    /// Delete `key`, guarded by `options.write_lock` when set
    pub async fn delete(&self, key: &str, options: &DataOptions) -> Result<(), CloudSaveError> {
        options.validate(OperationKind::Delete)?;

        self.handler
            .run(|| {
                self.api
                    .delete_item(options.access_class, key, options.write_lock.as_deref())
            })
            .await
    }

    /// Delete every item in the addressed partition
    pub async fn delete_all(&self, options: &DataOptions) -> Result<(), CloudSaveError> {
        options.validate(OperationKind::DeleteAll)?;

        self.handler
            .run(|| self.api.delete_all(options.access_class))
            .await
    }

    /// Players whose indexed public data matches `query`
    pub async fn query(
        &self,
        query: &Query,
        access_class: AccessClass,
    ) -> Result<Vec<EntityData>, CloudSaveError> {
        DataOptions {
            access_class,
            ..Default::default()
        }
        .validate(OperationKind::PlayerQuery)?;

        self.handler
            .run(|| async {
                let response = self.api.query_players(query).await?;
                Ok(response.results.into_iter().map(EntityData::from).collect())
            })
            .await
    }
}
