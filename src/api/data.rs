//! Player and custom data endpoints

use reqwest::Method;
use std::sync::Arc;

use super::models::{
    ItemsResponse, KeysResponse, QueryResponse, SetItemBatchBody, SetItemBatchResponse,
    SetItemBody,
};
use super::{ApiClient, Credentials};
use crate::access::AccessClass;
use crate::error::ApiFailure;
use crate::Query;

/// Whose data a read addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataScope {
    /// A player's partition
    Player {
        /// Partition
        access_class: AccessClass,
        /// Other player to read; the signed-in player when `None`
        player_id: Option<String>,
    },
    /// A custom entity
    Custom {
        /// Custom entity id
        id: String,
    },
}

/// Endpoints under `/v1/data`
#[derive(Clone)]
pub struct DataApi {
    client: Arc<ApiClient>,
}

impl DataApi {
    /// Data endpoints over `client`
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn credentials(&self, scope: &DataScope) -> Result<Credentials, ApiFailure> {
        let credentials = match scope {
            DataScope::Player { .. } => self.client.player_credentials()?,
            DataScope::Custom { .. } => self.client.project_credentials()?,
        };
        Ok(credentials)
    }

    /// Path segments down to the scope root
    fn scope_segments<'a>(
        scope: &'a DataScope,
        credentials: &'a Credentials,
    ) -> Vec<&'a str> {
        let mut segments = vec!["v1", "data", "projects", credentials.project_id.as_str()];
        match scope {
            DataScope::Player {
                access_class,
                player_id,
            } => {
                let player = player_id
                    .as_deref()
                    .or(credentials.player_id.as_deref())
                    .unwrap_or_default();
                segments.extend(["players", player]);
                segments.extend(access_class.path_segment());
            }
            DataScope::Custom { id } => segments.extend(["custom", id.as_str()]),
        }
        segments
    }

    fn player_scope(access_class: AccessClass) -> DataScope {
        DataScope::Player {
            access_class,
            player_id: None,
        }
    }

    /// One page of keys after `after`
    pub async fn list_keys(
        &self,
        scope: &DataScope,
        after: Option<&str>,
    ) -> Result<KeysResponse, ApiFailure> {
        let credentials = self.credentials(scope)?;
        let mut segments = Self::scope_segments(scope, &credentials);
        segments.push("keys");

        let query: Vec<(&str, &str)> = after.map(|a| ("after", a)).into_iter().collect();
        let url = self.client.url(&segments, &query)?;
        let request = self.client.authorized(Method::GET, url, &credentials)?;
        self.client.fetch("data.keys", request).await
    }

    /// One page of items, restricted to `keys` when given
    pub async fn load_items(
        &self,
        scope: &DataScope,
        keys: Option<&[String]>,
        after: Option<&str>,
    ) -> Result<ItemsResponse, ApiFailure> {
        let credentials = self.credentials(scope)?;
        let mut segments = Self::scope_segments(scope, &credentials);
        segments.push("items");

        let mut query: Vec<(&str, &str)> = keys
            .unwrap_or_default()
            .iter()
            .map(|k| ("keys", k.as_str()))
            .collect();
        if let Some(after) = after {
            query.push(("after", after));
        }

        let url = self.client.url(&segments, &query)?;
        let request = self.client.authorized(Method::GET, url, &credentials)?;
        self.client.fetch("data.items", request).await
    }

    /// Write one batch of items to the signed-in player's partition
    pub async fn save_batch(
        &self,
        access_class: AccessClass,
        data: Vec<SetItemBody>,
    ) -> Result<SetItemBatchResponse, ApiFailure> {
        let scope = Self::player_scope(access_class);
        let credentials = self.credentials(&scope)?;
        let mut segments = Self::scope_segments(&scope, &credentials);
        segments.push("item-batch");

        let url = self.client.url(&segments, &[])?;
        let request = ApiClient::with_json(
            self.client.authorized(Method::POST, url, &credentials)?,
            &SetItemBatchBody { data },
        )?;
        self.client.fetch("data.save", request).await
    }

    /// Delete one item, guarded by `write_lock` when given
    pub async fn delete_item(
        &self,
        access_class: AccessClass,
        key: &str,
        write_lock: Option<&str>,
    ) -> Result<(), ApiFailure> {
        let scope = Self::player_scope(access_class);
        let credentials = self.credentials(&scope)?;
        let mut segments = Self::scope_segments(&scope, &credentials);
        segments.extend(["items", key]);

        let query: Vec<(&str, &str)> = write_lock.map(|w| ("writeLock", w)).into_iter().collect();
        let url = self.client.url(&segments, &query)?;
        let request = self.client.authorized(Method::DELETE, url, &credentials)?;
        self.client.call("data.delete", request).await
    }

    /// Delete every item in the signed-in player's partition
    pub async fn delete_all(&self, access_class: AccessClass) -> Result<(), ApiFailure> {
        let scope = Self::player_scope(access_class);
        let credentials = self.credentials(&scope)?;
        let mut segments = Self::scope_segments(&scope, &credentials);
        segments.push("items");

        let url = self.client.url(&segments, &[])?;
        let request = self.client.authorized(Method::DELETE, url, &credentials)?;
        self.client.call("data.delete_all", request).await
    }

    /// Query indexed public player data
    pub async fn query_players(&self, query: &Query) -> Result<QueryResponse, ApiFailure> {
        let credentials = self.client.player_credentials()?;
        let segments = [
            "v1",
            "data",
            "projects",
            credentials.project_id.as_str(),
            "players",
            "public",
            "query",
        ];
        self.query(&segments, &credentials, query, "data.query_players")
            .await
    }

    /// Query indexed custom data
    pub async fn query_custom(&self, query: &Query) -> Result<QueryResponse, ApiFailure> {
        let credentials = self.client.project_credentials()?;
        let segments = [
            "v1",
            "data",
            "projects",
            credentials.project_id.as_str(),
            "custom",
            "query",
        ];
        self.query(&segments, &credentials, query, "data.query_custom")
            .await
    }

    async fn query(
        &self,
        segments: &[&str],
        credentials: &Credentials,
        query: &Query,
        operation: &'static str,
    ) -> Result<QueryResponse, ApiFailure> {
        let url = self.client.url(segments, &[])?;
        let request = ApiClient::with_json(
            self.client.authorized(Method::POST, url, credentials)?,
            query,
        )?;
        self.client.fetch(operation, request).await
    }
}
