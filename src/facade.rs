//! Public service surface
//!
//! [`CloudSaveService`] groups the operations the way callers address them:
//! `service.data.player`, `service.data.custom` and `service.files.player`.
//! All three share one rate limiter, so a `429` seen by any of them pauses
//! the others too.

use bytes::Bytes;
use indexmap::IndexMap;
use reqwest::Url;
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncSeek};
use tracing::debug;

use crate::access::DataOptions;
use crate::api::{ApiClient, DataApi, FilesApi};
use crate::config::{CloudSaveConfig, ConfigError};
use crate::error::{ApiErrorHandler, CloudSaveError};
use crate::identity::{PlayerIdentity, ProjectIdentity, StaticIdentity};
use crate::rate_limit::{Clock, RateLimiter};
use crate::services::{CustomDataService, PlayerDataService, PlayerFilesService};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::FileItem;

/// Entry point of the client
#[derive(Clone)]
pub struct CloudSaveService {
    /// Key-value data
    pub data: DataService,
    /// Binary files
    pub files: FilesService,
    handler: Arc<ApiErrorHandler>,
}

/// Key-value data, per owner
#[derive(Clone)]
pub struct DataService {
    /// Data of the signed-in player
    pub player: PlayerDataService,
    /// Data of custom entities
    pub custom: CustomDataService,
}

/// Binary files, per owner
#[derive(Clone)]
pub struct FilesService {
    /// Files of the signed-in player
    pub player: PlayerFilesService,
}

impl CloudSaveService {
    /// Service talking to `base_url` over `transport`
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: Url,
        project: Arc<dyn ProjectIdentity>,
        player: Arc<dyn PlayerIdentity>,
    ) -> Self {
        Self::build(transport, base_url, project, player, RateLimiter::new())
    }

    /// Like [`CloudSaveService::new`] with the rate-limit window measured on `clock`
    pub fn with_clock(
        transport: Arc<dyn HttpTransport>,
        base_url: Url,
        project: Arc<dyn ProjectIdentity>,
        player: Arc<dyn PlayerIdentity>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::build(
            transport,
            base_url,
            project,
            player,
            RateLimiter::with_clock(clock),
        )
    }

    /// Service over the shared `reqwest` client with identity taken from `config`
    pub fn from_config(config: &CloudSaveConfig) -> Result<Self, ConfigError> {
        let base_url = config.resolve_base_url()?;
        let identity = Arc::new(StaticIdentity::from(config));
        debug!(base_url = %base_url, "Creating cloud save service");

        Ok(Self::new(
            Arc::new(ReqwestTransport::new()),
            base_url,
            identity.clone(),
            identity,
        ))
    }

    fn build(
        transport: Arc<dyn HttpTransport>,
        base_url: Url,
        project: Arc<dyn ProjectIdentity>,
        player: Arc<dyn PlayerIdentity>,
        rate_limiter: RateLimiter,
    ) -> Self {
        let client = Arc::new(ApiClient::new(transport, base_url, project, player));
        let handler = Arc::new(ApiErrorHandler::new(Arc::new(rate_limiter)));
        let data_api = DataApi::new(client.clone());

        Self {
            data: DataService {
                player: PlayerDataService::new(data_api.clone(), handler.clone()),
                custom: CustomDataService::new(data_api, handler.clone()),
            },
            files: FilesService {
                player: PlayerFilesService::new(FilesApi::new(client), handler.clone()),
            },
            handler,
        }
    }

    /// Whether calls are currently being rejected locally
    pub fn is_rate_limited(&self) -> bool {
        self.handler.rate_limiter().is_rate_limited()
    }
}

/// Text form of a stored value: strings as-is, anything else as JSON
fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[allow(missing_docs)]
impl DataService {
    #[deprecated(note = "use `data.player.list_all_keys` instead")]
    pub async fn retrieve_all_keys(&self) -> Result<Vec<String>, CloudSaveError> {
        let keys = self.player.list_all_keys(&DataOptions::default()).await?;
        Ok(keys.into_iter().map(|k| k.key).collect())
    }

    #[deprecated(note = "use `data.player.save_values` instead")]
    pub async fn force_save(&self, data: IndexMap<String, Value>) -> Result<(), CloudSaveError> {
        self.player
            .save_values(data, &DataOptions::default())
            .await
            .map(|_| ())
    }

    #[deprecated(note = "use `data.player.delete` instead")]
    pub async fn force_delete(&self, key: &str) -> Result<(), CloudSaveError> {
        self.player.delete(key, &DataOptions::default()).await
    }

    #[deprecated(note = "use `data.player.load` instead")]
    pub async fn load_strings<I, S>(&self, keys: I) -> Result<IndexMap<String, String>, CloudSaveError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = self.player.load(keys, &DataOptions::default()).await?;
        Ok(items
            .into_iter()
            .map(|(key, item)| (key, value_text(item.value)))
            .collect())
    }

    #[deprecated(note = "use `data.player.load_all` instead")]
    pub async fn load_all_strings(&self) -> Result<IndexMap<String, String>, CloudSaveError> {
        let items = self.player.load_all(&DataOptions::default()).await?;
        Ok(items
            .into_iter()
            .map(|(key, item)| (key, value_text(item.value)))
            .collect())
    }
}

#[allow(missing_docs)]
impl FilesService {
    #[deprecated(note = "use `files.player.list_all` instead")]
    pub async fn list_all_files(&self) -> Result<Vec<FileItem>, CloudSaveError> {
        self.player.list_all().await
    }

    #[deprecated(note = "use `files.player.get_metadata` instead")]
    pub async fn get_file_metadata(&self, key: &str) -> Result<FileItem, CloudSaveError> {
        self.player.get_metadata(key).await
    }

    #[deprecated(note = "use `files.player.save_bytes` instead")]
    pub async fn save_file_bytes(&self, key: &str, bytes: impl Into<Bytes>) -> Result<(), CloudSaveError> {
        self.player.save_bytes(key, bytes, None).await
    }

    #[deprecated(note = "use `files.player.save_stream` instead")]
    pub async fn save_file_stream<S>(&self, key: &str, stream: &mut S) -> Result<(), CloudSaveError>
    where
        S: AsyncRead + AsyncSeek + Unpin + Send,
    {
        self.player.save_stream(key, stream, None).await
    }

    #[deprecated(note = "use `files.player.load_bytes` instead")]
    pub async fn load_file_bytes(&self, key: &str) -> Result<Bytes, CloudSaveError> {
        self.player.load_bytes(key).await
    }

    #[deprecated(note = "use `files.player.load_stream` instead")]
    pub async fn load_file_stream(&self, key: &str) -> Result<Cursor<Bytes>, CloudSaveError> {
        self.player.load_stream(key).await
    }

    #[deprecated(note = "use `files.player.delete` instead")]
    pub async fn delete_file(&self, key: &str) -> Result<(), CloudSaveError> {
        self.player.delete(key, None).await
    }
}
