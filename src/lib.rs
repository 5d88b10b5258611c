//! # Cloud Save Client Library
//!
//! A client SDK for storing, retrieving, querying and deleting key-value data and
//! binary files on behalf of an authenticated player against a managed cloud save
//! service.
//!
//! ## Features
//!
//! - **Paged reads**: key listings and item loads walk the service's cursor pagination to completion
//! - **Batched writes**: large saves are split into sequential batches of [`config::SAVE_BATCH_SIZE`]
//! - **Client-side throttling**: once the service answers `429`, calls are rejected locally until the window ends
//! - **Typed errors**: every failure surfaces as one [`CloudSaveError`] with a stable [`CloudSaveErrorReason`]
//! - **Files**: upload and download through signed URLs with MD5 integrity checks
//!
//! ## Quick Start
//!
//! ```no_run
//! use cloud_save_client::{CloudSaveService, DataOptions, SaveItem};
//! use cloud_save_client::config::CloudSaveConfig;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CloudSaveConfig::from_env()?;
//! let service = CloudSaveService::from_config(&config)?;
//!
//! let written = service
//!     .data
//!     .player
//!     .save([("level", SaveItem::new(json!(3)))], &DataOptions::default())
//!     .await?;
//! println!("new write lock: {:?}", written.get("level"));
//!
//! let items = service.data.player.load_all(&DataOptions::default()).await?;
//! for (key, item) in &items {
//!     println!("{key} = {}", item.value);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`transport`] - HTTP transport seam and the default `reqwest` implementation
//! - [`rate_limit`] - Client-side rate-limit window learned from `429` responses
//! - [`error`] - Error taxonomy and the classification boundary every call runs through
//! - [`api`] - Endpoint clients, wire models and error body decoding
//! - [`services`] - Player data, custom data and player files operations
//! - [`facade`] - The public `Data.Player` / `Data.Custom` / `Files.Player` surface

#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Access class resolution and per-operation options
pub mod access;

/// Endpoint clients and wire models
pub mod api;

/// CLI command implementations
pub mod cli;

/// Configuration constants and environment loading
pub mod config;

/// Error taxonomy and classification
pub mod error;

/// Public service surface
pub mod facade;

/// Player and project identity providers
pub mod identity;

/// Request metrics
pub mod metrics;

/// Client-side rate limiting
pub mod rate_limit;

/// Data and file services
pub mod services;

/// HTTP transport
pub mod transport;

// Re-export commonly used types
pub use access::{AccessClass, DataOptions};
pub use error::{CloudSaveError, CloudSaveErrorReason};
pub use facade::CloudSaveService;

/// A stored value together with its write lock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Key the value is stored under
    pub key: String,
    /// Opaque JSON payload
    pub value: serde_json::Value,
    /// Current write lock, if the service returned one
    pub write_lock: Option<String>,
    /// Last modification time
    pub modified: Option<DateTime<Utc>>,
    /// Creation time
    pub created: Option<DateTime<Utc>>,
}

impl Item {
    /// Deserialize the stored value into `T`
    pub fn value_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.value)
    }
}

/// Key metadata returned by key listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemKey {
    /// Key name
    pub key: String,
    /// Current write lock
    pub write_lock: Option<String>,
    /// Last modification time
    pub modified: Option<DateTime<Utc>>,
}

/// A value to write, with the write lock the caller expects to replace
///
/// When `write_lock` is set and no longer matches the stored lock, the service
/// rejects the write as a conflict. When it is `None` the write overwrites
/// unconditionally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveItem {
    /// Value to store
    pub value: serde_json::Value,
    /// Expected current write lock
    pub write_lock: Option<String>,
}

impl SaveItem {
    /// Unconditional write of `value`
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self {
            value: value.into(),
            write_lock: None,
        }
    }

    /// Guard the write with the lock the caller last observed
    pub fn with_write_lock(mut self, write_lock: impl Into<String>) -> Self {
        self.write_lock = Some(write_lock.into());
        self
    }
}

/// Metadata of a stored player file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    /// File key
    pub key: String,
    /// Size in bytes
    pub size: u64,
    /// MIME content type
    pub content_type: String,
    /// Current write lock
    pub write_lock: Option<String>,
    /// Creation time
    pub created: Option<DateTime<Utc>>,
    /// Last modification time
    pub modified: Option<DateTime<Utc>>,
}

/// One entity matched by a query, with the items it returned
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityData {
    /// Player id or custom entity id
    pub id: String,
    /// Items returned for the entity
    pub data: Vec<Item>,
}

/// Comparison applied by a [`FieldFilter`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterOp {
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Less than
    Lt,
    /// Less than or equal
    Le,
    /// Greater than
    Gt,
    /// Greater than or equal
    Ge,
}

/// Condition on one indexed key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldFilter {
    /// Indexed key to filter on
    pub key: String,
    /// Value compared against
    pub value: serde_json::Value,
    /// Comparison operator
    pub op: FilterOp,
    /// Sort ascending on this field
    pub asc: bool,
}

impl FieldFilter {
    /// Filter ascending on `key`
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>, op: FilterOp) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            op,
            asc: true,
        }
    }
}

/// Index query sent to the query endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Field conditions, all of which must hold
    pub fields: Vec<FieldFilter>,
    /// Keys to return for each matched entity
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub return_keys: Vec<String>,
    /// Number of matches to skip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Maximum number of matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Return a random sample of this many matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u32>,
}

impl Query {
    /// Query matching every filter in `fields`
    pub fn new(fields: Vec<FieldFilter>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }
}
