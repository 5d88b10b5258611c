//! Wire models for the data and files endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{EntityData, FileItem, Item, ItemKey};

/// Pagination links
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    /// Link to the next page; empty or absent on the last page
    #[serde(default)]
    pub next: Option<String>,
}

impl Links {
    /// Non-empty next link
    pub fn next(&self) -> Option<&str> {
        self.next.as_deref().filter(|n| !n.is_empty())
    }
}

/// Timestamp wrapper used by the service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModifiedMetadata {
    /// Point in time
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

fn date_of(metadata: Option<ModifiedMetadata>) -> Option<DateTime<Utc>> {
    metadata.and_then(|m| m.date)
}

/// One key in a key listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetadataDto {
    /// Key
    pub key: String,
    /// Write lock
    #[serde(default)]
    pub write_lock: Option<String>,
    /// Last modification
    #[serde(default)]
    pub modified: Option<ModifiedMetadata>,
}

impl From<KeyMetadataDto> for ItemKey {
    fn from(dto: KeyMetadataDto) -> Self {
        ItemKey {
            key: dto.key,
            write_lock: dto.write_lock,
            modified: date_of(dto.modified),
        }
    }
}

/// One page of keys
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeysResponse {
    /// Keys on this page
    #[serde(default)]
    pub results: Vec<KeyMetadataDto>,
    /// Pagination links
    #[serde(default)]
    pub links: Links,
}

/// One stored item
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    /// Key
    pub key: String,
    /// Value
    #[serde(default)]
    pub value: serde_json::Value,
    /// Write lock
    #[serde(default)]
    pub write_lock: Option<String>,
    /// Last modification
    #[serde(default)]
    pub modified: Option<ModifiedMetadata>,
    /// Creation
    #[serde(default)]
    pub created: Option<ModifiedMetadata>,
}

impl From<ItemDto> for Item {
    fn from(dto: ItemDto) -> Self {
        Item {
            key: dto.key,
            value: dto.value,
            write_lock: dto.write_lock,
            modified: date_of(dto.modified),
            created: date_of(dto.created),
        }
    }
}

/// One page of items
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemsResponse {
    /// Items on this page
    #[serde(default)]
    pub results: Vec<ItemDto>,
    /// Pagination links
    #[serde(default)]
    pub links: Links,
}

/// One item in a batch write
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetItemBody {
    /// Key
    pub key: String,
    /// Value
    pub value: serde_json::Value,
    /// Expected write lock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_lock: Option<String>,
}

/// Batch write request
#[derive(Debug, Clone, Serialize)]
pub struct SetItemBatchBody {
    /// Items to write
    pub data: Vec<SetItemBody>,
}

/// Key and new write lock
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteLockResult {
    /// Key
    pub key: String,
    /// New write lock
    #[serde(default)]
    pub write_lock: String,
}

/// Batch write response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetItemBatchResponse {
    /// One result per written key
    #[serde(default)]
    pub results: Vec<WriteLockResult>,
}

/// One entity matched by a query
#[derive(Debug, Clone, Deserialize)]
pub struct EntityDto {
    /// Entity id
    #[serde(default)]
    pub id: String,
    /// Returned items
    #[serde(default)]
    pub data: Vec<ItemDto>,
}

impl From<EntityDto> for EntityData {
    fn from(dto: EntityDto) -> Self {
        EntityData {
            id: dto.id,
            data: dto.data.into_iter().map(Item::from).collect(),
        }
    }
}

/// Query response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    /// Matched entities
    #[serde(default)]
    pub results: Vec<EntityDto>,
}

/// Stored file descriptor
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileItemDto {
    /// Key
    pub key: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Content type
    #[serde(default)]
    pub content_type: String,
    /// Write lock
    #[serde(default)]
    pub write_lock: Option<String>,
    /// Creation
    #[serde(default)]
    pub created: Option<ModifiedMetadata>,
    /// Last modification
    #[serde(default)]
    pub modified: Option<ModifiedMetadata>,
}

impl From<FileItemDto> for FileItem {
    fn from(dto: FileItemDto) -> Self {
        FileItem {
            key: dto.key,
            size: dto.size,
            content_type: dto.content_type,
            write_lock: dto.write_lock,
            created: date_of(dto.created),
            modified: date_of(dto.modified),
        }
    }
}

/// One page of files
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileListResponse {
    /// Files on this page
    #[serde(default)]
    pub results: Vec<FileItemDto>,
    /// Pagination links
    #[serde(default)]
    pub links: Links,
}

/// Upload URL request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDetailsBody {
    /// MIME type of the upload
    pub content_type: String,
    /// Exact byte length
    pub content_length: u64,
    /// Base64 MD5 of the bytes
    pub content_md5: String,
    /// Expected write lock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_lock: Option<String>,
}

/// Signed storage URL with the method and headers to use it with
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    /// Pre-signed URL
    pub signed_url: String,
    /// Headers the storage provider expects
    #[serde(default)]
    pub headers: HashMap<String, serde_json::Value>,
    /// HTTP method to use
    #[serde(default)]
    pub http_method: Option<String>,
}
