//! Error response bodies
//!
//! The service answers failures with several JSON shapes, and the storage
//! provider behind signed URLs answers with XML. [`ErrorBody::decode`] sorts a raw
//! body into one of those shapes so classification can match on it exhaustively.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Where a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOrigin {
    /// The cloud save service
    Service,
    /// A signed storage URL
    Storage,
}

/// Problem-details body without extra structure
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BasicErrorBody {
    /// Problem type URI
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Short title
    #[serde(default)]
    pub title: Option<String>,
    /// Status echoed by the service
    #[serde(default)]
    pub status: Option<u16>,
    /// Service error code
    #[serde(default)]
    pub code: i32,
    /// Specific explanation
    #[serde(default)]
    pub detail: Option<String>,
}

/// One rejected field
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FieldErrorBody {
    /// Field name
    #[serde(default)]
    pub field: String,
    /// Problems with the field
    #[serde(default)]
    pub messages: Vec<String>,
    /// Item key, in batch responses
    #[serde(default)]
    pub key: Option<String>,
}

/// Validation failure listing rejected fields
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ValidationErrorBody {
    /// Service error code
    #[serde(default)]
    pub code: i32,
    /// Specific explanation
    #[serde(default)]
    pub detail: Option<String>,
    /// Rejected fields
    #[serde(default)]
    pub errors: Vec<FieldErrorBody>,
}

/// Conflict on a single-item delete
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct DeleteConflictBody {
    /// Service error code
    #[serde(default)]
    pub code: i32,
    /// Specific explanation
    #[serde(default)]
    pub detail: Option<String>,
    /// Conflicting item
    pub data: DeleteConflictData,
}

/// Item named by a [`DeleteConflictBody`]
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteConflictData {
    /// Item key
    #[serde(default)]
    pub key: String,
    /// Lock the request expected
    #[serde(default)]
    pub attempted_write_lock: String,
    /// Lock currently stored
    #[serde(default)]
    pub existing_write_lock: String,
}

/// Conflict on a batch write
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct BatchConflictBody {
    /// Service error code
    #[serde(default)]
    pub code: i32,
    /// Specific explanation
    #[serde(default)]
    pub detail: Option<String>,
    /// One entry per conflicting item
    pub data: Vec<BatchConflictEntry>,
}

/// Attempted and stored lock of one item
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct BatchConflictEntry {
    /// What the request sent
    pub attempted: KeyWriteLock,
    /// What is stored
    pub existing: KeyWriteLock,
}

/// Key and write lock pair
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeyWriteLock {
    /// Item key
    #[serde(default)]
    pub key: String,
    /// Write lock
    #[serde(default)]
    pub write_lock: String,
}

/// Storage provider `<Error>` document
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct StorageErrorBody {
    /// Provider error code
    #[serde(rename = "Code", default)]
    pub code: String,
    /// Provider message
    #[serde(rename = "Message", default)]
    pub message: String,
    /// Provider detail
    #[serde(rename = "Details", default)]
    pub details: Option<String>,
}

/// Every error body shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    /// Problem details
    Basic(BasicErrorBody),
    /// Field validation
    Validation(ValidationErrorBody),
    /// Field validation across a batch
    BatchValidation(ValidationErrorBody),
    /// Single-item write lock conflict
    DeleteConflict(DeleteConflictBody),
    /// Batch write lock conflict
    BatchConflict(BatchConflictBody),
    /// Storage provider fault
    Storage(StorageErrorBody),
    /// Nothing recognisable; holds the raw text
    Unparsed(String),
}

impl ErrorBody {
    /// Sort a raw error body into its shape
    pub fn decode(origin: ResponseOrigin, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);

        if origin == ResponseOrigin::Storage {
            let parsed = quick_xml::de::from_str::<StorageErrorBody>(text.trim()).unwrap_or_else(|e| {
                debug!("Storage error body is not an <Error> document: {}", e);
                StorageErrorBody::default()
            });
            return ErrorBody::Storage(parsed);
        }

        let value: Value = match serde_json::from_str(&text) {
            Ok(value @ Value::Object(_)) => value,
            _ => return ErrorBody::Unparsed(text.into_owned()),
        };

        Self::from_json(value).unwrap_or_else(|| ErrorBody::Unparsed(text.into_owned()))
    }

    fn from_json(value: Value) -> Option<Self> {
        if let Some(errors) = value.get("errors").and_then(Value::as_array) {
            let batch = errors.iter().any(|e| e.get("key").is_some());
            let body: ValidationErrorBody = serde_json::from_value(value).ok()?;
            return Some(if batch {
                ErrorBody::BatchValidation(body)
            } else {
                ErrorBody::Validation(body)
            });
        }

        match value.get("data") {
            Some(Value::Array(_)) => {
                return serde_json::from_value(value).ok().map(ErrorBody::BatchConflict);
            }
            Some(Value::Object(data)) if data.contains_key("attemptedWriteLock") => {
                return serde_json::from_value(value).ok().map(ErrorBody::DeleteConflict);
            }
            _ => {}
        }

        serde_json::from_value(value).ok().map(ErrorBody::Basic)
    }
}
