//! Player files endpoints and signed storage transfers

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Method, Url};
use std::sync::Arc;

use super::models::{FileDetailsBody, FileItemDto, FileListResponse, SignedUrlResponse};
use super::{invalid_request, ApiClient, Credentials};
use crate::config::{FILE_KEY_MAX_LENGTH, FILE_KEY_PATTERN};
use crate::error::{ApiFailure, CloudSaveError};
use crate::transport::HttpRequest;

const INVALID_KEY_MESSAGE: &str = "invalid key. it must only contain alphanumeric characters, underscores or dashes, and it should not start with a period. its length must be between 1 and 255 characters";

static FILE_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(FILE_KEY_PATTERN)
        .unwrap_or_else(|e| panic!("file key pattern {FILE_KEY_PATTERN} does not compile: {e}"))
});

/// Reject keys the files service would not accept
pub fn validate_key(key: &str) -> Result<(), CloudSaveError> {
    if key.is_empty() || key.len() > FILE_KEY_MAX_LENGTH || !FILE_KEY_REGEX.is_match(key) {
        return Err(CloudSaveError::invalid_field("key", INVALID_KEY_MESSAGE));
    }
    Ok(())
}

/// Endpoints under `/v1/files` plus the storage transfers they hand out
#[derive(Clone)]
pub struct FilesApi {
    client: Arc<ApiClient>,
}

impl FilesApi {
    /// Files endpoints over `client`
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fail early when the project, player or token is missing
    pub fn check_preconditions(&self) -> Result<(), CloudSaveError> {
        self.client.player_credentials().map(|_| ())
    }

    fn files_url(
        &self,
        credentials: &Credentials,
        tail: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url, ApiFailure> {
        let mut segments = vec![
            "v1",
            "files",
            "projects",
            credentials.project_id.as_str(),
            "players",
            credentials.player_id.as_deref().unwrap_or_default(),
            "files",
        ];
        segments.extend_from_slice(tail);
        self.client.url(&segments, query)
    }

    /// One page of file metadata after `after`
    pub async fn list(&self, after: Option<&str>) -> Result<FileListResponse, ApiFailure> {
        let credentials = self.client.player_credentials()?;
        if let Some(after) = after.filter(|a| !a.is_empty()) {
            validate_key(after)?;
        }

        let query: Vec<(&str, &str)> = after.map(|a| ("after", a)).into_iter().collect();
        let url = self.files_url(&credentials, &[], &query)?;
        let request = self.client.authorized(Method::GET, url, &credentials)?;
        self.client.fetch("files.list", request).await
    }

    /// Metadata of one file
    pub async fn metadata(&self, key: &str) -> Result<FileItemDto, ApiFailure> {
        let credentials = self.client.player_credentials()?;
        validate_key(key)?;

        let url = self.files_url(&credentials, &[key, "metadata"], &[])?;
        let request = self.client.authorized(Method::GET, url, &credentials)?;
        self.client.fetch("files.metadata", request).await
    }

    /// Signed URL to upload `details.content_length` bytes under `key`
    pub async fn upload_url(
        &self,
        key: &str,
        details: &FileDetailsBody,
    ) -> Result<SignedUrlResponse, ApiFailure> {
        let credentials = self.client.player_credentials()?;
        validate_key(key)?;

        let url = self.files_url(&credentials, &[key], &[])?;
        let request = ApiClient::with_json(
            self.client.authorized(Method::POST, url, &credentials)?,
            details,
        )?;
        self.client.fetch("files.upload_url", request).await
    }

    /// Signed URL to download `key`
    pub async fn download_url(&self, key: &str) -> Result<SignedUrlResponse, ApiFailure> {
        let credentials = self.client.player_credentials()?;
        validate_key(key)?;

        let url = self.files_url(&credentials, &[key], &[])?;
        let request = self.client.authorized(Method::GET, url, &credentials)?;
        self.client.fetch("files.download_url", request).await
    }

    /// Delete `key`, guarded by `write_lock` when given
    pub async fn delete(&self, key: &str, write_lock: Option<&str>) -> Result<(), ApiFailure> {
        validate_key(key)?;
        let credentials = self.client.player_credentials()?;

        let query: Vec<(&str, &str)> = write_lock.map(|w| ("writeLock", w)).into_iter().collect();
        let url = self.files_url(&credentials, &[key], &query)?;
        let request = self.client.authorized(Method::DELETE, url, &credentials)?;
        self.client.call("files.delete", request).await
    }

    /// Send `bytes` to a signed upload URL
    pub async fn upload(&self, signed: &SignedUrlResponse, bytes: Bytes) -> Result<(), ApiFailure> {
        self.client.player_credentials()?;
        let request = signed_request(signed, Method::PUT)?.body(bytes);
        self.client.storage("files.upload", request).await.map(|_| ())
    }

    /// Fetch the bytes behind a signed download URL
    pub async fn download(&self, signed: &SignedUrlResponse) -> Result<Bytes, ApiFailure> {
        self.client.player_credentials()?;
        let request = signed_request(signed, Method::GET)?;
        self.client.storage("files.download", request).await
    }
}

/// Request for a signed URL; the storage provider authenticates it, not the bearer token
fn signed_request(signed: &SignedUrlResponse, default_method: Method) -> Result<HttpRequest, ApiFailure> {
    let url = Url::parse(&signed.signed_url)
        .map_err(|e| ApiFailure::Other(format!("invalid signed url: {e}")))?;
    let method = match signed.http_method.as_deref() {
        Some(m) if !m.is_empty() => Method::from_bytes(m.to_uppercase().as_bytes())
            .map_err(|e| ApiFailure::Other(format!("invalid signed url method '{m}': {e}")))?,
        _ => default_method,
    };

    signed
        .headers
        .iter()
        .try_fold(HttpRequest::new(method, url), |request, (name, value)| {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            request.header(name, &value)
        })
        .map_err(invalid_request)
}
