//! Binary files of the signed-in player
//!
//! Uploads and downloads are two-step: the files service hands out a signed URL,
//! then the bytes move directly between the client and blob storage. Failures of
//! the second step carry storage provider error bodies and are classified with
//! their own code space.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use md5::{Digest, Md5};
use std::io::{Cursor, SeekFrom};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};
use tracing::{debug, info};

use super::pagination::{CursorStrategy, Page, PaginationHelper};
use crate::api::models::FileDetailsBody;
use crate::api::{validate_key, FilesApi};
use crate::config::FILE_CONTENT_TYPE;
use crate::error::{ApiErrorHandler, ApiFailure, CloudSaveError};
use crate::FileItem;

const INVALID_STREAM_MESSAGE: &str =
    "invalid stream. make sure the stream is non-null, non-empty, readable, and seekable.";

fn invalid_stream() -> ApiFailure {
    CloudSaveError::invalid_field("stream", INVALID_STREAM_MESSAGE).into()
}

/// Base64 of the MD5 digest of `bytes`
pub fn content_md5(bytes: &[u8]) -> String {
    STANDARD.encode(Md5::digest(bytes))
}

/// Read a whole seekable stream, leaving its position at the start
///
/// Empty or unseekable streams are rejected as a validation error on `stream`.
async fn read_seekable<S>(stream: &mut S) -> Result<Vec<u8>, ApiFailure>
where
    S: AsyncRead + AsyncSeek + Unpin,
{
    let length = stream
        .seek(SeekFrom::End(0))
        .await
        .map_err(|_| invalid_stream())?;
    if length == 0 {
        return Err(invalid_stream());
    }
    stream.rewind().await.map_err(|_| invalid_stream())?;

    let mut buffer = Vec::with_capacity(usize::try_from(length).unwrap_or_default());
    stream
        .read_to_end(&mut buffer)
        .await
        .map_err(|e| ApiFailure::Other(format!("failed to read upload stream: {e}")))?;
    stream
        .rewind()
        .await
        .map_err(|e| ApiFailure::Other(format!("failed to rewind upload stream: {e}")))?;

    Ok(buffer)
}

/// Player file operations
#[derive(Clone)]
pub struct PlayerFilesService {
    api: FilesApi,
    handler: Arc<ApiErrorHandler>,
}

impl PlayerFilesService {
    /// Service over `api`, classifying failures through `handler`
    pub fn new(api: FilesApi, handler: Arc<ApiErrorHandler>) -> Self {
        Self { api, handler }
    }

    /// Metadata of every stored file, in server order
    pub async fn list_all(&self) -> Result<Vec<FileItem>, CloudSaveError> {
        self.handler
            .run(|| async {
                let files = PaginationHelper::paginate(
                    "player files",
                    CursorStrategy::NextLink,
                    |f: &FileItem| f.key.as_str(),
                    |after| async move {
                        let response = self.api.list(after.as_deref()).await?;
                        let next = response.links.next().map(str::to_string);
                        let files = response.results.into_iter().map(FileItem::from).collect();
                        Ok(Page::new(files, next.as_deref()))
                    },
                )
                .await?;
                Ok(files)
            })
            .await
    }

    /// Metadata of `key`
    pub async fn get_metadata(&self, key: &str) -> Result<FileItem, CloudSaveError> {
        self.handler
            .run(|| async { Ok(FileItem::from(self.api.metadata(key).await?)) })
            .await
    }

    /// Store `bytes` under `key`, guarded by `write_lock` when given
    pub async fn save_bytes(
        &self,
        key: &str,
        bytes: impl Into<Bytes>,
        write_lock: Option<&str>,
    ) -> Result<(), CloudSaveError> {
        let bytes = bytes.into();
        self.handler
            .run(|| async move {
                self.api.check_preconditions()?;
                validate_key(key)?;
                self.upload(key, bytes, write_lock).await
            })
            .await
    }

    /// Store the full contents of `stream` under `key`
    ///
    /// The stream is read from its start and left rewound to its start.
    pub async fn save_stream<S>(
        &self,
        key: &str,
        stream: &mut S,
        write_lock: Option<&str>,
    ) -> Result<(), CloudSaveError>
    where
        S: AsyncRead + AsyncSeek + Unpin + Send,
    {
        self.handler
            .run(|| async move {
                self.api.check_preconditions()?;
                validate_key(key)?;
                let bytes = read_seekable(stream).await?;
                self.upload(key, Bytes::from(bytes), write_lock).await
            })
            .await
    }

    async fn upload(
        &self,
        key: &str,
        bytes: Bytes,
        write_lock: Option<&str>,
    ) -> Result<(), ApiFailure> {
        let details = FileDetailsBody {
            content_type: FILE_CONTENT_TYPE.to_string(),
            content_length: bytes.len() as u64,
            content_md5: content_md5(&bytes),
            write_lock: write_lock.map(str::to_string),
        };

        let signed = self.api.upload_url(key, &details).await?;
        debug!(key, length = details.content_length, "Upload URL issued");

        self.api.upload(&signed, bytes).await?;
        info!(key, length = details.content_length, "File uploaded");
        Ok(())
    }

    /// Contents of `key`
    pub async fn load_bytes(&self, key: &str) -> Result<Bytes, CloudSaveError> {
        self.handler
            .run(|| async {
                let signed = self.api.download_url(key).await?;
                let bytes = self.api.download(&signed).await?;
                debug!(key, length = bytes.len(), "File downloaded");
                Ok(bytes)
            })
            .await
    }

    /// Contents of `key` as a readable, seekable stream
    pub async fn load_stream(&self, key: &str) -> Result<Cursor<Bytes>, CloudSaveError> {
        self.load_bytes(key).await.map(Cursor::new)
    }

    /// Delete `key`, guarded by `write_lock` when given
    pub async fn delete(&self, key: &str, write_lock: Option<&str>) -> Result<(), CloudSaveError> {
        self.handler
            .run(|| self.api.delete(key, write_lock))
            .await
    }
}
