//! Endpoint clients
//!
//! [`ApiClient`] owns the transport, the service base URL and the identity
//! providers. It checks identity preconditions, builds authorized requests,
//! records request metrics and turns non-success responses into
//! [`ApiFailure::Http`] with a decoded [`ErrorBody`](error_body::ErrorBody).
//! [`DataApi`] and [`FilesApi`] describe the individual endpoints on top of it.

use bytes::Bytes;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub mod data;
pub mod error_body;
pub mod files;
pub mod models;

pub use data::{DataApi, DataScope};
pub use files::{validate_key, FilesApi};

use crate::error::{codes, ApiFailure, CloudSaveError, CloudSaveErrorReason};
use crate::identity::{PlayerIdentity, ProjectIdentity};
use crate::metrics::RequestMetrics;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use error_body::{ErrorBody, ResponseOrigin};

const PROJECT_ID_MISSING: &str =
    "Project ID is missing - make sure the project is correctly linked to your game and try again.";
const PLAYER_ID_MISSING: &str =
    "Player ID is missing - ensure you are signed in through the Authentication SDK and try again.";
const ACCESS_TOKEN_MISSING: &str =
    "Access token is missing - ensure you are signed in through the Authentication SDK and try again.";

/// Identity values resolved for one call
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Cloud project id
    pub project_id: String,
    /// Signed-in player, when the call needs one
    pub player_id: Option<String>,
    /// Bearer token
    pub access_token: String,
}

/// Shared request plumbing for every endpoint
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    base_url: Url,
    project: Arc<dyn ProjectIdentity>,
    player: Arc<dyn PlayerIdentity>,
}

impl ApiClient {
    /// Client for `base_url`
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: Url,
        project: Arc<dyn ProjectIdentity>,
        player: Arc<dyn PlayerIdentity>,
    ) -> Self {
        Self {
            transport,
            base_url,
            project,
            player,
        }
    }

    /// Project id, player id and token, checked in that order
    pub fn player_credentials(&self) -> Result<Credentials, CloudSaveError> {
        let project_id = self.project_id()?;
        let player_id = self.player.player_id().ok_or_else(|| {
            CloudSaveError::request(
                CloudSaveErrorReason::PlayerIdMissing,
                codes::UNKNOWN,
                PLAYER_ID_MISSING,
            )
        })?;
        let access_token = self.access_token()?;

        Ok(Credentials {
            project_id,
            player_id: Some(player_id),
            access_token,
        })
    }

    /// Project id and token, for calls not tied to the signed-in player
    pub fn project_credentials(&self) -> Result<Credentials, CloudSaveError> {
        Ok(Credentials {
            project_id: self.project_id()?,
            player_id: None,
            access_token: self.access_token()?,
        })
    }

    fn project_id(&self) -> Result<String, CloudSaveError> {
        self.project.cloud_project_id().ok_or_else(|| {
            CloudSaveError::request(
                CloudSaveErrorReason::ProjectIdMissing,
                codes::UNKNOWN,
                PROJECT_ID_MISSING,
            )
        })
    }

    fn access_token(&self) -> Result<String, CloudSaveError> {
        self.player.access_token().ok_or_else(|| {
            CloudSaveError::request(
                CloudSaveErrorReason::AccessTokenMissing,
                codes::INVALID_TOKEN,
                ACCESS_TOKEN_MISSING,
            )
        })
    }

    /// Service URL from path segments and query pairs
    pub fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ApiFailure> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiFailure::Other(format!("base url {} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Request carrying the bearer token
    ///
    /// A token that cannot be sent as a header value fails here rather than
    /// reaching the service without credentials.
    pub fn authorized(
        &self,
        method: Method,
        url: Url,
        credentials: &Credentials,
    ) -> Result<HttpRequest, ApiFailure> {
        HttpRequest::new(method, url)
            .header("Authorization", &format!("Bearer {}", credentials.access_token))
            .and_then(|request| request.header("Accept", "application/json"))
            .map_err(invalid_request)
    }

    /// Attach `body` as JSON
    pub fn with_json<B: Serialize>(request: HttpRequest, body: &B) -> Result<HttpRequest, ApiFailure> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| ApiFailure::Other(format!("failed to encode request body: {e}")))?;
        Ok(request
            .header("Content-Type", "application/json")
            .map_err(invalid_request)?
            .body(bytes))
    }

    /// Send a request and fail on non-success statuses
    pub async fn execute(
        &self,
        operation: &'static str,
        origin: ResponseOrigin,
        request: HttpRequest,
    ) -> Result<HttpResponse, ApiFailure> {
        let metrics = RequestMetrics::start(operation);
        debug!(operation, method = %request.method, path = request.url.path(), "Calling endpoint");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                metrics.record_network_error();
                return Err(ApiFailure::Transport(e));
            }
        };
        metrics.record_complete(response.status);

        if response.is_success() {
            return Ok(response);
        }

        Err(ApiFailure::Http {
            status: response.status,
            body: ErrorBody::decode(origin, &response.body),
            headers: response.headers,
        })
    }

    /// Send a service request and decode its JSON response
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: HttpRequest,
    ) -> Result<T, ApiFailure> {
        let response = self
            .execute(operation, ResponseOrigin::Service, request)
            .await?;
        decode_json(response.status, &response.body)
    }

    /// Send a service request whose response body is ignored
    pub async fn call(&self, operation: &'static str, request: HttpRequest) -> Result<(), ApiFailure> {
        self.execute(operation, ResponseOrigin::Service, request)
            .await
            .map(|_| ())
    }

    /// Send a request to a signed storage URL and return the body
    pub async fn storage(
        &self,
        operation: &'static str,
        request: HttpRequest,
    ) -> Result<Bytes, ApiFailure> {
        self.execute(operation, ResponseOrigin::Storage, request)
            .await
            .map(|response| response.body)
    }
}

fn decode_json<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ApiFailure> {
    serde_json::from_slice(body).map_err(|e| ApiFailure::Deserialization {
        status,
        message: e.to_string(),
    })
}

/// A request that could not be built never reached the network
pub(crate) fn invalid_request(error: TransportError) -> ApiFailure {
    ApiFailure::Other(error.to_string())
}
