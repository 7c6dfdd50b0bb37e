//! REST API client for the rendering service HTTP endpoints.
//!
//! Wraps the service API (video creation, status retrieval, asset
//! download) using [`reqwest`]. Credential handling is per-call: the
//! caller passes the API credential and it is sent verbatim in the
//! `Authorization` header.

use async_trait::async_trait;
use castkit_core::{JobRequest, JobStatus};
use serde::Deserialize;

/// Base URL of the hosted rendering service.
pub const DEFAULT_BASE_URL: &str = "https://api.synthesia.io/v2";

/// HTTP client for the rendering service.
pub struct VideoApi {
    client: reqwest::Client,
    base_url: String,
}

/// Response returned by `POST /videos` after a job is accepted.
#[derive(Debug, Deserialize)]
pub struct CreateVideoResponse {
    /// Service-assigned identifier for the new job.
    pub id: String,
}

/// Response returned by `GET /videos/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoStatusResponse {
    /// Raw status string; see [`VideoStatusResponse::job_status`].
    pub status: String,
    /// Primary (motion) asset URL, present once rendering completes.
    pub download: Option<String>,
    /// Static thumbnail URL.
    pub thumbnail: Option<String>,
    /// Alternate field name some API versions use for the thumbnail.
    pub thumbnail_url: Option<String>,
}

impl VideoStatusResponse {
    /// Parsed lifecycle status.
    pub fn job_status(&self) -> JobStatus {
        JobStatus::from_remote(&self.status)
    }

    /// The fallback asset URL: `thumbnail` if present, else
    /// `thumbnail_url`.
    pub fn fallback_url(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .or(self.thumbnail_url.as_deref())
    }
}

/// Errors from the rendering-service REST layer.
#[derive(Debug, thiserror::Error)]
pub enum VideoApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service rejected the credential (401/403).
    #[error("credential rejected ({status}): {body}")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The service returned any other non-2xx status code.
    #[error("rendering service error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl VideoApi {
    /// Create a new client for the given base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, mapping 401/403
    /// to [`VideoApiError::Unauthorized`] and every other failure to
    /// [`VideoApiError::Api`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, VideoApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(match status.as_u16() {
                401 | 403 => VideoApiError::Unauthorized {
                    status: status.as_u16(),
                    body,
                },
                code => VideoApiError::Api { status: code, body },
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, VideoApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Build the `POST /videos` request body for a job request.
///
/// Field names follow the service wire contract; `test` is disabled so
/// renders are unwatermarked (these consume account credits).
fn create_video_body(request: &JobRequest) -> serde_json::Value {
    serde_json::json!({
        "title": request.title,
        "description": castkit_core::request::REQUEST_DESCRIPTION,
        "visibility": "public",
        "test": false,
        "input": [{
            "scriptText": request.script_text,
            "avatarId": request.avatar_id,
            "background": request.background,
        }],
    })
}

// ---------------------------------------------------------------------------
// RenderService
// ---------------------------------------------------------------------------

/// Boundary trait for the rendering service.
///
/// [`VideoApi`] is the production implementation; the orchestrator and
/// the tests depend on this trait so the network edge can be faked.
#[async_trait]
pub trait RenderService: Send + Sync {
    /// Submit a render job. No retry: a failed submission surfaces
    /// immediately, since resubmitting may incur billable cost.
    async fn create_video(
        &self,
        credential: &str,
        request: &JobRequest,
    ) -> Result<CreateVideoResponse, VideoApiError>;

    /// Query the current status of a job.
    async fn video_status(
        &self,
        credential: &str,
        video_id: &str,
    ) -> Result<VideoStatusResponse, VideoApiError>;

    /// Download a produced asset as raw bytes.
    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, VideoApiError>;
}

#[async_trait]
impl RenderService for VideoApi {
    async fn create_video(
        &self,
        credential: &str,
        request: &JobRequest,
    ) -> Result<CreateVideoResponse, VideoApiError> {
        let response = self
            .client
            .post(format!("{}/videos", self.base_url))
            .header("Authorization", credential)
            .json(&create_video_body(request))
            .send()
            .await?;

        let created: CreateVideoResponse = Self::parse_response(response).await?;
        tracing::info!(video_id = %created.id, title = %request.title, "Render job submitted");
        Ok(created)
    }

    async fn video_status(
        &self,
        credential: &str,
        video_id: &str,
    ) -> Result<VideoStatusResponse, VideoApiError> {
        let response = self
            .client
            .get(format!("{}/videos/{}", self.base_url, video_id))
            .header("Authorization", credential)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, VideoApiError> {
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
