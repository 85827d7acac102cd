//! Veo generation service HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, info, warn};
use url::Url;
use vgen_models::{
    GeneratedVideo, GenerationRequest, JobHandle, JobStatus, MediaReference, SubmittedJob,
};

use crate::error::{ClientError, ClientResult};
use crate::job_client::JobClient;
use crate::types::{Operation, PredictRequest};

/// Default REST endpoint of the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Video model used for every job.
pub const DEFAULT_MODEL: &str = "veo-2.0-generate-001";

/// Message reported when no credential is configured.
pub const MISSING_API_KEY_MESSAGE: &str = "API_KEY environment variable is not set.";

/// Configuration for the Veo client.
#[derive(Debug, Clone)]
pub struct VeoClientConfig {
    /// API key; `None` makes every operation fail with a configuration error
    pub api_key: Option<String>,
    /// Base URL of the REST API
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Timeout for a single HTTP request
    pub request_timeout: Duration,
}

impl Default for VeoClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl VeoClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: std::env::var("VEO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("VEO_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            request_timeout: Duration::from_secs(
                std::env::var("VEO_REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Point the client at another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// REST adapter for Veo long-running video generation.
pub struct VeoClient {
    http: Client,
    config: VeoClientConfig,
}

impl VeoClient {
    /// Create a new Veo client.
    ///
    /// A missing API key is not an error here; it surfaces on first use.
    pub fn new(config: VeoClientConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        if config.api_key.is_none() {
            warn!("No API key configured; video generation will fail until one is provided");
        }

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(VeoClientConfig::from_env())
    }

    pub fn config(&self) -> &VeoClientConfig {
        &self.config
    }

    fn api_key(&self) -> ClientResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ClientError::configuration(MISSING_API_KEY_MESSAGE))
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Read an error body without failing on it.
    async fn describe_failure(response: Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if body.trim().is_empty() {
            format!("service returned {}", status)
        } else {
            format!("service returned {}: {}", status, body.trim())
        }
    }
}

#[async_trait]
impl JobClient for VeoClient {
    async fn submit(&self, request: &GenerationRequest) -> ClientResult<SubmittedJob> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/models/{}:predictLongRunning",
            self.base_url(),
            self.config.model
        );

        info!(
            model = %self.config.model,
            aspect_ratio = %request.aspect_ratio,
            image_bytes = request.image.len(),
            "Starting video generation"
        );
        metrics::counter!("vgen_client_requests_total", "operation" => "submit").increment(1);

        // The key travels in the query string; errors below drop the URL.
        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(&PredictRequest::from(request))
            .send()
            .await
            .map_err(|e| ClientError::submission(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::submission(Self::describe_failure(response).await));
        }

        let operation: Operation = response
            .json()
            .await
            .map_err(|e| ClientError::invalid_response(format!("Failed to parse operation: {}", e)))?;

        if operation.name.trim().is_empty() {
            return Err(ClientError::invalid_response("Operation has no name"));
        }

        debug!(operation = %operation.name, done = operation.done, "Generation submitted");
        Ok(SubmittedJob {
            status: operation.to_status(),
            handle: JobHandle::from_string(operation.name),
        })
    }

    async fn poll(&self, handle: &JobHandle) -> ClientResult<JobStatus> {
        let api_key = self.api_key()?;
        let url = format!("{}/{}", self.base_url(), handle.as_str().trim_start_matches('/'));

        metrics::counter!("vgen_client_requests_total", "operation" => "poll").increment(1);

        let response = self
            .http
            .get(&url)
            .query(&[("key", api_key)])
            .send()
            .await
            .map_err(|e| ClientError::poll(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::poll(Self::describe_failure(response).await));
        }

        let operation: Operation = response
            .json()
            .await
            .map_err(|e| ClientError::invalid_response(format!("Failed to parse operation: {}", e)))?;

        debug!(operation = %operation.name, done = operation.done, "Current operation status");
        Ok(operation.to_status())
    }

    async fn fetch_result(&self, media: &MediaReference) -> ClientResult<GeneratedVideo> {
        let api_key = self.api_key()?;

        let mut url = Url::parse(&media.uri)
            .map_err(|e| ClientError::retrieval(format!("Invalid download link '{}': {}", media.uri, e)))?;
        url.query_pairs_mut().append_pair("key", api_key);

        info!(uri = %media.uri, "Fetching generated video");
        metrics::counter!("vgen_client_requests_total", "operation" => "fetch").increment(1);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| {
                ClientError::retrieval(format!("Failed to download video: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::retrieval(format!(
                "Failed to download video. Status: {}",
                status
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| {
                ClientError::retrieval(format!("Failed to read video body: {}", e.without_url()))
            })?;

        info!(uri = %media.uri, bytes = bytes.len(), "Generated video downloaded");
        Ok(GeneratedVideo::new(media.uri.clone(), content_type, bytes.to_vec()))
    }
}
