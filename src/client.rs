//! HTTP client for the similarity backend.
//!
//! Each call is a single request/response. Failures are returned to the
//! caller as-is; nothing here retries.

use crate::model::{
    CompareRequest, ComparisonResult, DEFAULT_TOP_K, SearchRequest, SearchResponse, SearchResult,
};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub top_k: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: None,
            top_k: DEFAULT_TOP_K,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },
    #[error("could not decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    pub fn endpoint(&self) -> Option<&'static str> {
        match self {
            ClientError::Build(_) => None,
            ClientError::Transport { endpoint, .. }
            | ClientError::Status { endpoint, .. }
            | ClientError::Decode { endpoint, .. } => Some(*endpoint),
        }
    }
}

/// Talks to `POST /search` and `POST /compare` on the backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    top_k: usize,
}

impl BackendClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::Build)?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            top_k: config.top_k.max(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Searches for papers similar to `query` using the configured `top_k`.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ClientError> {
        self.search_top(query, self.top_k).await
    }

    pub async fn search_top(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, ClientError> {
        let request = SearchRequest {
            query: query.to_string(),
            top_k,
        };
        let response: SearchResponse = self.post_json("/search", &request).await?;
        debug!(count = response.results.len(), top_k, "search returned");
        Ok(response.results)
    }

    /// Fetches highlight spans for `query` against `paper_text`.
    pub async fn compare(
        &self,
        query: &str,
        paper_text: &str,
    ) -> Result<ComparisonResult, ClientError> {
        let request = CompareRequest {
            query: query.to_string(),
            paper_text: paper_text.to_string(),
        };
        let comparison: ComparisonResult = self.post_json("/compare", &request).await?;
        debug!(
            user_spans = comparison.user_highlights.len(),
            paper_spans = comparison.paper_highlights.len(),
            "compare returned"
        );
        Ok(comparison)
    }

    async fn post_json<B, T>(&self, endpoint: &'static str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "calling backend");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| {
                warn!(%url, error = %source, "backend unreachable");
                ClientError::Transport { endpoint, source }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "backend returned an error status");
            return Err(ClientError::Status { endpoint, status });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ClientError::Decode { endpoint, source })
    }
}
