use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::cache::{DEFAULT_TTL_DAYS, TtlCache};

#[derive(Debug, Error)]
pub enum DocsFetchError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error! status: {status} {status_text}")]
    HttpStatus { status: u16, status_text: String },

    #[error("Failed to decode documentation: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected response body, expected {0}")]
    UnexpectedBody(&'static str),
}

/// How a response body should be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseType {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub response_type: ResponseType,
    pub ttl_days: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            response_type: ResponseType::default(),
            ttl_days: DEFAULT_TTL_DAYS,
        }
    }
}

/// A decoded response body as stored in the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpBody {
    Json(Value),
    Text(String),
}

impl HttpBody {
    pub fn into_json(self) -> Result<Value, DocsFetchError> {
        match self {
            HttpBody::Json(value) => Ok(value),
            HttpBody::Text(_) => Err(DocsFetchError::UnexpectedBody("json")),
        }
    }

    pub fn into_text(self) -> Result<String, DocsFetchError> {
        match self {
            HttpBody::Text(text) => Ok(text),
            HttpBody::Json(_) => Err(DocsFetchError::UnexpectedBody("text")),
        }
    }
}

/// Fetches remote documents with a single GET, caching decoded bodies by URL.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
    cache: TtlCache<HttpBody>,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &TtlCache<HttpBody> {
        &self.cache
    }

    /// Fetches `url` unless a fresh body for it is already cached.
    ///
    /// # Arguments
    /// * `url` - Absolute URL to GET, also used as the cache key
    /// * `options` - How to decode the body and how long to keep it
    ///
    /// # Returns
    /// * `Ok(HttpBody)` - The decoded body, fresh or from the cache
    /// * `Err(DocsFetchError)` - If the request fails, the status is not a
    ///   success, or the body cannot be decoded; nothing is cached then
    pub async fn fetch_http_with_cache(
        &self,
        url: &str,
        options: FetchOptions,
    ) -> Result<HttpBody, DocsFetchError> {
        self.cache
            .fetch_with_cache(
                url,
                || self.fetch(url, options.response_type),
                options.ttl_days,
            )
            .await
    }

    async fn fetch(&self, url: &str, response_type: ResponseType) -> Result<HttpBody, DocsFetchError> {
        tracing::info!("Fetching HTTP resource: {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocsFetchError::HttpStatus {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = match response_type {
            ResponseType::Json => HttpBody::Json(response.json().await?),
            ResponseType::Text => HttpBody::Text(response.text().await?),
        };
        tracing::info!("Successfully fetched HTTP resource: {}", url);
        Ok(body)
    }
}
