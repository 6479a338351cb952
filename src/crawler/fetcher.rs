//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The `Transport` seam between the crawl engine and the network
//! - Building the reqwest-backed transport with a proper user agent string
//! - Classifying failures as transient (retried) or permanent (skipped)
//! - Rejecting responses that cannot be parsed as HTML documents

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a single fetch produced no document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request did not finish within the per-fetch timeout
    #[error("request timed out")]
    Timeout,

    /// Connection, DNS, TLS or body transfer failure
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("HTTP status {0}")]
    Status(u16),

    /// The response is not a parsable HTML document
    #[error("parse error: {0}")]
    Parse(String),
}

impl FetchError {
    /// Returns true if another attempt may succeed
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Timeout | Retry |
    /// | Network error | Retry |
    /// | HTTP 429, 5xx | Retry |
    /// | Other HTTP status | Skip page |
    /// | Parse error | Skip page |
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Network(_) => true,
            Self::Status(code) => *code == 429 || (500..600).contains(code),
            Self::Parse(_) => false,
        }
    }
}

/// A raw HTTP response as delivered by a transport
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, if the server sent one
    pub content_type: Option<String>,

    /// Response body decoded as text
    pub body: String,
}

impl RawResponse {
    /// A 200 response with an HTML content type
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.into(),
        }
    }
}

/// Performs single HTTP GET requests on behalf of the crawler
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url`, failing with `FetchError::Timeout` once `timeout` elapses
    async fn get(&self, url: &str, timeout: Duration) -> Result<RawResponse, FetchError>;
}

/// A fetched page that passed status and content-type checks
#[derive(Debug, Clone)]
pub struct Document {
    /// URL the document was requested from; base for resolving relative links
    pub url: Url,

    /// Raw HTML
    pub body: String,
}

/// Default cap on a downloaded response body (5 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Transport backed by a shared `reqwest::Client`
///
/// Status and `Content-Type` are checked from the response headers before
/// the body is read, so non-HTML links are never downloaded. Bodies larger
/// than the configured limit are abandoned mid-stream.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    max_body_bytes: usize,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Builds the transport with a client configured from `config`
    pub fn from_config(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }

    /// Sets the largest body, in bytes, the transport will read
    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<RawResponse, FetchError> {
        let mut response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        check_head(status, content_type.as_deref())?;

        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes as u64 {
                return Err(body_too_large(self.max_body_bytes));
            }
        }

        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(classify_reqwest_error)? {
            if bytes.len() + chunk.len() > self.max_body_bytes {
                return Err(body_too_large(self.max_body_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(RawResponse {
            status,
            content_type,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

fn body_too_large(limit: usize) -> FetchError {
    FetchError::Parse(format!("body exceeds {} bytes", limit))
}

fn classify_reqwest_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Network(format!("connection failed: {}", error))
    } else {
        FetchError::Network(error.to_string())
    }
}

/// Builds an HTTP client with proper configuration
///
/// The per-request timeout is applied on every request by the transport, so
/// the client itself only bounds connection setup.
///
/// # Example
///
/// ```no_run
/// use gleaner::config::UserAgentConfig;
/// use gleaner::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once and validates that the response is an HTML document
///
/// # Returns
///
/// * `Ok(Document)` - 2xx response with an HTML (or missing) content type and a non-empty body
/// * `Err(FetchError::Status)` - non-success status
/// * `Err(FetchError::Parse)` - non-HTML content type or empty body
/// * `Err(FetchError::Timeout | FetchError::Network)` - transport failure
pub async fn fetch(
    transport: &dyn Transport,
    url: &Url,
    timeout: Duration,
) -> Result<Document, FetchError> {
    let response = transport.get(url.as_str(), timeout).await?;

    check_head(response.status, response.content_type.as_deref())?;

    if response.body.trim().is_empty() {
        return Err(FetchError::Parse("empty document".to_string()));
    }

    Ok(Document {
        url: url.clone(),
        body: response.body,
    })
}

/// Rejects non-success statuses and non-HTML content types
///
/// A missing content type is accepted.
fn check_head(status: u16, content_type: Option<&str>) -> Result<(), FetchError> {
    if !(200..300).contains(&status) {
        return Err(FetchError::Status(status));
    }

    match content_type {
        Some(content_type) if !is_html_content_type(content_type) => Err(FetchError::Parse(
            format!("expected HTML, got {}", content_type),
        )),
        _ => Ok(()),
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}
