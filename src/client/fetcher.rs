//! Authenticated, rate-governed HTTP fetcher
//!
//! This module handles every request the auditor makes, including:
//! - Building the HTTP client with a bounded timeout
//! - Resolving relative paths and absolute continuation URLs
//! - Bracketing each request with rate governor admission and observation
//! - Classifying transport failures

use crate::client::governor::RateGovernor;
use crate::config::ApiConfig;
use crate::AuditError;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// A completed HTTP response
///
/// Non-2xx statuses are returned as data; only transport failures are errors.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Final request URL
    pub url: Url,

    /// HTTP status code
    pub status: StatusCode,

    /// Response headers (case-insensitive)
    pub headers: HeaderMap,

    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchResult {
    /// Returns true for 2xx statuses
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns a header value as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body decoded as (lossy) UTF-8
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decodes the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AuditError> {
        serde_json::from_slice(&self.body).map_err(|source| AuditError::Decode {
            url: self.url.to_string(),
            source,
        })
    }
}

/// Smallest request timeout ever used, whatever the configured floor
pub const MIN_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Returns the timeout to use, raising values below the floor
///
/// A too-small timeout is a misconfiguration rather than a usage error, so it
/// is corrected with a warning instead of being rejected. The floor itself is
/// never below [`MIN_READ_TIMEOUT`].
pub fn effective_read_timeout(requested_secs: u64, floor_secs: u64) -> Duration {
    let floor = Duration::from_secs(floor_secs).max(MIN_READ_TIMEOUT);
    let requested = Duration::from_secs(requested_secs);

    if requested < floor {
        tracing::warn!(
            "Read timeout of {}s is too low, raising it to {}s",
            requested_secs,
            floor.as_secs()
        );
        floor
    } else {
        requested
    }
}

/// Builds an HTTP client with the given request timeout
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs authenticated GET requests against one API base address
///
/// The fetcher owns the [`RateGovernor`] for the service. The governor lock is
/// held from admission until the response headers have been observed, so
/// concurrent callers cannot interleave their admit/observe pairs.
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    token: String,
    remaining_header: String,
    cost_header: String,
    governor: Mutex<RateGovernor>,
}

impl HttpFetcher {
    /// Creates a fetcher from the API configuration and a resolved token
    pub fn new(config: &ApiConfig, token: String) -> Result<Self, AuditError> {
        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let timeout = effective_read_timeout(config.read_timeout, config.min_read_timeout);
        let client = build_http_client(timeout)?;

        Ok(Self {
            client,
            base_url,
            token,
            remaining_header: config.remaining_header.clone(),
            cost_header: config.cost_header.clone(),
            governor: Mutex::new(RateGovernor::new(config.max_rate_limit)),
        })
    }

    /// The normalized base address (always ends with `/`)
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Snapshot of the rate governor
    pub async fn governor(&self) -> RateGovernor {
        self.governor.lock().await.clone()
    }

    /// Resolves a request target against the base address
    ///
    /// Relative paths are joined onto the base address; root-relative paths and
    /// absolute URLs, such as continuation links, resolve the usual way. A target
    /// that lands on another origin is refused so the token is never sent there.
    pub fn resolve(&self, target: &str) -> Result<Url, AuditError> {
        let url = self.base_url.join(target)?;
        if url.origin() != self.base_url.origin() {
            return Err(AuditError::ForeignUrl {
                url: url.to_string(),
            });
        }
        Ok(url)
    }

    /// Fetches a target with a single GET request
    ///
    /// # Request Flow
    ///
    /// 1. Wait for the governor to admit the request
    /// 2. Send the request with the bearer token
    /// 3. Feed the rate-limit headers to the governor (any status)
    /// 4. Read the body
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResult)` - A response was received, whatever its status
    /// * `Err(AuditError)` - The target was invalid or the service was unreachable
    pub async fn get(&self, target: &str) -> Result<FetchResult, AuditError> {
        let url = self.resolve(target)?;

        let mut governor = self.governor.lock().await;
        governor.admit().await;

        tracing::debug!("GET {}", url);
        let response = match self
            .client
            .get(url.clone())
            .bearer_auth(&self.token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                governor.record_no_signal();
                return Err(classify_transport_error(&url, e));
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        governor.observe(
            header_str(&headers, &self.remaining_header),
            header_str(&headers, &self.cost_header),
            status.as_u16(),
        );
        drop(governor);

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(&url, e))?;

        if !status.is_success() {
            tracing::debug!("GET {} returned HTTP {}", url, status.as_u16());
        }

        Ok(FetchResult {
            url,
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn classify_transport_error(url: &Url, error: reqwest::Error) -> AuditError {
    let url = url.to_string();
    if error.is_timeout() {
        AuditError::Timeout { url }
    } else if error.is_connect() {
        AuditError::Unreachable { url, source: error }
    } else {
        AuditError::Http { url, source: error }
    }
}
