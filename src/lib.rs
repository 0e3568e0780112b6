//! lms-audit: unpublished-course auditor for LMS accounts
//!
//! This crate walks an LMS account's course catalog through a rate-governed,
//! cursor-paginated API client, probes every unpublished course of a term for
//! content and faculty, and writes the findings as a CSV report.

pub mod audit;
pub mod client;
pub mod config;
pub mod lms;
pub mod report;

use thiserror::Error;

/// Main error type for lms-audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Service unreachable at {url}: {source}")]
    Unreachable { url: String, source: reqwest::Error },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Refusing to send credentials to foreign origin: {url}")]
    ForeignUrl { url: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Pagination loop detected at {url}")]
    PaginationLoop { url: String },
}

impl AuditError {
    /// Returns true for failures where no response was received at all
    ///
    /// These are never recorded against the rate model.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Unreachable { .. } | Self::Http { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("No API token configured (set `token` or the `{0}` environment variable)")]
    MissingToken(String),
}

/// Result type alias for lms-audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

// Re-export commonly used types
pub use audit::{AuditStats, CourseAuditor, ProbeOutcome};
pub use client::{HttpFetcher, Paginator, RateGovernor, RateState};
pub use config::Config;
pub use report::ReportRow;
