use serde::Deserialize;

/// Main configuration structure for lms-audit
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub audit: AuditConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote API connection and rate-limit configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base address of the API, e.g. `https://lms.example.edu/api/v1/`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Inline bearer token (takes precedence over `token_env`)
    #[serde(default)]
    pub token: Option<String>,

    /// Environment variable holding the bearer token
    #[serde(rename = "token-env", default = "default_token_env")]
    pub token_env: String,

    /// Rate-limit quota ceiling reported by the service
    #[serde(rename = "max-rate-limit", default = "default_max_rate_limit")]
    pub max_rate_limit: u32,

    /// Request timeout in seconds
    #[serde(rename = "read-timeout", default = "default_read_timeout")]
    pub read_timeout: u64,

    /// Smallest accepted request timeout in seconds
    #[serde(rename = "min-read-timeout", default = "default_min_read_timeout")]
    pub min_read_timeout: u64,

    /// Response header carrying the remaining quota
    #[serde(rename = "remaining-header", default = "default_remaining_header")]
    pub remaining_header: String,

    /// Response header carrying the cost of the request
    #[serde(rename = "cost-header", default = "default_cost_header")]
    pub cost_header: String,
}

/// Course selection and probe configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Account whose courses are listed
    #[serde(rename = "account-id", default = "default_account_id")]
    pub account_id: u64,

    /// SIS id prefix identifying the target term (e.g. "6253-")
    #[serde(rename = "term-prefix")]
    pub term_prefix: String,

    /// Search term sent with the course listing; defaults to `term_prefix`
    #[serde(rename = "search-term", default)]
    pub search_term: Option<String>,

    /// Workflow state a course must be in to be audited
    #[serde(rename = "target-state", default = "default_target_state")]
    pub target_state: String,

    /// Default view that makes the front page the course landing page
    #[serde(rename = "front-page-view", default = "default_front_page_view")]
    pub front_page_view: String,

    /// Only count published assignments in the assignments probe
    #[serde(rename = "published-assignments-only", default)]
    pub published_assignments_only: bool,

    /// Page size requested from paginated endpoints
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,
}

impl AuditConfig {
    /// The search term sent with the course listing
    pub fn effective_search_term(&self) -> &str {
        self.search_term.as_deref().unwrap_or(&self.term_prefix)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the CSV report
    #[serde(rename = "report-path", default = "default_report_path")]
    pub report_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
        }
    }
}

fn default_token_env() -> String {
    "LMS_API_TOKEN".to_string()
}

fn default_max_rate_limit() -> u32 {
    700
}

fn default_read_timeout() -> u64 {
    120
}

fn default_min_read_timeout() -> u64 {
    60
}

fn default_remaining_header() -> String {
    "X-Rate-Limit-Remaining".to_string()
}

fn default_cost_header() -> String {
    "X-Request-Cost".to_string()
}

fn default_account_id() -> u64 {
    1
}

fn default_target_state() -> String {
    "unpublished".to_string()
}

fn default_front_page_view() -> String {
    "wiki".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_report_path() -> String {
    "data/reports/unpublished_courses.csv".to_string()
}
