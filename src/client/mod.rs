//! Rate-governed API client
//!
//! This module contains everything that talks to the remote service:
//! - Adaptive rate governing from response metadata
//! - Authenticated GET requests with transport error classification
//! - `Link` header parsing
//! - Cursor-based pagination over complete collections

mod fetcher;
mod governor;
pub mod link;
mod paginator;

pub use fetcher::{
    build_http_client, effective_read_timeout, FetchResult, HttpFetcher, MIN_READ_TIMEOUT,
};
pub use governor::{jitter_for, RateGovernor, RateState, COST_SPIKE_DELAY, RATE_LIMITED_DELAY};
pub use link::{next_link, parse_link_header, LinkRelation, PageCursor};
pub use paginator::{PageStream, Paginator};
