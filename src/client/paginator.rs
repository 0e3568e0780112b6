//! Cursor-link paginator
//!
//! Walks a paginated collection by following the `rel="next"` relation of each
//! response's `Link` header until the service stops advertising one.

use crate::client::fetcher::HttpFetcher;
use crate::client::link::{next_link, PageCursor};
use crate::AuditError;
use reqwest::header::LINK;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::marker::PhantomData;

/// Drives an [`HttpFetcher`] across paginated collections
#[derive(Clone, Copy)]
pub struct Paginator<'a> {
    fetcher: &'a HttpFetcher,
}

impl<'a> Paginator<'a> {
    /// Creates a paginator over the given fetcher
    pub fn new(fetcher: &'a HttpFetcher) -> Self {
        Self { fetcher }
    }

    /// Starts a lazy, forward-only walk over a collection
    pub fn pages<T: DeserializeOwned>(&self, start: &str) -> PageStream<'a, T> {
        PageStream {
            fetcher: self.fetcher,
            cursor: Some(PageCursor::new(start)),
            visited: HashSet::new(),
            pages_fetched: 0,
            _item: PhantomData,
        }
    }

    /// Fetches every page of a collection and concatenates the items in order
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<T>)` - The complete collection
    /// * `Err(AuditError)` - A page failed to fetch or decode; no partial result is returned
    pub async fn collect_all<T: DeserializeOwned>(&self, start: &str) -> Result<Vec<T>, AuditError> {
        let mut stream = self.pages::<T>(start);
        let mut items = Vec::new();

        while let Some(page) = stream.next_page().await {
            items.extend(page?);
        }

        tracing::debug!(
            "Collected {} items from {} in {} pages",
            items.len(),
            start,
            stream.pages_fetched()
        );
        Ok(items)
    }
}

/// A forward-only sequence of decoded pages
///
/// Each cursor is consumed by the fetch that follows it. After an error or the
/// last page the stream is exhausted and cannot be restarted.
pub struct PageStream<'a, T> {
    fetcher: &'a HttpFetcher,
    cursor: Option<PageCursor>,
    visited: HashSet<String>,
    pages_fetched: u32,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> PageStream<'_, T> {
    /// Number of pages fetched so far
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Fetches and decodes the next page
    ///
    /// # Returns
    ///
    /// * `Some(Ok(items))` - The next page's items
    /// * `Some(Err(e))` - The page failed; the stream is now exhausted
    /// * `None` - No more pages
    pub async fn next_page(&mut self) -> Option<Result<Vec<T>, AuditError>> {
        let cursor = self.cursor.take()?;
        let target = cursor.into_target();

        let url = match self.fetcher.resolve(&target) {
            Ok(url) => url,
            Err(e) => return Some(Err(e)),
        };
        if !self.visited.insert(url.to_string()) {
            return Some(Err(AuditError::PaginationLoop {
                url: url.to_string(),
            }));
        }

        let response = match self.fetcher.get(url.as_str()).await {
            Ok(response) => response,
            Err(e) => return Some(Err(e)),
        };
        self.pages_fetched += 1;

        if !response.is_success() {
            return Some(Err(AuditError::UnexpectedStatus {
                url: response.url.to_string(),
                status: response.status.as_u16(),
            }));
        }

        let items = match response.json::<Vec<T>>() {
            Ok(items) => items,
            Err(e) => return Some(Err(e)),
        };

        self.cursor = response
            .headers
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_link);

        if let Some(next) = &self.cursor {
            tracing::debug!("Page {} of {} continues at {}", self.pages_fetched, target, next);
        }

        Some(Ok(items))
    }
}
