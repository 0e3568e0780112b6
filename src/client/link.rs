//! `Link` header parsing for cursor-based pagination
//!
//! The service advertises continuation pages as a comma-separated list of
//! `<url>; rel="name"` segments, e.g.
//!
//! ```text
//! <https://lms.example.edu/api/v1/courses?page=2>; rel="next",
//! <https://lms.example.edu/api/v1/courses?page=1>; rel="first"
//! ```

use std::fmt;

/// A single `<target>; rel="..."` entry of a `Link` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRelation {
    /// The URL between the angle brackets
    pub target: String,

    /// The relation name, without quotes
    pub rel: String,
}

/// Opaque continuation reference to the next page of a collection
///
/// A cursor is consumed by the fetch that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor(String);

impl PageCursor {
    /// Wraps a continuation target
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    /// The continuation target (absolute URL or path)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the cursor, yielding its target
    pub fn into_target(self) -> String {
        self.0
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses every relation in a `Link` header value
///
/// Segments without a `<...>` target or without a `rel` parameter are skipped.
/// Commas inside the angle brackets or inside quoted parameters do not split
/// segments.
pub fn parse_link_header(value: &str) -> Vec<LinkRelation> {
    split_segments(value)
        .into_iter()
        .filter_map(parse_segment)
        .collect()
}

/// Finds the continuation cursor in a `Link` header value
///
/// # Returns
///
/// * `Some(PageCursor)` - The target of the segment whose relation is exactly `next`
/// * `None` - No `next` relation: the collection is complete
pub fn next_link(value: &str) -> Option<PageCursor> {
    parse_link_header(value)
        .into_iter()
        .find(|link| link.rel == "next")
        .map(|link| PageCursor::new(link.target))
}

fn split_segments(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut in_target = false;
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            '<' if !in_quotes => in_target = true,
            '>' if !in_quotes => in_target = false,
            '"' if !in_target => in_quotes = !in_quotes,
            ',' if !in_target && !in_quotes => {
                segments.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);

    segments
}

fn parse_segment(segment: &str) -> Option<LinkRelation> {
    let segment = segment.trim();
    let open = segment.find('<')?;
    let close = open + segment[open..].find('>')?;

    let target = segment[open + 1..close].trim();
    if target.is_empty() {
        return None;
    }

    let rel = segment[close + 1..].split(';').find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("rel") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })?;

    Some(LinkRelation {
        target: target.to_string(),
        rel,
    })
}
