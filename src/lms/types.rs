//! Entities decoded from the LMS API
//!
//! Only the fields the audit needs are decoded; everything else in the
//! service's payloads is ignored.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// A course from the account catalog
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Course {
    pub id: u64,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,

    /// Publication lifecycle state ("unpublished", "available", ...)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub workflow_state: String,

    /// Landing view of the course ("wiki", "modules", "syllabus", ...)
    #[serde(default)]
    pub default_view: Option<String>,

    /// Term-scoped SIS identifier, e.g. "6253-FA-MATH-101"
    #[serde(default)]
    pub sis_course_id: Option<String>,

    #[serde(default)]
    pub course_format: Option<String>,
}

/// A user enrolled in a course as teacher
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Teacher {
    pub id: u64,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

/// A course module; only its presence matters
pub type ModuleEntry = IgnoredAny;

/// An assignment, reduced to its publication flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AssignmentEntry {
    #[serde(default)]
    pub published: Option<bool>,
}

impl AssignmentEntry {
    /// Whether the assignment counts when only published work is considered
    ///
    /// Assignments that do not report the flag are treated as published.
    pub fn is_published(&self) -> bool {
        self.published.unwrap_or(true)
    }
}

/// The course front page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FrontPage {
    #[serde(default)]
    pub body: Option<String>,
}

impl FrontPage {
    /// Returns true if the page has any non-whitespace content
    pub fn has_content(&self) -> bool {
        self.body.as_deref().is_some_and(|b| !b.trim().is_empty())
    }
}

/// Decodes a string field that the service may send as `null`
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
