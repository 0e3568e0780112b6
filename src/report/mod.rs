//! Report module for audit output
//!
//! This module handles:
//! - The report row assembled for each audited course
//! - Rendering rows as CSV
//! - Writing the CSV report to disk

mod csv;

pub use self::csv::{format_report, write_report, REPORT_HEADER};

use crate::audit::ProbeOutcome;
use thiserror::Error;

/// Errors that can occur while writing the report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to create report directory {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write report {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// One audited course in the report
///
/// Built once per selected course and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub course_id: u64,
    pub course_name: String,
    pub subject: String,
    pub with_modules: ProbeOutcome,
    pub with_assignments: ProbeOutcome,
    pub with_front_page: ProbeOutcome,

    /// Teacher names joined with ", " (or a sentinel)
    pub faculty_names: String,

    /// Teacher emails joined with ", " (or a sentinel)
    pub faculty_emails: String,
}

impl ReportRow {
    /// Column values in report order
    pub fn to_record(&self) -> [String; 8] {
        [
            self.course_id.to_string(),
            self.course_name.clone(),
            self.subject.clone(),
            self.with_modules.to_string(),
            self.with_assignments.to_string(),
            self.with_front_page.to_string(),
            self.faculty_names.clone(),
            self.faculty_emails.clone(),
        ]
    }
}
