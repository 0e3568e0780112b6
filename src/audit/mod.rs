//! Audit module for unpublished-course detection
//!
//! # Components
//!
//! - `CourseAuditor`: lists the catalog, selects candidates and probes each one
//! - `ProbeOutcome` / `FacultyOutcome`: tri-state probe results and faculty columns
//! - `AuditStats`: run statistics printed at the end of an audit

mod auditor;
mod outcome;
mod selection;
pub mod stats;

pub use auditor::{build_row, AuditReport, CourseAuditor, CourseFindings};
pub use outcome::{FacultyOutcome, ProbeOutcome, FACULTY_ERROR, NO_EMAIL, NO_FACULTY};
pub use selection::{extract_subject, is_candidate, UNKNOWN_SUBJECT};
pub use stats::{print_statistics, AuditStats, Probe};
