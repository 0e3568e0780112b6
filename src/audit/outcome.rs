//! Probe outcome definitions for report rows
//!
//! A failed probe must stay distinguishable from a confirmed absence, so the
//! outcome is a closed three-way enum rather than a boolean.

use crate::lms::Teacher;
use std::fmt;

/// Faculty column value when no teacher is enrolled
pub const NO_FACULTY: &str = "No Faculty";

/// Email placeholder for a teacher without an address (or for no teachers)
pub const NO_EMAIL: &str = "No Email";

/// Faculty column values when the teacher lookup failed
pub const FACULTY_ERROR: &str = "Error";

/// Result of a single per-course presence probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProbeOutcome {
    /// The probed content exists
    Yes,

    /// The probed content is confirmed absent (or the probe does not apply)
    #[default]
    No,

    /// The probe could not complete
    Error,
}

impl ProbeOutcome {
    /// Converts a confirmed presence signal into an outcome
    pub fn from_presence(present: bool) -> Self {
        if present {
            Self::Yes
        } else {
            Self::No
        }
    }

    /// Returns the report column value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Error => "Error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the faculty probe
#[derive(Debug, Clone, PartialEq)]
pub enum FacultyOutcome {
    /// One or more teachers are enrolled
    Assigned(Vec<Teacher>),

    /// No teacher is enrolled yet
    Unassigned,

    /// The teacher lookup failed
    Error,
}

impl FacultyOutcome {
    pub fn from_teachers(teachers: Vec<Teacher>) -> Self {
        if teachers.is_empty() {
            Self::Unassigned
        } else {
            Self::Assigned(teachers)
        }
    }

    /// Renders the (names, emails) report columns
    ///
    /// Names and emails are joined with ", " in enrollment order; a teacher
    /// without an email contributes the "No Email" placeholder.
    pub fn columns(&self) -> (String, String) {
        match self {
            Self::Assigned(teachers) => {
                let names = teachers
                    .iter()
                    .map(|t| t.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let emails = teachers
                    .iter()
                    .map(|t| match t.email.as_deref().map(str::trim) {
                        Some(email) if !email.is_empty() => email,
                        _ => NO_EMAIL,
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                (names, emails)
            }
            Self::Unassigned => (NO_FACULTY.to_string(), NO_EMAIL.to_string()),
            Self::Error => (FACULTY_ERROR.to_string(), FACULTY_ERROR.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}
