use crate::config::AuditConfig;
use crate::lms::Course;

/// Subject reported when the SIS id is not a 4-field composite
pub const UNKNOWN_SUBJECT: &str = "Unknown";

/// Checks whether a course belongs in the audit
///
/// A course is a candidate when its SIS id starts with the term prefix and its
/// workflow state is the target state. Everything else is dropped before any
/// probe spends rate budget on it.
pub fn is_candidate(course: &Course, config: &AuditConfig) -> bool {
    let in_term = course
        .sis_course_id
        .as_deref()
        .is_some_and(|sis| sis.starts_with(&config.term_prefix));

    in_term && course.workflow_state == config.target_state
}

/// Extracts the subject from a term-scoped SIS id
///
/// The id is a hyphen-delimited composite like `6253-FA-MATH-101`; the subject
/// is the third field. Any other shape yields "Unknown".
///
/// # Examples
///
/// ```
/// use lms_audit::audit::extract_subject;
///
/// assert_eq!(extract_subject(Some("6253-FA-MATH-101")), "MATH");
/// assert_eq!(extract_subject(Some("6253-MATH")), "Unknown");
/// assert_eq!(extract_subject(None), "Unknown");
/// ```
pub fn extract_subject(sis_course_id: Option<&str>) -> String {
    let Some(sis) = sis_course_id else {
        return UNKNOWN_SUBJECT.to_string();
    };

    let parts: Vec<&str> = sis.split('-').collect();
    if parts.len() == 4 {
        parts[2].to_string()
    } else {
        UNKNOWN_SUBJECT.to_string()
    }
}
