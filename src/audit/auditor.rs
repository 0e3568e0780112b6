//! Course auditor - the per-course probe pipeline
//!
//! This module turns the account's course catalog into report rows:
//! - Listing the catalog (the only step whose failure aborts the run)
//! - Selecting unpublished courses of the target term
//! - Running the modules, front page, assignments and faculty probes
//! - Degrading each failed probe to an error sentinel without touching the others

use crate::audit::outcome::{FacultyOutcome, ProbeOutcome};
use crate::audit::selection::{extract_subject, is_candidate};
use crate::audit::stats::{AuditStats, Probe};
use crate::client::{HttpFetcher, Paginator};
use crate::config::AuditConfig;
use crate::lms::{endpoints, AssignmentEntry, Course, FrontPage, ModuleEntry, Teacher};
use crate::report::ReportRow;
use crate::AuditError;
use serde::de::DeserializeOwned;

/// Outcomes of every probe for one course
#[derive(Debug, Clone, PartialEq)]
pub struct CourseFindings {
    pub modules: ProbeOutcome,
    pub front_page: ProbeOutcome,
    pub assignments: ProbeOutcome,
    pub faculty: FacultyOutcome,
}

impl CourseFindings {
    /// Probes that failed for this course
    pub fn failed_probes(&self) -> Vec<Probe> {
        let mut failed = Vec::new();
        if self.modules.is_error() {
            failed.push(Probe::Modules);
        }
        if self.front_page.is_error() {
            failed.push(Probe::FrontPage);
        }
        if self.assignments.is_error() {
            failed.push(Probe::Assignments);
        }
        if self.faculty.is_error() {
            failed.push(Probe::Faculty);
        }
        failed
    }
}

/// Assembles the report row for a course from its probe findings
pub fn build_row(course: &Course, findings: &CourseFindings) -> ReportRow {
    let (faculty_names, faculty_emails) = findings.faculty.columns();

    ReportRow {
        course_id: course.id,
        course_name: course.name.clone(),
        subject: extract_subject(course.sis_course_id.as_deref()),
        with_modules: findings.modules,
        with_assignments: findings.assignments,
        with_front_page: findings.front_page,
        faculty_names,
        faculty_emails,
    }
}

/// Rows and statistics of a completed audit
#[derive(Debug, Clone)]
pub struct AuditReport {
    pub rows: Vec<ReportRow>,
    pub stats: AuditStats,
}

/// Audits an account's courses through a shared, rate-governed fetcher
pub struct CourseAuditor<'a> {
    fetcher: &'a HttpFetcher,
    paginator: Paginator<'a>,
    config: &'a AuditConfig,
}

impl<'a> CourseAuditor<'a> {
    /// Creates an auditor
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The fetcher every probe goes through
    /// * `config` - Course selection and probe settings
    pub fn new(fetcher: &'a HttpFetcher, config: &'a AuditConfig) -> Self {
        Self {
            fetcher,
            paginator: Paginator::new(fetcher),
            config,
        }
    }

    /// Runs the complete audit
    ///
    /// Courses are processed one at a time; a failed probe only degrades its
    /// own field.
    ///
    /// # Returns
    ///
    /// * `Ok(AuditReport)` - One row per selected course, in catalog order
    /// * `Err(AuditError)` - The course catalog could not be listed
    pub async fn run(&self) -> Result<AuditReport, AuditError> {
        let mut stats = AuditStats::new();

        let courses = self.list_courses().await?;
        stats.courses_listed = courses.len();

        let selected = self.select(courses);
        stats.courses_selected = selected.len();
        tracing::info!(
            "{} of {} courses are {} in term {}",
            selected.len(),
            stats.courses_listed,
            self.config.target_state,
            self.config.term_prefix
        );

        let mut rows = Vec::with_capacity(selected.len());
        for (index, course) in selected.iter().enumerate() {
            tracing::info!(
                "Auditing course {} ({}) [{}/{}]",
                course.name,
                course.id,
                index + 1,
                selected.len()
            );

            let findings = self.probe_course(course).await;
            for probe in findings.failed_probes() {
                stats.record_probe_error(probe);
            }
            rows.push(build_row(course, &findings));
        }

        stats.rows = rows.len();
        stats.finish(&self.fetcher.governor().await);

        Ok(AuditReport { rows, stats })
    }

    /// Lists every course of the account matching the search term
    pub async fn list_courses(&self) -> Result<Vec<Course>, AuditError> {
        let path = endpoints::account_courses(
            self.config.account_id,
            self.config.effective_search_term(),
            self.config.page_size,
        );

        let courses: Vec<Course> = self.paginator.collect_all(&path).await?;
        tracing::info!(
            "Listed {} courses for account {}",
            courses.len(),
            self.config.account_id
        );
        Ok(courses)
    }

    /// Keeps only the courses that need auditing, preserving order
    pub fn select(&self, courses: Vec<Course>) -> Vec<Course> {
        courses
            .into_iter()
            .filter(|course| is_candidate(course, self.config))
            .collect()
    }

    /// Runs every probe for a course
    pub async fn probe_course(&self, course: &Course) -> CourseFindings {
        let modules = self.probe_modules(course.id).await;
        let front_page = self.probe_front_page(course).await;
        let assignments = self.probe_assignments(course.id).await;
        let faculty = self.probe_faculty(course.id).await;

        CourseFindings {
            modules,
            front_page,
            assignments,
            faculty,
        }
    }

    async fn probe_modules(&self, course_id: u64) -> ProbeOutcome {
        let path = endpoints::course_modules(course_id, self.config.page_size);
        match self.has_any::<ModuleEntry>(&path, |_| true).await {
            Ok(present) => ProbeOutcome::from_presence(present),
            Err(e) => {
                tracing::warn!("Modules probe failed for course {}: {}", course_id, e);
                ProbeOutcome::Error
            }
        }
    }

    async fn probe_assignments(&self, course_id: u64) -> ProbeOutcome {
        let path = endpoints::course_assignments(course_id, self.config.page_size);
        let published_only = self.config.published_assignments_only;

        let result = self
            .has_any::<AssignmentEntry>(&path, |a| !published_only || a.is_published())
            .await;
        match result {
            Ok(present) => ProbeOutcome::from_presence(present),
            Err(e) => {
                tracing::warn!("Assignments probe failed for course {}: {}", course_id, e);
                ProbeOutcome::Error
            }
        }
    }

    /// Probes the front page, but only for courses that land on it
    async fn probe_front_page(&self, course: &Course) -> ProbeOutcome {
        if course.default_view.as_deref() != Some(self.config.front_page_view.as_str()) {
            return ProbeOutcome::default();
        }

        match self.fetch_front_page(course.id).await {
            Ok(page) => ProbeOutcome::from_presence(page.has_content()),
            Err(e) => {
                tracing::warn!("Front page probe failed for course {}: {}", course.id, e);
                ProbeOutcome::Error
            }
        }
    }

    async fn fetch_front_page(&self, course_id: u64) -> Result<FrontPage, AuditError> {
        let response = self
            .fetcher
            .get(&endpoints::course_front_page(course_id))
            .await?;

        if !response.is_success() {
            return Err(AuditError::UnexpectedStatus {
                url: response.url.to_string(),
                status: response.status.as_u16(),
            });
        }

        response.json()
    }

    async fn probe_faculty(&self, course_id: u64) -> FacultyOutcome {
        let path = endpoints::course_teachers(course_id, self.config.page_size);
        match self.paginator.collect_all::<Teacher>(&path).await {
            Ok(teachers) => FacultyOutcome::from_teachers(teachers),
            Err(e) => {
                tracing::warn!("Faculty probe failed for course {}: {}", course_id, e);
                FacultyOutcome::Error
            }
        }
    }

    /// Walks a collection until an item qualifies
    ///
    /// Pages are fetched lazily, so a course whose first page already holds a
    /// qualifying item costs a single request, while courses with larger
    /// collections are never reported empty from the first page alone.
    async fn has_any<T: DeserializeOwned>(
        &self,
        start: &str,
        qualifies: impl Fn(&T) -> bool,
    ) -> Result<bool, AuditError> {
        let mut pages = self.paginator.pages::<T>(start);
        while let Some(page) = pages.next_page().await {
            if page?.iter().any(&qualifies) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
