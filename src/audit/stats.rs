//! Run statistics for an audit
//!
//! Collected while the audit runs and printed once it completes.

use crate::client::RateGovernor;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

/// The per-course probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Probe {
    Modules,
    FrontPage,
    Assignments,
    Faculty,
}

impl Probe {
    /// All probes, in the order they run for a course
    pub const ALL: [Probe; 4] = [
        Probe::Modules,
        Probe::FrontPage,
        Probe::Assignments,
        Probe::Faculty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Modules => "modules",
            Self::FrontPage => "front page",
            Self::Assignments => "assignments",
            Self::Faculty => "faculty",
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit run statistics summary
#[derive(Debug, Clone)]
pub struct AuditStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Courses returned by the catalog search
    pub courses_listed: usize,

    /// Courses that matched the term prefix and target state
    pub courses_selected: usize,

    /// Report rows produced
    pub rows: usize,

    /// Failed probes by kind
    pub probe_errors: HashMap<Probe, u64>,

    /// Rate governor counters at the end of the run
    pub requests_admitted: u64,
    pub requests_observed: u64,
    pub requests_without_response: u64,
    pub remaining_quota: f64,
    pub max_quota: u32,
    pub average_cost: f64,
}

impl AuditStats {
    /// Starts a new run
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            courses_listed: 0,
            courses_selected: 0,
            rows: 0,
            probe_errors: HashMap::new(),
            requests_admitted: 0,
            requests_observed: 0,
            requests_without_response: 0,
            remaining_quota: 0.0,
            max_quota: 0,
            average_cost: 0.0,
        }
    }

    /// Counts one failed probe
    pub fn record_probe_error(&mut self, probe: Probe) {
        *self.probe_errors.entry(probe).or_insert(0) += 1;
    }

    /// Failed probes of one kind
    pub fn probe_error_count(&self, probe: Probe) -> u64 {
        self.probe_errors.get(&probe).copied().unwrap_or(0)
    }

    /// Failed probes of all kinds
    pub fn total_probe_errors(&self) -> u64 {
        self.probe_errors.values().sum()
    }

    /// Marks the run finished and captures the governor counters
    pub fn finish(&mut self, governor: &RateGovernor) {
        self.finished_at = Some(Utc::now());
        self.requests_admitted = governor.admitted_count();
        self.requests_observed = governor.observed_count();
        self.requests_without_response = governor.no_signal_count();
        self.remaining_quota = governor.state().remaining_quota;
        self.max_quota = governor.state().max_quota;
        self.average_cost = governor.state().average_cost;
    }

    /// Run duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

impl Default for AuditStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints audit statistics to stdout
pub fn print_statistics(stats: &AuditStats) {
    println!("=== Audit Statistics ===\n");

    println!("Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = stats.duration_seconds() {
        println!(
            "Duration: {} seconds ({:.2} minutes)",
            duration,
            duration as f64 / 60.0
        );
    }

    println!("\nCourses:");
    println!("  Listed: {}", stats.courses_listed);
    println!("  Selected: {}", stats.courses_selected);
    println!("  Reported: {}", stats.rows);

    if stats.total_probe_errors() > 0 {
        println!("\nProbe Errors:");
        for probe in Probe::ALL {
            let count = stats.probe_error_count(probe);
            if count > 0 {
                println!("  {}: {}", probe, count);
            }
        }
    }

    println!("\nRate Limit:");
    println!("  Requests admitted: {}", stats.requests_admitted);
    println!("  Responses observed: {}", stats.requests_observed);
    if stats.requests_without_response > 0 {
        println!(
            "  Requests without response: {}",
            stats.requests_without_response
        );
    }
    println!(
        "  Quota remaining: {:.1}/{}",
        stats.remaining_quota, stats.max_quota
    );
    println!("  Average request cost: {:.3}", stats.average_cost);
}
