//! CSV report generation
//!
//! Fields are quoted only when they contain a comma, a double quote or a line
//! break; embedded quotes are doubled.

use crate::report::{ReportError, ReportResult, ReportRow};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Header row of the report
pub const REPORT_HEADER: [&str; 8] = [
    "course_id",
    "course_name",
    "subject",
    "with_modules",
    "with_assignments",
    "with_front_page",
    "faculty_name",
    "faculty_email",
];

/// Writes the report to `output_path`, creating parent directories as needed
///
/// # Arguments
///
/// * `rows` - The audited course rows
/// * `output_path` - Path of the CSV file (truncated if it exists)
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(ReportError)` - Failed to create the directory or write the file
pub fn write_report(rows: &[ReportRow], output_path: &Path) -> ReportResult<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let csv = format_report(rows);
    let write_err = |source| ReportError::Write {
        path: output_path.display().to_string(),
        source,
    };

    let mut file = File::create(output_path).map_err(write_err)?;
    file.write_all(csv.as_bytes()).map_err(write_err)?;
    file.flush().map_err(write_err)?;

    Ok(())
}

/// Formats rows as CSV text, header first
pub fn format_report(rows: &[ReportRow]) -> String {
    let mut csv = String::new();

    push_record(&mut csv, REPORT_HEADER.iter().copied());
    for row in rows {
        push_record(&mut csv, row.to_record().iter().map(String::as_str));
    }

    csv
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push('\n');
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
