//! Human-readable text output reporter
//!
//! Diagnostics are grouped by file, in the order files first appear in the
//! report, and followed by a one-line summary:
//! ```text
//! ERROR no-table-without-pk migrations/001_init.sql:3
//!   Table "logs" does not have a primary key
//!   fix: Add primary key to logs
//!
//! 1 error, 0 warnings, 1 fixable
//! ```

use std::fmt::Write as FmtWrite;
use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;

use crate::output::{ReportError, Reporter};
use crate::pipeline::LintReport;
use crate::rules::Diagnostic;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextReporter;

impl TextReporter {
    pub fn new() -> Self {
        Self
    }
}

/// Format a single diagnostic as a text block.
fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    let mut buf = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        buf,
        "{} {} {}\n  {}",
        diagnostic.severity.label(),
        diagnostic.rule_id,
        diagnostic.location(),
        diagnostic.message
    );
    if let Some(fix) = &diagnostic.fix {
        let _ = writeln!(buf, "  fix: {}", fix.description);
    }
    buf
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn summary(report: &LintReport) -> String {
    if report.is_empty() {
        return "No issues found\n".to_string();
    }
    format!(
        "{}, {}, {} fixable\n",
        plural(report.error_count, "error"),
        plural(report.warning_count, "warning"),
        report.fixable_count
    )
}

/// Format the whole report. Blocks are separated by a blank line.
pub fn format_report(report: &LintReport) -> String {
    let mut by_file: IndexMap<&Path, Vec<&Diagnostic>> = IndexMap::new();
    for diagnostic in &report.results {
        by_file
            .entry(diagnostic.file.as_path())
            .or_default()
            .push(diagnostic);
    }

    let mut output = String::new();
    for diagnostic in by_file.values().flatten() {
        output.push_str(&format_diagnostic(diagnostic));
        output.push('\n');
    }
    output.push_str(&summary(report));
    output
}

impl Reporter for TextReporter {
    fn emit(&self, report: &LintReport, out: &mut dyn Write) -> Result<(), ReportError> {
        out.write_all(format_report(report).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
