//! JSON output reporter
//!
//! Pretty-printed `{results, errorCount, warningCount, fixableCount}`.

use std::io::Write;

use crate::output::{ReportError, Reporter};
use crate::pipeline::LintReport;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for JsonReporter {
    fn emit(&self, report: &LintReport, out: &mut dyn Write) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| ReportError::Serialization(e.to_string()))?;
        writeln!(out, "{json}")?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_helpers::sample_report;

    fn emit_json(report: &LintReport) -> serde_json::Value {
        let mut buf = Vec::new();
        JsonReporter::new().emit(report, &mut buf).expect("emit");
        serde_json::from_slice(&buf).expect("valid JSON")
    }

    #[test]
    fn report_shape() {
        let json = emit_json(&sample_report());

        assert_eq!(json["errorCount"], 1);
        assert_eq!(json["warningCount"], 1);
        assert_eq!(json["fixableCount"], 1);
        assert_eq!(json["results"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn diagnostic_fields() {
        let json = emit_json(&sample_report());
        let first = &json["results"][0];

        assert_eq!(first["ruleId"], "no-table-without-pk");
        assert_eq!(first["severity"], "error");
        assert_eq!(first["file"], "migrations/001_init.sql");
        assert_eq!(first["line"], 3);
        assert_eq!(first["fix"]["statement"], "ALTER TABLE logs ADD PRIMARY KEY (id);");
        assert!(
            first["docsUrl"]
                .as_str()
                .is_some_and(|u| u.ends_with("0004_no_primary_key"))
        );

        let second = &json["results"][1];
        assert!(second.get("fix").is_none());
        assert!(second.get("column").is_none());
    }

    #[test]
    fn empty_report() {
        let json = emit_json(&LintReport::default());
        assert_eq!(json["results"], serde_json::json!([]));
        assert_eq!(json["errorCount"], 0);
    }
}
