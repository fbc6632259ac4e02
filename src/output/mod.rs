//! Output reporters
//!
//! Text output for terminals and JSON output for tooling. Both write the
//! whole [`LintReport`] to a caller-supplied writer.

use std::io::Write;

use thiserror::Error;

use crate::pipeline::LintReport;

pub mod json;
pub mod text;

pub use json::JsonReporter;
pub use text::TextReporter;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error writing report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Trait for output format reporters.
pub trait Reporter {
    fn emit(&self, report: &LintReport, out: &mut dyn Write) -> Result<(), ReportError>;
}

/// Output format selected on the command line or in configuration.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    serde::Deserialize,
    serde::Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
    clap::ValueEnum,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn reporter(self) -> Box<dyn Reporter> {
        match self {
            OutputFormat::Text => Box::new(TextReporter::new()),
            OutputFormat::Json => Box::new(JsonReporter::new()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use std::path::Path;

    use crate::pipeline::LintReport;
    use crate::rules::{ActiveRule, Fix, RuleId};

    /// Report with one fixable error and one plain warning in two files.
    pub fn sample_report() -> LintReport {
        LintReport::new(vec![
            ActiveRule::new(RuleId::NoTableWithoutPk)
                .diagnostic(
                    "Table \"logs\" does not have a primary key".to_string(),
                    Path::new("migrations/001_init.sql"),
                    Some(3),
                )
                .with_fix(Fix::new(
                    "Add primary key to logs",
                    "ALTER TABLE logs ADD PRIMARY KEY (id);",
                )),
            ActiveRule::new(RuleId::RlsWithoutPolicy).diagnostic(
                "Table \"public.notes\" has RLS enabled but no policies (blocks all access)"
                    .to_string(),
                Path::new("migrations/002_notes.sql"),
                Some(1),
            ),
        ])
    }
}
