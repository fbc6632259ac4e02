//! Shared test helpers for rule unit tests.

use std::path::Path;

use crate::line_index::LineIndex;
use crate::parser::pg_query::parse_sql;
use crate::rules::{ActiveRule, Diagnostic, Rule, RuleContext, RuleId};

/// Parse `sql` and run one file-scoped rule over it at its default
/// severity, the way the pipeline does: only statements of the rule's
/// relevant kinds are passed in.
pub fn run_file_rule(id: RuleId, sql: &str) -> Vec<Diagnostic> {
    let statements = parse_sql(sql, &LineIndex::new(sql)).expect("valid SQL");
    let relevant: Vec<_> = statements
        .iter()
        .filter(|s| id.relevant_kinds().contains(&s.kind()))
        .collect();

    let mut diagnostics = Vec::new();
    let mut ctx = RuleContext::new(
        Path::new("migrations/001.sql"),
        sql,
        &statements,
        ActiveRule::new(id),
        &mut diagnostics,
    );
    id.check_file(&relevant, &mut ctx);
    diagnostics
}

/// Messages only, for compact assertions.
pub fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.message.as_str()).collect()
}
