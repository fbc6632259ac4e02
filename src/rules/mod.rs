//! Rule engine and rule context
//!
//! Each rule implements the `Rule` trait. File-scoped rules look at the
//! statements of one migration file at a time; schema-scoped rules look at
//! the schema model built from every file.

use std::collections::HashMap;
use std::path::Path;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::model::SchemaModel;
use crate::parser::ir::{Statement, StatementKind};

pub mod diagnostic;
pub mod rule_id;
pub mod schema;
pub mod severity;

#[cfg(test)]
pub mod test_helpers;

mod auth_users_exposed;
mod ban_foreign_table_public;
mod ban_materialized_view_public;
mod function_search_path;
mod no_extension_in_public;
mod no_security_definer_view;
mod no_sensitive_columns;
mod no_table_without_pk;
mod rls_policy_always_true;
mod rls_references_user_metadata;

pub use diagnostic::{Diagnostic, Fix};
pub use rule_id::RuleId;
pub use severity::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, serde::Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Security,
    Performance,
    BestPractice,
    Supabase,
}

/// What a rule needs to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, serde::Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    /// One file's statements at a time.
    File,
    /// The schema model aggregated over every file.
    Schema,
}

/// A rule selected for a run, with its effective severity after config
/// overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveRule {
    pub id: RuleId,
    pub severity: Severity,
}

impl ActiveRule {
    /// The rule at its default severity.
    pub fn new(id: RuleId) -> Self {
        Self {
            id,
            severity: id.default_severity(),
        }
    }

    /// Diagnostic stamped with this rule's ID, severity and docs link.
    pub fn diagnostic(&self, message: String, file: &Path, line: Option<usize>) -> Diagnostic {
        Diagnostic::new(self.id, self.severity, message, file, line)
    }
}

/// Per-rule setting from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSetting {
    Severity(Severity),
    Off,
}

impl RuleSetting {
    /// Parse `error`, `warning`, `info` or `off`. Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("off") {
            return Some(Self::Off);
        }
        Severity::parse(s).map(Self::Severity)
    }
}

/// Context handed to file-scoped rules.
///
/// `report` stamps each diagnostic with the running rule's ID, effective
/// severity, docs link and the current file, then appends it to the run's
/// diagnostic list.
pub struct RuleContext<'a> {
    /// The file being linted.
    pub file: &'a Path,
    /// Full source text of the file.
    pub source: &'a str,
    statements: &'a [Statement],
    rule: ActiveRule,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        file: &'a Path,
        source: &'a str,
        statements: &'a [Statement],
        rule: ActiveRule,
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            file,
            source,
            statements,
            rule,
            diagnostics,
        }
    }

    /// Every statement in the file, regardless of the rule's relevant kinds.
    pub fn all_statements(&self) -> &'a [Statement] {
        self.statements
    }

    pub fn rule(&self) -> ActiveRule {
        self.rule
    }

    pub fn report(&mut self, line: usize, message: String, fix: Option<Fix>) {
        let mut diagnostic = self.rule.diagnostic(message, self.file, Some(line));
        diagnostic.fix = fix;
        self.diagnostics.push(diagnostic);
    }
}

/// Trait that every rule implements.
pub trait Rule: Send + Sync {
    /// Stable rule identifier.
    fn id(&self) -> RuleId;

    /// Short human-readable title.
    fn name(&self) -> &'static str;

    /// Default severity for this rule.
    fn default_severity(&self) -> Severity;

    /// One-line description.
    fn description(&self) -> &'static str;

    /// Detailed explanation for --explain. Includes what it detects, an
    /// example and the fix.
    fn explain(&self) -> &'static str;

    fn category(&self) -> Category;

    fn scope(&self) -> RuleScope;

    fn docs_url(&self) -> Option<&'static str>;

    /// Statement kinds a file-scoped rule inspects. A file with none of them
    /// skips the rule entirely.
    fn relevant_kinds(&self) -> &'static [StatementKind];

    /// Run a file-scoped rule. `statements` holds the file's statements of
    /// the relevant kinds, in source order.
    fn check_file(&self, statements: &[&Statement], ctx: &mut RuleContext<'_>);

    /// Run a schema-scoped rule once against the complete model.
    fn check_schema(&self, model: &SchemaModel, rule: &ActiveRule) -> Vec<Diagnostic>;
}

/// Registry of all rules.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create a new empty rule registry.
    pub fn new() -> Self {
        Self { rules: vec![] }
    }

    /// Register all built-in rules, in declaration order.
    pub fn register_defaults(&mut self) {
        RuleId::iter().for_each(|r| self.register(Box::new(r)));
    }

    /// Register a single rule.
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Get a rule by typed ID.
    pub fn get_by_id(&self, id: RuleId) -> Option<&dyn Rule> {
        self.rules.iter().find(|r| r.id() == id).map(|b| &**b)
    }

    /// Iterate all rules.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|b| &**b)
    }

    /// Rules of `scope` that are not turned off, with overrides applied.
    pub fn active(
        &self,
        scope: RuleScope,
        overrides: &HashMap<RuleId, RuleSetting>,
    ) -> Vec<ActiveRule> {
        self.iter()
            .filter(|r| r.scope() == scope)
            .filter_map(|r| match overrides.get(&r.id()) {
                Some(RuleSetting::Off) => None,
                Some(RuleSetting::Severity(severity)) => Some(ActiveRule {
                    id: r.id(),
                    severity: *severity,
                }),
                None => Some(ActiveRule {
                    id: r.id(),
                    severity: r.default_severity(),
                }),
            })
            .collect()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
