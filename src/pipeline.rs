//! Lint pipeline: parse, order, dispatch rules, filter, report.
//!
//! [`LintPipeline`] owns the rule registry and a [`StatementCache`]. A run
//! sorts the files into migration order, runs the file-scoped rules on each
//! file and, in schema mode, folds every file into a [`SchemaModel`] and
//! runs the schema-scoped rules once against it. Diagnostics then pass
//! through the ignore list, inline directives and the object-name heuristic.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::cache::{CachedFile, DEFAULT_BATCH_WIDTH, StatementCache};
use crate::ignore::{IgnoreEntry, is_ignored};
use crate::input::{LoadError, collect_migration_files, migration_cmp};
use crate::model::{SchemaModel, replay};
use crate::parser::ir::{Statement, StatementKind};
use crate::rules::{
    ActiveRule, Diagnostic, RuleContext, RuleId, RuleRegistry, RuleScope, RuleSetting, Severity,
};
use crate::suppress::suppressed_by_object_name;

/// Which rule scopes a run executes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Deserialize, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LintMode {
    /// File-scoped rules only. No schema model is built.
    #[default]
    File,
    /// File-scoped rules, then schema-scoped rules over the whole history.
    Schema,
}

/// Settings for one [`LintPipeline`].
#[derive(Debug, Clone)]
pub struct LintOptions {
    pub mode: LintMode,
    /// Files parsed concurrently per batch.
    pub batch_width: usize,
    /// Per-rule severity overrides; `Off` rules never run.
    pub overrides: HashMap<RuleId, RuleSetting>,
    pub ignore: Vec<IgnoreEntry>,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            mode: LintMode::File,
            batch_width: DEFAULT_BATCH_WIDTH,
            overrides: HashMap::new(),
            ignore: Vec::new(),
        }
    }
}

/// Result of a lint run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintReport {
    pub results: Vec<Diagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
    pub fixable_count: usize,
}

impl LintReport {
    pub fn new(results: Vec<Diagnostic>) -> Self {
        let count = |s: Severity| results.iter().filter(|d| d.severity == s).count();
        let error_count = count(Severity::Error);
        let warning_count = count(Severity::Warning);
        let fixable_count = results.iter().filter(|d| d.fix.is_some()).count();
        Self {
            results,
            error_count,
            warning_count,
            fixable_count,
        }
    }

    /// Whether any diagnostic is at or above `threshold`.
    pub fn has_findings_at(&self, threshold: Severity) -> bool {
        self.results.iter().any(|d| d.severity >= threshold)
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

pub struct LintPipeline {
    registry: RuleRegistry,
    cache: Arc<StatementCache>,
    options: LintOptions,
}

impl LintPipeline {
    /// Pipeline with every built-in rule and a fresh cache.
    pub fn new(options: LintOptions) -> Self {
        Self::with_cache(options, Arc::new(StatementCache::new()))
    }

    /// Pipeline sharing an existing cache, e.g. across watch-mode runs.
    pub fn with_cache(options: LintOptions, cache: Arc<StatementCache>) -> Self {
        let mut registry = RuleRegistry::new();
        registry.register_defaults();
        Self {
            registry,
            cache,
            options,
        }
    }

    pub fn cache(&self) -> &StatementCache {
        &self.cache
    }

    pub fn options(&self) -> &LintOptions {
        &self.options
    }

    /// Expand `paths` into migration files, parse them and lint.
    pub fn lint_paths(&self, paths: &[PathBuf]) -> Result<LintReport, LoadError> {
        let files = collect_migration_files(paths)?;
        tracing::debug!(files = files.len(), mode = %self.options.mode, "linting migrations");
        let parsed = self.cache.parse_files(&files, self.options.batch_width)?;
        Ok(self.lint_files(parsed))
    }

    /// Lint in-memory sources. Paths only name the files; nothing is read
    /// from disk.
    pub fn lint_sources<I, P, S>(&self, sources: I) -> Result<LintReport, LoadError>
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: Into<String>,
    {
        let parsed = sources
            .into_iter()
            .map(|(path, content)| {
                let path: PathBuf = path.into();
                self.cache.get_or_parse_source(&path, content)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.lint_files(parsed))
    }

    /// Lint already parsed files. They are put into migration order first.
    pub fn lint_files(&self, mut files: Vec<Arc<CachedFile>>) -> LintReport {
        files.sort_by(|a, b| migration_cmp(&a.path, &b.path));

        let file_rules = self
            .registry
            .active(RuleScope::File, &self.options.overrides);
        let mut results = Vec::new();

        for file in &files {
            let mut diagnostics = Vec::new();
            self.run_file_rules(file, &file_rules, &mut diagnostics);
            results.extend(
                diagnostics
                    .into_iter()
                    .filter(|d| self.is_reported(d, Some(file))),
            );
        }

        if self.options.mode == LintMode::Schema {
            let model = build_model(&files);
            let by_path: HashMap<&Path, &CachedFile> = files
                .iter()
                .map(|f| (f.path.as_path(), f.as_ref()))
                .collect();

            for active in self
                .registry
                .active(RuleScope::Schema, &self.options.overrides)
            {
                let Some(rule) = self.registry.get_by_id(active.id) else {
                    continue;
                };
                for diagnostic in rule.check_schema(&model, &active) {
                    let file = by_path.get(diagnostic.file.as_path()).copied();
                    if self.is_reported(&diagnostic, file) {
                        results.push(diagnostic);
                    }
                }
            }
        }

        LintReport::new(results)
    }

    fn run_file_rules(&self, file: &CachedFile, rules: &[ActiveRule], out: &mut Vec<Diagnostic>) {
        let mut by_kind: BTreeMap<StatementKind, Vec<&Statement>> = BTreeMap::new();
        for stmt in &file.statements {
            by_kind.entry(stmt.kind()).or_default().push(stmt);
        }

        for &active in rules {
            let Some(rule) = self.registry.get_by_id(active.id) else {
                continue;
            };
            let mut relevant: Vec<&Statement> = rule
                .relevant_kinds()
                .iter()
                .filter_map(|kind| by_kind.get(kind))
                .flatten()
                .copied()
                .collect();
            if relevant.is_empty() {
                continue;
            }
            relevant.sort_by_key(|s| s.span.start_offset);

            let mut ctx = RuleContext::new(&file.path, &file.content, &file.statements, active, out);
            rule.check_file(&relevant, &mut ctx);
        }
    }

    /// Ignore list first, then the file's own directives. Diagnostics whose
    /// file is not part of the run only go through the ignore list.
    fn is_reported(&self, diagnostic: &Diagnostic, file: Option<&CachedFile>) -> bool {
        let rule_id = diagnostic.rule_id.as_str();
        if is_ignored(&self.options.ignore, rule_id, &diagnostic.file, diagnostic.line) {
            return false;
        }
        let Some(file) = file else {
            return true;
        };
        !(file.suppressions.is_suppressed(rule_id, diagnostic.line)
            || suppressed_by_object_name(&file.content, rule_id, &diagnostic.message))
    }
}

impl Default for LintPipeline {
    fn default() -> Self {
        Self::new(LintOptions::default())
    }
}

/// Fold every file, in order, into one schema model.
pub fn build_model(files: &[Arc<CachedFile>]) -> SchemaModel {
    let mut model = SchemaModel::new();
    for file in files {
        replay::apply(&mut model, &file.statements, &file.path);
    }
    tracing::debug!(
        tables = model.tables().count(),
        indexes = model.indexes().map(|(_, list)| list.len()).sum::<usize>(),
        policies = model.policies().map(|(_, list)| list.len()).sum::<usize>(),
        "built schema model"
    );
    model
}
