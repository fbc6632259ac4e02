//! schemalint: static analyzer for PostgreSQL migration scripts
//!
//! This library parses migration files once into a shared cache, orders them
//! as migrations, runs file-scoped rules per file and, in schema mode, builds
//! a schema model from the whole history to run schema-scoped rules against.
//! Findings can be suppressed inline or through an ignore file, and fixable
//! findings can be turned into statements appended to the affected files.

pub mod cache;
pub mod config;
pub mod fix;
pub mod heuristics;
pub mod ignore;
pub mod input;
pub mod line_index;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod rules;
pub mod suppress;

// Re-export commonly used types
pub use cache::{CachedFile, StatementCache};
pub use config::Config;
pub use model::SchemaModel;
pub use parser::ir::{IrNode, Statement};
pub use pipeline::{LintMode, LintOptions, LintPipeline, LintReport};
pub use rules::{Diagnostic, Fix, Rule, RuleId, RuleRegistry, Severity};
