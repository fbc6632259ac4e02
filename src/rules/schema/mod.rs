//! Schema-scoped rules
//!
//! These run once per invocation against the [`SchemaModel`] folded from
//! every migration file. Each diagnostic points at the provenance of the
//! object it is about, so suppressions in that file still apply.

use crate::model::Provenance;
use crate::rules::{ActiveRule, Diagnostic, Fix};

pub(crate) mod duplicate_index;
pub(crate) mod fk_without_index;
pub(crate) mod multiple_permissive_policies;
pub(crate) mod policy_without_rls;
pub(crate) mod rls_without_policy;
pub(crate) mod table_without_rls;

/// Diagnostic located at the declaration of a model object.
fn report_at(rule: &ActiveRule, provenance: &Provenance, message: String) -> Diagnostic {
    rule.diagnostic(message, &provenance.file, Some(provenance.line))
}

fn enable_rls_fix(full_name: &str) -> Fix {
    Fix::new(
        format!("Enable RLS on {full_name}"),
        format!("ALTER TABLE {full_name} ENABLE ROW LEVEL SECURITY;"),
    )
}
