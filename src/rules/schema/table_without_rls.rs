//! schema/table-without-rls: public table that never enables RLS

use crate::model::SchemaModel;
use crate::parser::ir::DEFAULT_SCHEMA;
use crate::rules::{ActiveRule, Diagnostic};

use super::{enable_rls_fix, report_at};

pub(crate) const DESCRIPTION: &str = "Public tables should have row level security enabled";

pub(crate) const EXPLAIN: &str = "schema/table-without-rls: RLS disabled in public\n\
         \n\
         What it detects:\n\
         A table in the public schema that has no ENABLE ROW LEVEL SECURITY\n\
         anywhere in the migration history.\n\
         \n\
         Why it matters:\n\
         Tables in public are reachable through the API with the anon and\n\
         authenticated roles. Without RLS every granted row is readable and\n\
         writable by anyone holding the public API key.\n\
         \n\
         Example (bad):\n\
           CREATE TABLE public.notes (id bigint PRIMARY KEY, body text);\n\
         \n\
         Fix:\n\
           ALTER TABLE public.notes ENABLE ROW LEVEL SECURITY;\n\
         \n\
         The check sees the whole history, so enabling RLS in a later\n\
         migration clears the finding.";

pub(crate) fn check(model: &SchemaModel, rule: &ActiveRule) -> Vec<Diagnostic> {
    model
        .tables()
        .filter(|(_, t)| t.schema == DEFAULT_SCHEMA && !t.has_row_security)
        .map(|(full_name, t)| {
            report_at(
                rule,
                &t.provenance,
                format!("Table \"{full_name}\" does not have RLS enabled"),
            )
            .with_fix(enable_rls_fix(full_name))
        })
        .collect()
}
