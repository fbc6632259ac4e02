//! schema/policy-without-rls: policies on a table that never enables RLS

use crate::model::SchemaModel;
use crate::rules::{ActiveRule, Diagnostic};

use super::{enable_rls_fix, report_at};

pub(crate) const DESCRIPTION: &str = "Tables with policies should have row level security enabled";

pub(crate) const EXPLAIN: &str = "schema/policy-without-rls: Policy exists, RLS disabled\n\
         \n\
         What it detects:\n\
         A known table that has one or more policies but never enables row\n\
         level security.\n\
         \n\
         Why it matters:\n\
         Policies are inert until RLS is enabled. The table looks protected\n\
         in review while every granted row stays visible.\n\
         \n\
         Example (bad):\n\
           CREATE TABLE public.posts (id bigint PRIMARY KEY, author uuid);\n\
           CREATE POLICY own ON public.posts USING (auth.uid() = author);\n\
         \n\
         Fix:\n\
           ALTER TABLE public.posts ENABLE ROW LEVEL SECURITY;\n\
         \n\
         Policies on tables the migrations never create are not reported.";

pub(crate) fn check(model: &SchemaModel, rule: &ActiveRule) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (full_name, policies) in model.policies() {
        let Some(first) = policies.first() else {
            continue;
        };
        let Some(table) = model.get_table(full_name) else {
            continue;
        };
        if table.has_row_security {
            continue;
        }
        let names: Vec<&str> = policies.iter().map(|p| p.name.as_str()).collect();
        diagnostics.push(
            report_at(
                rule,
                &first.provenance,
                format!(
                    "Table \"{full_name}\" has policies ({}) but RLS is not enabled",
                    names.join(", ")
                ),
            )
            .with_fix(enable_rls_fix(full_name)),
        );
    }
    diagnostics
}
