//! schema/rls-without-policy: RLS enabled but nothing granted

use crate::model::SchemaModel;
use crate::rules::{ActiveRule, Diagnostic};

use super::report_at;

pub(crate) const DESCRIPTION: &str = "Tables with RLS enabled should have at least one policy";

pub(crate) const EXPLAIN: &str = "schema/rls-without-policy: RLS enabled, no policy\n\
         \n\
         What it detects:\n\
         A table with row level security enabled and no policy attached to\n\
         it anywhere in the migration history.\n\
         \n\
         Why it matters:\n\
         With RLS on and no policy, every non-owner query sees zero rows and\n\
         every write is rejected. This is usually an unfinished migration.\n\
         \n\
         Example (bad):\n\
           ALTER TABLE public.profiles ENABLE ROW LEVEL SECURITY;\n\
         \n\
         Fix:\n\
           CREATE POLICY read_own ON public.profiles FOR SELECT\n\
             USING (auth.uid() = id);";

pub(crate) fn check(model: &SchemaModel, rule: &ActiveRule) -> Vec<Diagnostic> {
    model
        .tables()
        .filter(|(full_name, t)| t.has_row_security && model.policies_on(full_name).is_empty())
        .map(|(full_name, t)| {
            report_at(
                rule,
                &t.provenance,
                format!("Table \"{full_name}\" has RLS enabled but no policies (blocks all access)"),
            )
        })
        .collect()
}
