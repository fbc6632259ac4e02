//! rls-references-user-metadata: policy trusting user-editable JWT metadata

use crate::heuristics::references_user_metadata;
use crate::parser::ir::{IrNode, Statement};
use crate::rules::RuleContext;

pub(super) const DESCRIPTION: &str =
    "RLS policies should not reference user_metadata, which end users can modify";

pub(super) const EXPLAIN: &str = "rls-references-user-metadata: RLS references user metadata\n\
         \n\
         What it detects:\n\
         A policy whose text reads user_metadata from auth.jwt() or the\n\
         request.jwt.claims setting, or raw_user_meta_data from auth.users.\n\
         \n\
         Why it matters:\n\
         User metadata is writable by the signed-in user through the auth\n\
         API. A policy that grants access based on it lets users grant\n\
         themselves that access.\n\
         \n\
         Example (bad):\n\
           CREATE POLICY admins ON reports\n\
             USING ((auth.jwt() -> 'user_metadata' ->> 'role') = 'admin');\n\
         \n\
         Fix:\n\
           CREATE POLICY admins ON reports\n\
             USING ((auth.jwt() -> 'app_metadata' ->> 'role') = 'admin');";

pub(super) fn check(statements: &[&Statement], ctx: &mut RuleContext<'_>) {
    for stmt in statements {
        let IrNode::CreatePolicy(cp) = &stmt.node else {
            continue;
        };
        if !references_user_metadata(&stmt.raw_sql) {
            continue;
        }
        ctx.report(
            stmt.span.start_line,
            format!(
                "Policy \"{}\" on \"{}\" references user_metadata which is editable by end users",
                cp.name,
                cp.table.full_name()
            ),
            None,
        );
    }
}
