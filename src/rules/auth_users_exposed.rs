//! auth-users-exposed: public view over the `auth.users` identity table
//!
//! Views are checked for `security_invoker`; materialized views cannot be
//! protected at all, so any reference fires.

use crate::heuristics::references_auth_users;
use crate::parser::ir::{IrNode, Statement};
use crate::rules::{Fix, RuleContext};

pub(super) const DESCRIPTION: &str =
    "Views or materialized views should not expose auth.users data";

pub(super) const EXPLAIN: &str = "auth-users-exposed: auth.users exposed\n\
         \n\
         What it detects:\n\
         A view in the public schema whose definition references auth.users\n\
         and that is not security_invoker, and any materialized view in the\n\
         public schema that references auth.users.\n\
         \n\
         Why it matters:\n\
         auth.users holds emails, phone numbers and login metadata. A view in\n\
         an exposed schema that runs with its owner's rights hands that data\n\
         to any API client. Materialized views do not support RLS at all.\n\
         \n\
         Example (bad):\n\
           CREATE VIEW public.members AS SELECT id, email FROM auth.users;\n\
         \n\
         Fix:\n\
           ALTER VIEW public.members SET (security_invoker = true);";

pub(super) fn check(statements: &[&Statement], ctx: &mut RuleContext<'_>) {
    for stmt in statements {
        match &stmt.node {
            IrNode::CreateView(cv) => {
                if !cv.name.is_public()
                    || !references_auth_users(&stmt.raw_sql)
                    || cv.option_enabled("security_invoker")
                {
                    continue;
                }
                let view = &cv.name.name;
                let schema = cv.name.schema_or_default();
                ctx.report(
                    stmt.span.start_line,
                    format!("View \"{view}\" in public schema exposes auth.users data"),
                    Some(Fix::new(
                        "Make view security invoker",
                        format!("ALTER VIEW {schema}.{view} SET (security_invoker = true);"),
                    )),
                );
            }
            IrNode::CreateMaterializedView(mv) => {
                if !mv.name.is_public() || !references_auth_users(&stmt.raw_sql) {
                    continue;
                }
                ctx.report(
                    stmt.span.start_line,
                    format!(
                        "Materialized view \"{}\" exposes auth.users data (no RLS support)",
                        mv.name.name
                    ),
                    None,
                );
            }
            _ => {}
        }
    }
}
