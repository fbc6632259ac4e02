//! function-search-path: `SECURITY DEFINER` function with a mutable search_path

use crate::parser::ir::{IrNode, Statement};
use crate::rules::{Fix, RuleContext};

pub(super) const DESCRIPTION: &str =
    "Functions should set search_path to prevent search path injection attacks";

pub(super) const EXPLAIN: &str = "function-search-path: Function search path mutable\n\
         \n\
         What it detects:\n\
         CREATE FUNCTION ... SECURITY DEFINER without a SET search_path\n\
         clause.\n\
         \n\
         Why it matters:\n\
         A definer function runs with its owner's privileges but resolves\n\
         unqualified names through the caller's search_path. A caller who\n\
         can create objects earlier on that path can hijack the function.\n\
         \n\
         Example (bad):\n\
           CREATE FUNCTION private.is_admin() RETURNS boolean\n\
             LANGUAGE sql SECURITY DEFINER AS $$ SELECT ... $$;\n\
         \n\
         Fix:\n\
           CREATE FUNCTION private.is_admin() RETURNS boolean\n\
             LANGUAGE sql SECURITY DEFINER SET search_path = ''\n\
             AS $$ SELECT ... $$;";

pub(super) fn check(statements: &[&Statement], ctx: &mut RuleContext<'_>) {
    for stmt in statements {
        let IrNode::CreateFunction(cf) = &stmt.node else {
            continue;
        };
        if !cf.security_definer || cf.sets_search_path {
            continue;
        }

        let name = &cf.name;
        ctx.report(
            stmt.span.start_line,
            format!("Function \"{name}\" is SECURITY DEFINER but does not set search_path"),
            Some(Fix::new(
                format!("Set search_path for {name}"),
                "-- Add to function definition:\nSET search_path = ''",
            )),
        );
    }
}
