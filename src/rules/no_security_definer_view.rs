//! no-security-definer-view: view explicitly running as its owner
//!
//! `security_invoker = false` without `security_barrier` makes the view
//! evaluate with the owner's privileges, bypassing the caller's RLS.

use crate::parser::ir::{IrNode, Statement};
use crate::rules::{Fix, RuleContext};

pub(super) const DESCRIPTION: &str = "Views with SECURITY DEFINER can bypass RLS policies";

pub(super) const EXPLAIN: &str = "no-security-definer-view: Security definer view\n\
         \n\
         What it detects:\n\
         CREATE VIEW ... WITH (security_invoker = false) that does not also\n\
         set security_barrier = true.\n\
         \n\
         Why it matters:\n\
         A definer view reads its base tables with the view owner's rights,\n\
         so row level security on those tables does not apply to the caller.\n\
         \n\
         Example (bad):\n\
           CREATE VIEW public.orders_v WITH (security_invoker = false)\n\
             AS SELECT * FROM orders;\n\
         \n\
         Fix:\n\
           ALTER VIEW orders_v SET (security_barrier = true);\n\
           -- or prefer: ALTER VIEW orders_v SET (security_invoker = true);";

pub(super) fn check(statements: &[&Statement], ctx: &mut RuleContext<'_>) {
    for stmt in statements {
        let IrNode::CreateView(cv) = &stmt.node else {
            continue;
        };
        if !cv.option_disabled("security_invoker") || cv.option_enabled("security_barrier") {
            continue;
        }

        let view = &cv.name.name;
        ctx.report(
            stmt.span.start_line,
            format!("View \"{view}\" uses SECURITY DEFINER without SECURITY BARRIER"),
            Some(Fix::new(
                format!("Add SECURITY BARRIER to {view}"),
                format!("ALTER VIEW {view} SET (security_barrier = true);"),
            )),
        );
    }
}
