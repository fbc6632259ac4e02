//! ban-foreign-table-public: foreign table in `public`

use crate::parser::ir::{IrNode, Statement};
use crate::rules::RuleContext;

pub(super) const DESCRIPTION: &str =
    "Foreign tables in public schema are exposed via API and do not support RLS";

pub(super) const EXPLAIN: &str = "ban-foreign-table-public: Foreign table in public schema\n\
         \n\
         What it detects:\n\
         CREATE FOREIGN TABLE in the public schema.\n\
         \n\
         Why it matters:\n\
         Foreign tables are served by the API but row level security cannot\n\
         be enabled on them, so access control depends on grants alone.\n\
         \n\
         Example (bad):\n\
           CREATE FOREIGN TABLE remote_orders (id int) SERVER billing;\n\
         \n\
         Fix:\n\
           CREATE FOREIGN TABLE private.remote_orders (id int) SERVER billing;";

pub(super) fn check(statements: &[&Statement], ctx: &mut RuleContext<'_>) {
    for stmt in statements {
        let IrNode::CreateForeignTable(ft) = &stmt.node else {
            continue;
        };
        if !ft.name.is_public() {
            continue;
        }
        ctx.report(
            stmt.span.start_line,
            format!(
                "Foreign table \"{}\" in public schema is exposed via API and does not support RLS",
                ft.name.name
            ),
            None,
        );
    }
}
