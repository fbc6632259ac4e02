//! ban-materialized-view-public: materialized view in `public`

use crate::parser::ir::{IrNode, Statement};
use crate::rules::RuleContext;

pub(super) const DESCRIPTION: &str =
    "Materialized views in public schema are exposed via API and do not support RLS";

pub(super) const EXPLAIN: &str = "ban-materialized-view-public: Materialized view in public schema\n\
         \n\
         What it detects:\n\
         CREATE MATERIALIZED VIEW in the public schema.\n\
         \n\
         Why it matters:\n\
         Materialized views are served by the API like tables but cannot\n\
         have row level security. Every row is visible to every caller with\n\
         SELECT on the view.\n\
         \n\
         Example (bad):\n\
           CREATE MATERIALIZED VIEW daily_totals AS SELECT ...;\n\
         \n\
         Fix:\n\
           CREATE MATERIALIZED VIEW private.daily_totals AS SELECT ...;\n\
           -- and revoke access from anon and authenticated.";

pub(super) fn check(statements: &[&Statement], ctx: &mut RuleContext<'_>) {
    for stmt in statements {
        let IrNode::CreateMaterializedView(mv) = &stmt.node else {
            continue;
        };
        if !mv.name.is_public() {
            continue;
        }
        ctx.report(
            stmt.span.start_line,
            format!(
                "Materialized view \"{}\" in public schema is exposed via API and does not support RLS",
                mv.name.name
            ),
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::RuleId;
    use crate::rules::test_helpers::*;

    #[test]
    fn test_public_materialized_view_fires() {
        let diagnostics = run_file_rule(
            RuleId::BanMaterializedViewPublic,
            "CREATE MATERIALIZED VIEW daily AS SELECT 1;\nCREATE MATERIALIZED VIEW private.hidden AS SELECT 1;",
        );
        assert_eq!(
            messages(&diagnostics),
            vec![r#"Materialized view "daily" in public schema is exposed via API and does not support RLS"#]
        );
    }
}
