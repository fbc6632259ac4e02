//! rls-policy-always-true: permissive policy whose predicate is constant true

use crate::heuristics::{extract_clause, is_always_true};
use crate::parser::ir::{IrNode, PolicyCommand, Statement};
use crate::rules::RuleContext;

pub(super) const DESCRIPTION: &str =
    "RLS policies with USING (true) or WITH CHECK (true) for write operations are overly permissive";

pub(super) const EXPLAIN: &str = "rls-policy-always-true: Permissive RLS policy\n\
         \n\
         What it detects:\n\
         A permissive policy whose USING clause is a constant true predicate\n\
         for UPDATE, DELETE or ALL, or whose WITH CHECK clause is constant\n\
         true for INSERT, UPDATE or ALL.\n\
         \n\
         Why it matters:\n\
         Permissive policies are OR-ed together. A constant true predicate on\n\
         a write command lets every role the policy applies to modify every\n\
         row, which defeats row level security for that table.\n\
         \n\
         Example (bad):\n\
           CREATE POLICY anyone_edits ON posts FOR UPDATE USING (true);\n\
         \n\
         Fix:\n\
           CREATE POLICY owner_edits ON posts FOR UPDATE\n\
             USING (auth.uid() = author_id);";

const USING_COMMANDS: &[PolicyCommand] = &[
    PolicyCommand::Update,
    PolicyCommand::Delete,
    PolicyCommand::All,
];

const WITH_CHECK_COMMANDS: &[PolicyCommand] = &[
    PolicyCommand::Insert,
    PolicyCommand::Update,
    PolicyCommand::All,
];

pub(super) fn check(statements: &[&Statement], ctx: &mut RuleContext<'_>) {
    for stmt in statements {
        let IrNode::CreatePolicy(cp) = &stmt.node else {
            continue;
        };
        if !cp.permissive {
            continue;
        }

        let policy = &cp.name;
        let table = cp.table.full_name();
        let cmd = cp.command;

        let using = extract_clause(&stmt.raw_sql, "using");
        if using.is_some_and(is_always_true) && USING_COMMANDS.contains(&cmd) {
            ctx.report(
                stmt.span.start_line,
                format!("Policy \"{policy}\" on \"{table}\" has USING (true) for {cmd}"),
                None,
            );
        }

        let with_check = extract_clause(&stmt.raw_sql, "with check");
        if with_check.is_some_and(is_always_true) && WITH_CHECK_COMMANDS.contains(&cmd) {
            ctx.report(
                stmt.span.start_line,
                format!("Policy \"{policy}\" on \"{table}\" has WITH CHECK (true) for {cmd}"),
                None,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::RuleId;
    use crate::rules::test_helpers::*;

    #[test]
    fn test_using_true_on_update_fires() {
        let diagnostics = run_file_rule(
            RuleId::RlsPolicyAlwaysTrue,
            "CREATE POLICY anyone_edits ON posts FOR UPDATE USING (true);",
        );
        assert_eq!(
            messages(&diagnostics),
            vec![r#"Policy "anyone_edits" on "public.posts" has USING (true) for UPDATE"#]
        );
    }

    #[test]
    fn test_all_command_reports_both_clauses() {
        let diagnostics = run_file_rule(
            RuleId::RlsPolicyAlwaysTrue,
            "CREATE POLICY wide_open ON app.notes USING (1 = 1) WITH CHECK (true);",
        );
        assert_eq!(
            messages(&diagnostics),
            vec![
                r#"Policy "wide_open" on "app.notes" has USING (true) for ALL"#,
                r#"Policy "wide_open" on "app.notes" has WITH CHECK (true) for ALL"#,
            ]
        );
    }

    #[test]
    fn test_select_and_restrictive_policies_pass() {
        let diagnostics = run_file_rule(
            RuleId::RlsPolicyAlwaysTrue,
            "CREATE POLICY public_read ON posts FOR SELECT USING (true);
             CREATE POLICY gate ON posts AS RESTRICTIVE FOR UPDATE USING (true);
             CREATE POLICY owner ON posts FOR DELETE USING (auth.uid() = author_id);",
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_insert_only_checks_with_check() {
        let diagnostics = run_file_rule(
            RuleId::RlsPolicyAlwaysTrue,
            "CREATE POLICY signup ON profiles FOR INSERT WITH CHECK (true);",
        );
        assert_eq!(
            messages(&diagnostics),
            vec![r#"Policy "signup" on "public.profiles" has WITH CHECK (true) for INSERT"#]
        );
    }
}
