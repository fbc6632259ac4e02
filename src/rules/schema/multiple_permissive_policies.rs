//! schema/multiple-permissive-policies: overlapping permissive policies
//!
//! Policies are expanded over their commands (`ALL` stands for the four
//! base commands) and roles, then grouped per table by `(command, role)`.
//! Groups are reported in first-seen order.

use indexmap::IndexMap;

use crate::model::{PolicyInfo, SchemaModel};
use crate::parser::ir::PolicyCommand;
use crate::rules::{ActiveRule, Diagnostic};

use super::report_at;

pub(crate) const DESCRIPTION: &str =
    "Multiple permissive policies for the same role and command are evaluated for every row";

pub(crate) const EXPLAIN: &str = "schema/multiple-permissive-policies: Multiple permissive policies\n\
         \n\
         What it detects:\n\
         Two or more permissive policies on one table that apply to the same\n\
         role and command. A FOR ALL policy counts for SELECT, INSERT,\n\
         UPDATE and DELETE.\n\
         \n\
         Why it matters:\n\
         PostgreSQL evaluates every applicable permissive policy and ORs the\n\
         results, so each extra policy adds per-row work to every query.\n\
         \n\
         Example (bad):\n\
           CREATE POLICY read_own ON posts FOR SELECT TO authenticated\n\
             USING (auth.uid() = author);\n\
           CREATE POLICY read_published ON posts FOR SELECT TO authenticated\n\
             USING (published);\n\
         \n\
         Fix:\n\
           CREATE POLICY read ON posts FOR SELECT TO authenticated\n\
             USING (auth.uid() = author OR published);";

pub(crate) fn check(model: &SchemaModel, rule: &ActiveRule) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (full_name, policies) in model.policies() {
        let mut groups: IndexMap<(PolicyCommand, &str), Vec<&PolicyInfo>> = IndexMap::new();
        for policy in policies.iter().filter(|p| p.permissive) {
            for &command in policy.command.expand() {
                for role in &policy.roles {
                    groups
                        .entry((command, role.as_str()))
                        .or_default()
                        .push(policy);
                }
            }
        }

        for ((command, role), group) in groups {
            if group.len() <= 1 {
                continue;
            }
            let names: Vec<&str> = group.iter().map(|p| p.name.as_str()).collect();
            diagnostics.push(report_at(
                rule,
                &group[0].provenance,
                format!(
                    "Table \"{full_name}\" has {} permissive policies for {role}/{command}: {}",
                    group.len(),
                    names.join(", ")
                ),
            ));
        }
    }

    diagnostics
}
