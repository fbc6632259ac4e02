//! no-sensitive-columns: column names that suggest secrets or personal data

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::ir::{IrNode, Statement};
use crate::rules::RuleContext;

pub(super) const DESCRIPTION: &str =
    "Columns with sensitive data should not be exposed in public tables";

pub(super) const EXPLAIN: &str = "no-sensitive-columns: Sensitive columns exposed\n\
         \n\
         What it detects:\n\
         CREATE TABLE columns whose names look like passwords, secrets, API\n\
         keys, tokens, private keys or personal identifiers (SSN, card numbers).\n\
         \n\
         Why it matters:\n\
         Tables in exposed schemas are reachable through the API. A single\n\
         permissive policy is enough to leak such a column to clients.\n\
         \n\
         Example (bad):\n\
           CREATE TABLE profiles (id uuid PRIMARY KEY, api_key text);\n\
         \n\
         Fix:\n\
           Keep secrets in a private schema or in a vault, and expose only\n\
           what clients need through a view.";

/// Column-name patterns paired with the kind of data they suggest, checked
/// in order.
static SENSITIVE: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)password|passwd", "password"),
        (r"(?i)secret", "secret"),
        (r"(?i)api[_-]?key", "api_key"),
        (
            r"(?i)access[_-]?token|refresh[_-]?token|auth[_-]?token|bearer|jwt",
            "token",
        ),
        (
            r"(?i)ssn|social[_-]?security|credit[_-]?card|card[_-]?number|cvv",
            "pii",
        ),
        (r"(?i)private[_-]?key|encryption[_-]?key", "key"),
    ]
    .into_iter()
    .map(|(pattern, kind)| (Regex::new(pattern).expect("valid sensitive-column pattern"), kind))
    .collect()
});

fn sensitive_kind(column: &str) -> Option<&'static str> {
    SENSITIVE
        .iter()
        .find(|(pattern, _)| pattern.is_match(column))
        .map(|(_, kind)| *kind)
}

pub(super) fn check(statements: &[&Statement], ctx: &mut RuleContext<'_>) {
    for stmt in statements {
        let IrNode::CreateTable(ct) = &stmt.node else {
            continue;
        };
        for col in &ct.columns {
            if let Some(kind) = sensitive_kind(&col.name) {
                ctx.report(
                    stmt.span.start_line,
                    format!(
                        "Column \"{}\" in table \"{}\" appears to contain sensitive {kind} data",
                        col.name, ct.name
                    ),
                    None,
                );
            }
        }
    }
}
