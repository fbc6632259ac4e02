//! no-table-without-pk: table created without a primary key
//!
//! Fires once per `CREATE TABLE` that declares neither a column-level nor a
//! table-level `PRIMARY KEY`.

use crate::parser::ir::{IrNode, Statement};
use crate::rules::{Fix, RuleContext};

pub(super) const DESCRIPTION: &str =
    "Tables should have a primary key for performance and data integrity";

pub(super) const EXPLAIN: &str = "no-table-without-pk: Table without primary key\n\
         \n\
         What it detects:\n\
         A CREATE TABLE statement with no PRIMARY KEY, either inline on a\n\
         column or as a table constraint.\n\
         \n\
         Why it matters:\n\
         Without a primary key, rows cannot be addressed reliably. Logical\n\
         replication cannot stream UPDATE or DELETE for the table, and the\n\
         API layer cannot identify rows for updates.\n\
         \n\
         Example (bad):\n\
           CREATE TABLE events (kind text, payload jsonb);\n\
         \n\
         Fix:\n\
           CREATE TABLE events (id bigint GENERATED ALWAYS AS IDENTITY PRIMARY KEY,\n\
                                kind text, payload jsonb);";

pub(super) fn check(statements: &[&Statement], ctx: &mut RuleContext<'_>) {
    for stmt in statements {
        let IrNode::CreateTable(ct) = &stmt.node else {
            continue;
        };
        if ct.has_primary_key() {
            continue;
        }

        let table = &ct.name;
        ctx.report(
            stmt.span.start_line,
            format!("Table \"{table}\" does not have a primary key"),
            Some(Fix::new(
                format!("Add primary key to {table}"),
                format!("ALTER TABLE {table} ADD PRIMARY KEY (id);"),
            )),
        );
    }
}
