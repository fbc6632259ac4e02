//! schema/fk-without-index: foreign key with no covering index
//!
//! An index covers a foreign key when its leading columns are exactly the
//! FK columns, in order. `(a, b)` is covered by `(a, b)` and `(a, b, c)`
//! but not by `(b, a)` or `(a)`.

use crate::model::{ForeignKeyInfo, IndexInfo, SchemaModel};
use crate::rules::{ActiveRule, Diagnostic, Fix};

use super::report_at;

pub(crate) const DESCRIPTION: &str =
    "Foreign key columns should be indexed for better JOIN and cascade performance";

pub(crate) const EXPLAIN: &str = "schema/fk-without-index: Unindexed foreign key\n\
         \n\
         What it detects:\n\
         A foreign key whose referencing table has no index with the FK\n\
         columns as its leading columns, in the same order.\n\
         \n\
         Why it matters:\n\
         Deleting or updating a parent row makes PostgreSQL look up the\n\
         referencing rows. Without an index that lookup scans the whole child\n\
         table, and joins along the key do the same.\n\
         \n\
         Example (bad):\n\
           CREATE TABLE order_items (\n\
             id bigint PRIMARY KEY,\n\
             order_id bigint REFERENCES orders (id)\n\
           );\n\
         \n\
         Fix:\n\
           CREATE INDEX idx_order_items_order_id ON public.order_items (order_id);\n\
         \n\
         The index may live in any migration file.";

fn covers(index: &IndexInfo, fk: &ForeignKeyInfo) -> bool {
    fk.columns.len() <= index.columns.len()
        && fk
            .columns
            .iter()
            .zip(&index.columns)
            .all(|(fk_col, idx_col)| fk_col == idx_col)
}

pub(crate) fn check(model: &SchemaModel, rule: &ActiveRule) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (full_name, table) in model.tables() {
        let indexes = model.indexes_on(full_name);
        for fk in &table.foreign_keys {
            if fk.columns.is_empty() || indexes.iter().any(|idx| covers(idx, fk)) {
                continue;
            }
            let cols = fk.columns.join(", ");
            let fix = Fix::new(
                "Create index for FK",
                format!(
                    "CREATE INDEX idx_{}_{} ON {full_name} ({cols});",
                    table.name,
                    fk.columns.join("_")
                ),
            );
            diagnostics.push(
                report_at(
                    rule,
                    &table.provenance,
                    format!("Foreign key on \"{full_name}({cols})\" has no covering index"),
                )
                .with_fix(fix),
            );
        }
    }
    diagnostics
}
