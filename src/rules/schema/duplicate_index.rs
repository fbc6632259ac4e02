//! schema/duplicate-index: identical or redundant indexes on one table
//!
//! Exact duplicates (same columns, same order) are reported on the later
//! index at the rule's severity. A non-unique index whose columns are a
//! strict leading prefix of another index on the same table is reported as
//! redundant at `info`, once, against the first index covering it.

use std::collections::HashMap;

use crate::model::{IndexInfo, SchemaModel};
use crate::rules::{ActiveRule, Diagnostic, Fix, Severity};

use super::report_at;

pub(crate) const DESCRIPTION: &str = "Detects identical or redundant indexes on the same table";

pub(crate) const EXPLAIN: &str = "schema/duplicate-index: Duplicate index\n\
         \n\
         What it detects:\n\
         Two indexes on the same table with the same columns in the same\n\
         order, and non-unique indexes whose columns are a leading prefix of\n\
         another index on the table (reported at info).\n\
         \n\
         Why it matters:\n\
         Every index slows down writes and takes disk and cache space. A\n\
         duplicate or prefix-covered index adds that cost without serving\n\
         any query the other index cannot.\n\
         \n\
         Example (bad):\n\
           CREATE INDEX idx_a ON orders (customer_id);\n\
           CREATE INDEX idx_b ON orders (customer_id);\n\
         \n\
         Fix:\n\
           DROP INDEX IF EXISTS idx_b;\n\
         \n\
         Unique indexes are never reported as redundant: they enforce a\n\
         constraint the longer index does not.";

/// `shorter` is a strict leading prefix of `longer`.
fn is_strict_prefix(shorter: &[String], longer: &[String]) -> bool {
    shorter.len() < longer.len() && longer.starts_with(shorter)
}

fn drop_fix(description: String, index: &str) -> Fix {
    Fix::new(description, format!("DROP INDEX IF EXISTS {index};"))
}

fn redundant(rule: &ActiveRule, covered: &IndexInfo, by: &IndexInfo) -> Diagnostic {
    report_at(
        rule,
        &covered.provenance,
        format!(
            "Index \"{}\" on ({}) is redundant - covered by \"{}\"",
            covered.name,
            covered.columns.join(", "),
            by.name
        ),
    )
    .with_severity(Severity::Info)
    .with_fix(drop_fix(
        format!("Drop redundant index {}", covered.name),
        &covered.name,
    ))
}

pub(crate) fn check(model: &SchemaModel, rule: &ActiveRule) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (full_name, indexes) in model.indexes() {
        let mut seen: HashMap<&[String], &IndexInfo> = HashMap::new();
        for index in indexes {
            match seen.get(index.columns.as_slice()).copied() {
                Some(earlier) => diagnostics.push(
                    report_at(
                        rule,
                        &index.provenance,
                        format!(
                            "Duplicate indexes on \"{full_name}\": \"{}\" and \"{}\"",
                            earlier.name, index.name
                        ),
                    )
                    .with_fix(drop_fix("Drop duplicate index".to_string(), &index.name)),
                ),
                None => {
                    seen.insert(index.columns.as_slice(), index);
                }
            }
        }

        // One report per covered index, naming the first index that covers it.
        for covered in indexes.iter().filter(|i| !i.unique) {
            if let Some(by) = indexes
                .iter()
                .find(|other| is_strict_prefix(&covered.columns, &other.columns))
            {
                diagnostics.push(redundant(rule, covered, by));
            }
        }
    }

    diagnostics
}
