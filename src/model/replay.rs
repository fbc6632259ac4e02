//! Schema replay: folds IR statements into the schema model.
//!
//! The pipeline calls [`apply`] once per file, in migration order. Each
//! statement mutates the model in place so that after the last file the
//! model reflects the net effect of every migration.

use std::path::Path;

use crate::heuristics::references_auth_users;
use crate::model::types::*;
use crate::parser::ir::*;

#[cfg(test)]
mod tests;

/// Apply one file's statements to the model, in order.
pub fn apply(model: &mut SchemaModel, statements: &[Statement], file: &Path) {
    for stmt in statements {
        let provenance = Provenance::new(file, stmt.span.start_line);
        apply_node(model, stmt, provenance);
    }
}

fn apply_node(model: &mut SchemaModel, stmt: &Statement, provenance: Provenance) {
    match &stmt.node {
        IrNode::CreateTable(ct) => apply_create_table(model, ct, provenance),
        IrNode::AlterTable(at) => apply_alter_table(model, at, provenance),
        IrNode::CreateIndex(ci) => apply_create_index(model, ci, provenance),
        IrNode::CreatePolicy(cp) => apply_create_policy(model, cp, provenance),
        IrNode::CreateView(cv) => apply_create_view(model, cv, &stmt.raw_sql, provenance),
        IrNode::CreateFunction(cf) => {
            model.insert_function(FunctionInfo {
                name: cf.name.full_name(),
                security_definer: cf.security_definer,
                has_explicit_search_path: cf.sets_search_path,
                provenance,
            });
        }
        IrNode::CreateExtension(ext) => model.add_extension(&ext.name),
        IrNode::Drop(drop) => apply_drop(model, drop),
        IrNode::CreateMaterializedView(_)
        | IrNode::CreateForeignTable(_)
        | IrNode::Unrecognized { .. } => { /* no model state */ }
    }
}

/// Handle CREATE TABLE: register the table with its columns, primary key
/// flag and foreign keys (inline and table-level).
fn apply_create_table(model: &mut SchemaModel, ct: &CreateTable, provenance: Provenance) {
    let full_name = ct.name.full_name();
    if model.has_table(&full_name) {
        tracing::debug!(table = %full_name, "CREATE TABLE replaces an existing model entry");
    }

    let columns = ct
        .columns
        .iter()
        .map(|c| ColumnInfo {
            name: c.name.clone(),
            type_name: c.type_name.clone(),
            nullable: c.nullable,
        })
        .collect();

    let foreign_keys = ct
        .constraints
        .iter()
        .filter_map(foreign_key_info)
        .collect();

    model.insert_table(TableInfo {
        name: ct.name.name.clone(),
        schema: ct.name.schema_or_default().to_string(),
        has_primary_key: ct.has_primary_key(),
        has_row_security: false,
        columns,
        foreign_keys,
        synthesized: false,
        provenance,
    });
}

fn foreign_key_info(constraint: &TableConstraint) -> Option<ForeignKeyInfo> {
    match constraint {
        TableConstraint::ForeignKey {
            columns,
            ref_table,
            ref_columns,
            ..
        } => Some(ForeignKeyInfo {
            columns: columns.clone(),
            ref_table: ref_table.full_name(),
            ref_columns: ref_columns.clone(),
        }),
        _ => None,
    }
}

/// Handle ALTER TABLE.
///
/// `ENABLE ROW LEVEL SECURITY` on a table the model has not seen (migrations
/// split across directories, or applied out of order) synthesizes a minimal
/// entry that optimistically assumes a primary key, so the table does not
/// also collect a missing-key diagnostic it may not deserve. Other actions on
/// unknown tables are skipped.
fn apply_alter_table(model: &mut SchemaModel, at: &AlterTable, provenance: Provenance) {
    let full_name = at.name.full_name();

    for action in &at.actions {
        if !model.has_table(&full_name) {
            if matches!(action, AlterTableAction::EnableRowSecurity) {
                tracing::debug!(table = %full_name, "synthesizing table for ENABLE ROW LEVEL SECURITY");
                model.insert_table(TableInfo {
                    name: at.name.name.clone(),
                    schema: at.name.schema_or_default().to_string(),
                    has_primary_key: true,
                    has_row_security: true,
                    columns: vec![],
                    foreign_keys: vec![],
                    synthesized: true,
                    provenance: provenance.clone(),
                });
            }
            continue;
        }

        let Some(table) = model.get_table_mut(&full_name) else {
            continue;
        };
        match action {
            AlterTableAction::EnableRowSecurity => table.has_row_security = true,
            AlterTableAction::DisableRowSecurity => table.has_row_security = false,
            AlterTableAction::AddColumn(col) => {
                table.columns.push(ColumnInfo {
                    name: col.name.clone(),
                    type_name: col.type_name.clone(),
                    nullable: col.nullable,
                });
            }
            AlterTableAction::AddConstraint(constraint) => match constraint {
                TableConstraint::PrimaryKey { .. } => table.has_primary_key = true,
                TableConstraint::ForeignKey { .. } => {
                    table.foreign_keys.extend(foreign_key_info(constraint));
                }
                TableConstraint::Unique { .. } => {}
            },
            AlterTableAction::Other { .. } => {}
        }
    }
}

/// Handle CREATE INDEX. Unnamed indexes are skipped since nothing can
/// reference or drop them by name, and so are indexes made only of
/// expressions.
fn apply_create_index(model: &mut SchemaModel, ci: &CreateIndex, provenance: Provenance) {
    let Some(name) = &ci.index_name else {
        return;
    };
    if ci
        .columns
        .iter()
        .all(|c| matches!(c, IndexColumn::Expression(_)))
    {
        tracing::debug!(index = %name, "skipping expression-only index");
        return;
    }

    let columns = ci
        .columns
        .iter()
        .map(|c| match c {
            IndexColumn::Column(name) => name.clone(),
            IndexColumn::Expression(text) => text.clone(),
        })
        .collect();

    model.add_index(IndexInfo {
        name: name.clone(),
        table: ci.table_name.full_name(),
        columns,
        unique: ci.unique,
        provenance,
    });
}

fn apply_create_policy(model: &mut SchemaModel, cp: &CreatePolicy, provenance: Provenance) {
    let roles = if cp.roles.is_empty() {
        vec!["public".to_string()]
    } else {
        cp.roles.clone()
    };

    model.add_policy(PolicyInfo {
        name: cp.name.clone(),
        table: cp.table.full_name(),
        command: cp.command,
        permissive: cp.permissive,
        roles,
        provenance,
    });
}

fn apply_create_view(
    model: &mut SchemaModel,
    cv: &CreateView,
    raw_sql: &str,
    provenance: Provenance,
) {
    model.insert_view(ViewInfo {
        name: cv.name.name.clone(),
        schema: cv.name.schema_or_default().to_string(),
        security_invoker: cv.option_enabled("security_invoker"),
        references_auth_users: references_auth_users(raw_sql),
        provenance,
    });
}

fn apply_drop(model: &mut SchemaModel, drop: &DropObject) {
    match drop.kind {
        DropKind::Table => {
            model.remove_table(&drop.name.full_name());
        }
        DropKind::Index => {
            model.remove_index(drop.name.schema_or_default(), &drop.name.name);
        }
        DropKind::View | DropKind::MaterializedView => {
            model.remove_view(&drop.name.full_name());
        }
    }
}
