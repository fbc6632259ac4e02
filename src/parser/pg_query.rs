//! pg_query AST to IR conversion
//!
//! This module converts the pg_query crate's PostgreSQL AST into the closed
//! IR used by the model builder and rules. It extracts names, constraints,
//! policy and view options, and tracks source locations.

use crate::line_index::LineIndex;
use crate::parser::ir::{
    AlterTable, AlterTableAction, ColumnDef, CreateExtension, CreateForeignTable, CreateFunction,
    CreateIndex, CreateMaterializedView, CreatePolicy, CreateTable, CreateView, DropKind,
    DropObject, IndexColumn, IrNode, PolicyCommand, QualifiedName, RelOption, SourceSpan,
    Statement, TableConstraint,
};
use pg_query::NodeEnum;
use pg_query::protobuf::{AlterTableType, ConstrType, ObjectType, RoleSpecType};

/// Sentinel type name used when the actual type cannot be determined.
const UNKNOWN_TYPE: &str = "unknown";

#[cfg(test)]
mod tests;

/// Parse a SQL source string into a list of IR statements.
///
/// Each SQL statement in the source is converted to the most specific IR node
/// possible; statements with no mapping become `IrNode::Unrecognized`. A
/// syntax error anywhere in the source fails the whole file.
///
/// `start_line` points at the statement's first token, skipping leading
/// whitespace and comments, so directives on the preceding line line up.
pub fn parse_sql(source: &str, lines: &LineIndex) -> Result<Vec<Statement>, pg_query::Error> {
    let result = pg_query::parse(source)?;

    let mut statements = Vec::new();

    for raw_stmt in &result.protobuf.stmts {
        let start_offset = (raw_stmt.stmt_location.max(0) as usize).min(source.len());
        let end_offset = if raw_stmt.stmt_len > 0 {
            (start_offset + raw_stmt.stmt_len as usize).min(source.len())
        } else {
            source.len()
        };

        let token_start = first_token_offset(source, start_offset, end_offset);
        let start_line = lines.line_of(token_start);
        let end_line = lines.line_of(end_offset.saturating_sub(1).max(token_start));

        let raw_sql = source
            .get(token_start..end_offset)
            .unwrap_or("")
            .to_string();

        let stmt_node = raw_stmt.stmt.as_ref().and_then(|s| s.node.as_ref());

        let ir_nodes = match stmt_node {
            Some(node_enum) => convert_node(node_enum),
            None => vec![IrNode::Unrecognized {
                kind: "Empty".to_string(),
            }],
        };

        let span = SourceSpan {
            start_line,
            end_line,
            start_offset: token_start,
            end_offset,
        };

        for node in ir_nodes {
            statements.push(Statement {
                node,
                raw_sql: raw_sql.clone(),
                span: span.clone(),
            });
        }
    }

    Ok(statements)
}

/// Skip whitespace, `--` line comments and `/* */` block comments starting at
/// `start`, returning the offset of the first real token (or `start` if none).
fn first_token_offset(source: &str, start: usize, end: usize) -> usize {
    let bytes = source.as_bytes();
    let mut pos = start;
    while pos < end {
        let rest = &source[pos..end];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        if trimmed.starts_with("--") {
            match bytes[pos..end].iter().position(|b| *b == b'\n') {
                Some(nl) => pos += nl + 1,
                None => return start,
            }
        } else if trimmed.starts_with("/*") {
            match trimmed.find("*/") {
                Some(close) => pos += close + 2,
                None => return start,
            }
        } else {
            break;
        }
    }
    if pos >= end { start } else { pos }
}

/// Convert a pg_query `NodeEnum` into one or more IR nodes.
///
/// Most statements produce a single IR node. Multi-target drops like
/// `DROP TABLE t1, t2` produce one node per target.
fn convert_node(node: &NodeEnum) -> Vec<IrNode> {
    match node {
        NodeEnum::CreateStmt(create) => vec![convert_create_table(create)],
        NodeEnum::AlterTableStmt(alter) if alter.objtype() == ObjectType::ObjectTable => {
            vec![convert_alter_table(alter)]
        }
        NodeEnum::IndexStmt(idx) => vec![convert_create_index(idx)],
        NodeEnum::CreatePolicyStmt(policy) => vec![convert_create_policy(policy)],
        NodeEnum::ViewStmt(view) => vec![convert_view(view)],
        NodeEnum::CreateTableAsStmt(ctas) if ctas.objtype() == ObjectType::ObjectMatview => {
            let name = ctas
                .into
                .as_ref()
                .map(|into| relation_to_qualified_name(into.rel.as_ref()))
                .unwrap_or_else(|| QualifiedName::unqualified("unknown"));
            vec![IrNode::CreateMaterializedView(CreateMaterializedView {
                name,
            })]
        }
        NodeEnum::CreateForeignTableStmt(foreign) => {
            let name = relation_to_qualified_name(
                foreign
                    .base_stmt
                    .as_ref()
                    .and_then(|base| base.relation.as_ref()),
            );
            vec![IrNode::CreateForeignTable(CreateForeignTable {
                name,
                server: foreign.servername.clone(),
            })]
        }
        NodeEnum::CreateFunctionStmt(func) => vec![convert_create_function(func)],
        NodeEnum::CreateExtensionStmt(ext) => {
            let schema = ext.options.iter().find_map(|opt| match opt.node.as_ref() {
                Some(NodeEnum::DefElem(def)) if def.defname == "schema" => {
                    def.arg.as_deref().and_then(def_arg_text)
                }
                _ => None,
            });
            vec![IrNode::CreateExtension(CreateExtension {
                name: ext.extname.clone(),
                schema,
                if_not_exists: ext.if_not_exists,
            })]
        }
        NodeEnum::DropStmt(drop) => convert_drop_stmt(drop),
        other => vec![IrNode::Unrecognized {
            kind: node_tag(other),
        }],
    }
}

/// Variant name of a pg_query node, e.g. `GrantStmt`.
fn node_tag(node: &NodeEnum) -> String {
    let debug = format!("{node:?}");
    debug
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or("Unknown")
        .to_string()
}

// ---------------------------------------------------------------------------
// CREATE TABLE
// ---------------------------------------------------------------------------

fn convert_create_table(create: &pg_query::protobuf::CreateStmt) -> IrNode {
    let name = relation_to_qualified_name(create.relation.as_ref());

    let mut columns = Vec::new();
    let mut constraints = Vec::new();

    for elt in &create.table_elts {
        match elt.node.as_ref() {
            Some(NodeEnum::ColumnDef(col)) => {
                let (col_def, inline_constraints) = convert_column_def(col);
                columns.push(col_def);
                constraints.extend(inline_constraints);
            }
            Some(NodeEnum::Constraint(con)) => {
                if let Some(tc) = convert_table_constraint(con, None) {
                    constraints.push(tc);
                }
            }
            _ => {}
        }
    }

    IrNode::CreateTable(CreateTable {
        name,
        columns,
        constraints,
    })
}

fn optional_name(name: &str) -> Option<String> {
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Convert a column definition, returning inline constraints (PK, FK, UNIQUE)
/// as table-level constraints scoped to that column.
fn convert_column_def(col: &pg_query::protobuf::ColumnDef) -> (ColumnDef, Vec<TableConstraint>) {
    let mut nullable = true;
    let mut is_inline_pk = false;
    let mut constraints = Vec::new();

    for con_node in &col.constraints {
        let con = match con_node.node.as_ref() {
            Some(NodeEnum::Constraint(c)) => c,
            _ => continue,
        };

        match con.contype() {
            ConstrType::ConstrNotnull => nullable = false,
            ConstrType::ConstrPrimary => {
                is_inline_pk = true;
                nullable = false;
            }
            _ => {
                if let Some(tc) = convert_table_constraint(con, Some(&col.colname)) {
                    constraints.push(tc);
                }
            }
        }
    }

    let col_def = ColumnDef {
        name: col.colname.clone(),
        type_name: extract_type_name(col.type_name.as_ref()),
        nullable,
        is_inline_pk,
    };

    (col_def, constraints)
}

/// Last identifier of a type name, lowercased (`pg_catalog.int4` → `int4`).
fn extract_type_name(tn: Option<&pg_query::protobuf::TypeName>) -> String {
    tn.and_then(|t| {
        t.names.iter().rev().find_map(|n| match n.node.as_ref() {
            Some(NodeEnum::String(s)) => Some(s.sval.to_lowercase()),
            _ => None,
        })
    })
    .unwrap_or_else(|| UNKNOWN_TYPE.to_string())
}

/// Convert a constraint node. `context_column` fills in the column list for
/// constraints declared inline on a column.
fn convert_table_constraint(
    con: &pg_query::protobuf::Constraint,
    context_column: Option<&str>,
) -> Option<TableConstraint> {
    let with_context = |mut columns: Vec<String>| {
        if columns.is_empty()
            && let Some(col) = context_column
        {
            columns.push(col.to_string());
        }
        columns
    };

    match con.contype() {
        ConstrType::ConstrPrimary => Some(TableConstraint::PrimaryKey {
            columns: with_context(extract_string_list(&con.keys)),
        }),
        ConstrType::ConstrForeign => Some(TableConstraint::ForeignKey {
            name: optional_name(&con.conname),
            columns: with_context(extract_string_list(&con.fk_attrs)),
            ref_table: relation_to_qualified_name(con.pktable.as_ref()),
            ref_columns: extract_string_list(&con.pk_attrs),
        }),
        ConstrType::ConstrUnique => Some(TableConstraint::Unique {
            name: optional_name(&con.conname),
            columns: with_context(extract_string_list(&con.keys)),
        }),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// ALTER TABLE
// ---------------------------------------------------------------------------

fn convert_alter_table(alter: &pg_query::protobuf::AlterTableStmt) -> IrNode {
    let name = relation_to_qualified_name(alter.relation.as_ref());

    let actions = alter
        .cmds
        .iter()
        .filter_map(|cmd_node| match cmd_node.node.as_ref() {
            Some(NodeEnum::AlterTableCmd(c)) => Some(convert_alter_table_cmd(c)),
            _ => None,
        })
        .flatten()
        .collect();

    IrNode::AlterTable(AlterTable { name, actions })
}

/// Convert a single `AlterTableCmd` into one or more `AlterTableAction`s.
///
/// Returns a `Vec` because `ADD COLUMN` with inline constraints (e.g. FK)
/// produces the column action *plus* constraint actions.
fn convert_alter_table_cmd(cmd: &pg_query::protobuf::AlterTableCmd) -> Vec<AlterTableAction> {
    let def = cmd.def.as_ref().and_then(|d| d.node.as_ref());
    match cmd.subtype() {
        AlterTableType::AtAddColumn => match def {
            Some(NodeEnum::ColumnDef(col)) => {
                let (col_def, inline_constraints) = convert_column_def(col);
                let inline_pk = col_def.is_inline_pk.then(|| {
                    AlterTableAction::AddConstraint(TableConstraint::PrimaryKey {
                        columns: vec![col_def.name.clone()],
                    })
                });
                let mut result = vec![AlterTableAction::AddColumn(col_def)];
                result.extend(inline_pk);
                result.extend(
                    inline_constraints
                        .into_iter()
                        .map(AlterTableAction::AddConstraint),
                );
                result
            }
            _ => vec![AlterTableAction::Other {
                description: "ADD COLUMN (unparseable definition)".to_string(),
            }],
        },
        AlterTableType::AtAddConstraint => match def {
            Some(NodeEnum::Constraint(con)) => match convert_table_constraint(con, None) {
                Some(tc) => vec![AlterTableAction::AddConstraint(tc)],
                None => vec![AlterTableAction::Other {
                    description: "ADD CONSTRAINT".to_string(),
                }],
            },
            _ => vec![AlterTableAction::Other {
                description: "ADD CONSTRAINT (unparseable)".to_string(),
            }],
        },
        AlterTableType::AtEnableRowSecurity => vec![AlterTableAction::EnableRowSecurity],
        AlterTableType::AtDisableRowSecurity => vec![AlterTableAction::DisableRowSecurity],
        other => vec![AlterTableAction::Other {
            description: format!("{other:?}"),
        }],
    }
}

// ---------------------------------------------------------------------------
// CREATE INDEX
// ---------------------------------------------------------------------------

fn convert_create_index(idx: &pg_query::protobuf::IndexStmt) -> IrNode {
    let columns = idx
        .index_params
        .iter()
        .filter_map(|p| match p.node.as_ref() {
            Some(NodeEnum::IndexElem(elem)) if !elem.name.is_empty() => {
                Some(IndexColumn::Column(elem.name.clone()))
            }
            Some(NodeEnum::IndexElem(elem)) => elem
                .expr
                .as_ref()
                .map(|expr| IndexColumn::Expression(deparse_node(expr))),
            _ => None,
        })
        .collect();

    IrNode::CreateIndex(CreateIndex {
        index_name: optional_name(&idx.idxname),
        table_name: relation_to_qualified_name(idx.relation.as_ref()),
        columns,
        unique: idx.unique,
    })
}

// ---------------------------------------------------------------------------
// CREATE POLICY
// ---------------------------------------------------------------------------

fn convert_create_policy(policy: &pg_query::protobuf::CreatePolicyStmt) -> IrNode {
    let command = policy
        .cmd_name
        .parse::<PolicyCommand>()
        .unwrap_or(PolicyCommand::All);

    let roles = policy
        .roles
        .iter()
        .filter_map(|r| match r.node.as_ref() {
            Some(NodeEnum::RoleSpec(spec)) => match spec.roletype() {
                RoleSpecType::RolespecCstring => Some(spec.rolename.clone()),
                RoleSpecType::RolespecCurrentRole => Some("current_role".to_string()),
                RoleSpecType::RolespecCurrentUser => Some("current_user".to_string()),
                RoleSpecType::RolespecSessionUser => Some("session_user".to_string()),
                RoleSpecType::RolespecPublic => Some("public".to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect();

    IrNode::CreatePolicy(CreatePolicy {
        name: policy.policy_name.clone(),
        table: relation_to_qualified_name(policy.table.as_ref()),
        command,
        permissive: policy.permissive,
        roles,
    })
}

// ---------------------------------------------------------------------------
// CREATE VIEW / CREATE FUNCTION
// ---------------------------------------------------------------------------

fn convert_view(view: &pg_query::protobuf::ViewStmt) -> IrNode {
    let options = view
        .options
        .iter()
        .filter_map(|opt| match opt.node.as_ref() {
            Some(NodeEnum::DefElem(def)) => Some(RelOption {
                name: def.defname.clone(),
                value: def.arg.as_deref().and_then(def_arg_text),
            }),
            _ => None,
        })
        .collect();

    IrNode::CreateView(CreateView {
        name: relation_to_qualified_name(view.view.as_ref()),
        options,
    })
}

fn convert_create_function(func: &pg_query::protobuf::CreateFunctionStmt) -> IrNode {
    let parts = extract_string_list(&func.funcname);
    let name = match parts.as_slice() {
        [] => QualifiedName::unqualified("unknown"),
        [name] => QualifiedName::unqualified(name),
        [.., schema, name] => QualifiedName::qualified(schema, name),
    };

    let mut security_definer = false;
    let mut sets_search_path = false;

    for opt in &func.options {
        let Some(NodeEnum::DefElem(def)) = opt.node.as_ref() else {
            continue;
        };
        let arg = def.arg.as_ref().and_then(|a| a.node.as_ref());
        match def.defname.as_str() {
            "security" => {
                security_definer = match arg {
                    Some(NodeEnum::Boolean(b)) => b.boolval,
                    Some(NodeEnum::Integer(i)) => i.ival != 0,
                    Some(NodeEnum::String(s)) => s.sval.eq_ignore_ascii_case("definer"),
                    _ => false,
                };
            }
            "set" => {
                if let Some(NodeEnum::VariableSetStmt(set)) = arg
                    && set.name.eq_ignore_ascii_case("search_path")
                {
                    sets_search_path = true;
                }
            }
            _ => {}
        }
    }

    IrNode::CreateFunction(CreateFunction {
        name,
        security_definer,
        sets_search_path,
    })
}

/// Textual value of a `DefElem` argument (`= true`, `= 1`, `= 'on'`, `= yes`).
fn def_arg_text(arg: &pg_query::protobuf::Node) -> Option<String> {
    match arg.node.as_ref()? {
        NodeEnum::String(s) => Some(s.sval.clone()),
        NodeEnum::Integer(i) => Some(i.ival.to_string()),
        NodeEnum::Float(f) => Some(f.fval.clone()),
        NodeEnum::Boolean(b) => Some(b.boolval.to_string()),
        NodeEnum::TypeName(tn) => extract_string_list(&tn.names).pop(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// DROP
// ---------------------------------------------------------------------------

fn convert_drop_stmt(drop: &pg_query::protobuf::DropStmt) -> Vec<IrNode> {
    let kind = match drop.remove_type() {
        ObjectType::ObjectTable => DropKind::Table,
        ObjectType::ObjectIndex => DropKind::Index,
        ObjectType::ObjectView => DropKind::View,
        ObjectType::ObjectMatview => DropKind::MaterializedView,
        other => {
            return vec![IrNode::Unrecognized {
                kind: format!("DropStmt({other:?})"),
            }];
        }
    };

    extract_all_qualified_names_from_drop_objects(&drop.objects)
        .into_iter()
        .map(|name| {
            IrNode::Drop(DropObject {
                kind,
                name,
                if_exists: drop.missing_ok,
            })
        })
        .collect()
}

/// Extract schema-qualified names from DROP statement objects.
///
/// Each object is a `List` of `String` nodes: `[name]` or `[schema, name]`
/// (or longer, where the last two components are used).
fn extract_all_qualified_names_from_drop_objects(
    objects: &[pg_query::protobuf::Node],
) -> Vec<QualifiedName> {
    objects
        .iter()
        .filter_map(|obj| match obj.node.as_ref() {
            Some(NodeEnum::List(list)) => match extract_string_list(&list.items).as_slice() {
                [] => None,
                [name] => Some(QualifiedName::unqualified(name)),
                [.., schema, name] => Some(QualifiedName::qualified(schema, name)),
            },
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn relation_to_qualified_name(rel: Option<&pg_query::protobuf::RangeVar>) -> QualifiedName {
    match rel {
        Some(r) if r.schemaname.is_empty() => QualifiedName::unqualified(&r.relname),
        Some(r) => QualifiedName::qualified(&r.schemaname, &r.relname),
        None => QualifiedName::unqualified("unknown"),
    }
}

fn extract_string_list(nodes: &[pg_query::protobuf::Node]) -> Vec<String> {
    nodes
        .iter()
        .filter_map(|n| match n.node.as_ref() {
            Some(NodeEnum::String(s)) => Some(s.sval.clone()),
            _ => None,
        })
        .collect()
}

/// Deparse a single expression node back into SQL text.
fn deparse_node(node: &pg_query::protobuf::Node) -> String {
    // Parse a trivial SELECT to get a ParseResult with the correct version
    let mut parse_result = match pg_query::parse("SELECT NULL") {
        Ok(pr) => pr,
        Err(_) => return format!("{:?}", node.node),
    };

    if let Some(stmt) = parse_result.protobuf.stmts.first_mut()
        && let Some(ref mut stmt_node) = stmt.stmt
        && let Some(NodeEnum::SelectStmt(ref mut select)) = stmt_node.node
        && let Some(first_target) = select.target_list.first_mut()
        && let Some(NodeEnum::ResTarget(ref mut res)) = first_target.node
    {
        res.val = Some(Box::new(node.clone()));
    }

    match pg_query::deparse(&parse_result.protobuf) {
        Ok(sql) => sql.strip_prefix("SELECT ").unwrap_or(&sql).to_string(),
        Err(_) => format!("{:?}", node.node),
    }
}
