use super::*;

fn parse(sql: &str) -> Vec<Statement> {
    parse_sql(sql, &LineIndex::new(sql)).expect("valid SQL")
}

fn single(sql: &str) -> IrNode {
    let mut stmts = parse(sql);
    assert_eq!(stmts.len(), 1, "expected one statement for: {sql}");
    stmts.remove(0).node
}

// -----------------------------------------------------------------------
// Locations
// -----------------------------------------------------------------------

#[test]
fn test_start_line_skips_leading_comments() {
    let sql = "CREATE TABLE a (id int PRIMARY KEY);\n\n-- note\n/* block */\nCREATE TABLE b (id int);\n";
    let stmts = parse(sql);
    assert_eq!(stmts.len(), 2);
    assert_eq!(stmts[0].span.start_line, 1);
    assert_eq!(stmts[1].span.start_line, 5);
    assert!(stmts[1].raw_sql.starts_with("CREATE TABLE b"));
}

#[test]
fn test_multi_line_statement_span() {
    let sql = "CREATE TABLE a (\n  id int,\n  name text\n);";
    let stmts = parse(sql);
    assert_eq!(stmts[0].span.start_line, 1);
    assert_eq!(stmts[0].span.end_line, 4);
}

#[test]
fn test_syntax_error_is_reported() {
    let sql = "CREATE TABLE (;";
    assert!(parse_sql(sql, &LineIndex::new(sql)).is_err());
}

#[test]
fn test_first_token_offset_without_comments() {
    assert_eq!(first_token_offset("  SELECT 1", 0, 10), 2);
    assert_eq!(first_token_offset("-- only a comment", 0, 17), 0);
}

// -----------------------------------------------------------------------
// CREATE TABLE / ALTER TABLE
// -----------------------------------------------------------------------

#[test]
fn test_parse_create_table() {
    let node = single("CREATE TABLE orders (id integer PRIMARY KEY, status text NOT NULL, note text);");
    let IrNode::CreateTable(ct) = node else {
        panic!("expected CreateTable, got {node:?}");
    };
    assert_eq!(ct.name, QualifiedName::unqualified("orders"));
    assert_eq!(ct.columns.len(), 3);
    assert_eq!(ct.columns[0].type_name, "int4");
    assert!(ct.columns[0].is_inline_pk);
    assert!(!ct.columns[0].nullable);
    assert!(!ct.columns[1].nullable);
    assert!(ct.columns[2].nullable);
    assert!(ct.has_primary_key());
}

#[test]
fn test_table_level_primary_key() {
    let node = single("CREATE TABLE public.t (a int, b int, PRIMARY KEY (a, b));");
    let IrNode::CreateTable(ct) = node else {
        panic!("expected CreateTable");
    };
    assert_eq!(ct.name, QualifiedName::qualified("public", "t"));
    assert!(ct.has_primary_key());
    assert!(ct.constraints.contains(&TableConstraint::PrimaryKey {
        columns: vec!["a".into(), "b".into()],
    }));
}

#[test]
fn test_inline_and_table_foreign_keys() {
    let node = single(
        "CREATE TABLE posts (
            id bigint PRIMARY KEY,
            author_id bigint REFERENCES users(id),
            org_id bigint,
            CONSTRAINT posts_org_fk FOREIGN KEY (org_id) REFERENCES auth.orgs (id)
        );",
    );
    let IrNode::CreateTable(ct) = node else {
        panic!("expected CreateTable");
    };
    let fks: Vec<_> = ct
        .constraints
        .iter()
        .filter_map(|c| match c {
            TableConstraint::ForeignKey {
                name,
                columns,
                ref_table,
                ..
            } => Some((name.clone(), columns.clone(), ref_table.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        fks,
        vec![
            (
                None,
                vec!["author_id".to_string()],
                QualifiedName::unqualified("users")
            ),
            (
                Some("posts_org_fk".to_string()),
                vec!["org_id".to_string()],
                QualifiedName::qualified("auth", "orgs")
            ),
        ]
    );
}

#[test]
fn test_alter_table_row_security_and_fk() {
    let node = single(
        "ALTER TABLE public.posts ENABLE ROW LEVEL SECURITY, \
         ADD CONSTRAINT fk FOREIGN KEY (user_id) REFERENCES users (id);",
    );
    let IrNode::AlterTable(at) = node else {
        panic!("expected AlterTable");
    };
    assert_eq!(at.name, QualifiedName::qualified("public", "posts"));
    assert_eq!(at.actions[0], AlterTableAction::EnableRowSecurity);
    assert!(matches!(
        &at.actions[1],
        AlterTableAction::AddConstraint(TableConstraint::ForeignKey { columns, .. }) if columns == &["user_id"]
    ));
}

#[test]
fn test_alter_table_add_column_with_reference() {
    let node = single("ALTER TABLE posts ADD COLUMN team_id uuid REFERENCES teams (id);");
    let IrNode::AlterTable(at) = node else {
        panic!("expected AlterTable");
    };
    assert!(matches!(&at.actions[0], AlterTableAction::AddColumn(c) if c.name == "team_id"));
    assert!(matches!(
        &at.actions[1],
        AlterTableAction::AddConstraint(TableConstraint::ForeignKey { columns, .. }) if columns == &["team_id"]
    ));
}

#[test]
fn test_alter_table_disable_row_security() {
    let node = single("ALTER TABLE posts DISABLE ROW LEVEL SECURITY;");
    let IrNode::AlterTable(at) = node else {
        panic!("expected AlterTable");
    };
    assert_eq!(at.actions, vec![AlterTableAction::DisableRowSecurity]);
}

// -----------------------------------------------------------------------
// Indexes and drops
// -----------------------------------------------------------------------

#[test]
fn test_create_index_columns_in_order() {
    let node = single("CREATE UNIQUE INDEX idx_a_b ON public.t (b, a);");
    let IrNode::CreateIndex(ci) = node else {
        panic!("expected CreateIndex");
    };
    assert_eq!(ci.index_name.as_deref(), Some("idx_a_b"));
    assert_eq!(ci.table_name, QualifiedName::qualified("public", "t"));
    assert!(ci.unique);
    assert_eq!(
        ci.columns,
        vec![IndexColumn::Column("b".into()), IndexColumn::Column("a".into())]
    );
}

#[test]
fn test_expression_index_column() {
    let node = single("CREATE INDEX idx_lower ON users (lower(email));");
    let IrNode::CreateIndex(ci) = node else {
        panic!("expected CreateIndex");
    };
    assert!(matches!(&ci.columns[0], IndexColumn::Expression(e) if e.contains("lower")));
}

#[test]
fn test_drop_table_multiple_targets() {
    let stmts = parse("DROP TABLE IF EXISTS a, app.b;");
    let names: Vec<_> = stmts
        .iter()
        .map(|s| match &s.node {
            IrNode::Drop(d) => {
                assert_eq!(d.kind, DropKind::Table);
                assert!(d.if_exists);
                d.name.clone()
            }
            other => panic!("expected Drop, got {other:?}"),
        })
        .collect();
    assert_eq!(
        names,
        vec![
            QualifiedName::unqualified("a"),
            QualifiedName::qualified("app", "b")
        ]
    );
}

#[test]
fn test_drop_index_and_view() {
    assert!(matches!(
        single("DROP INDEX idx_x;"),
        IrNode::Drop(DropObject { kind: DropKind::Index, .. })
    ));
    assert!(matches!(
        single("DROP VIEW v;"),
        IrNode::Drop(DropObject { kind: DropKind::View, .. })
    ));
}

#[test]
fn test_drop_schema_is_unrecognized() {
    assert!(matches!(single("DROP SCHEMA s;"), IrNode::Unrecognized { .. }));
}

// -----------------------------------------------------------------------
// Policies
// -----------------------------------------------------------------------

#[test]
fn test_policy_defaults() {
    let node = single("CREATE POLICY p ON posts USING (true);");
    let IrNode::CreatePolicy(p) = node else {
        panic!("expected CreatePolicy");
    };
    assert_eq!(p.name, "p");
    assert_eq!(p.command, PolicyCommand::All);
    assert!(p.permissive);
    assert!(p.roles.is_empty());
}

#[test]
fn test_policy_restrictive_with_roles() {
    let node = single(
        "CREATE POLICY p ON public.posts AS RESTRICTIVE FOR UPDATE TO authenticated, anon USING (auth.uid() = user_id);",
    );
    let IrNode::CreatePolicy(p) = node else {
        panic!("expected CreatePolicy");
    };
    assert_eq!(p.command, PolicyCommand::Update);
    assert!(!p.permissive);
    assert_eq!(p.roles, vec!["authenticated", "anon"]);
}

#[test]
fn test_policy_public_role() {
    let node = single("CREATE POLICY p ON posts FOR SELECT TO public USING (true);");
    let IrNode::CreatePolicy(p) = node else {
        panic!("expected CreatePolicy");
    };
    assert_eq!(p.command, PolicyCommand::Select);
    assert_eq!(p.roles, vec!["public"]);
}

// -----------------------------------------------------------------------
// Views, functions, extensions
// -----------------------------------------------------------------------

#[test]
fn test_view_options() {
    let node = single(
        "CREATE VIEW public.v WITH (security_invoker = true, security_barrier) AS SELECT 1;",
    );
    let IrNode::CreateView(v) = node else {
        panic!("expected CreateView");
    };
    assert_eq!(v.name, QualifiedName::qualified("public", "v"));
    assert!(v.option_enabled("security_invoker"));
    assert!(v.option_enabled("security_barrier"));
}

#[test]
fn test_view_security_invoker_false() {
    let node = single("CREATE VIEW v WITH (security_invoker = false) AS SELECT 1;");
    let IrNode::CreateView(v) = node else {
        panic!("expected CreateView");
    };
    assert!(v.option_disabled("security_invoker"));
    assert!(!v.option_enabled("security_invoker"));
}

#[test]
fn test_materialized_view() {
    let node = single("CREATE MATERIALIZED VIEW stats AS SELECT count(*) FROM users;");
    assert!(matches!(
        node,
        IrNode::CreateMaterializedView(CreateMaterializedView { ref name }) if name.name == "stats"
    ));
}

#[test]
fn test_plain_create_table_as_is_unrecognized() {
    let node = single("CREATE TABLE copy AS SELECT 1;");
    assert!(matches!(node, IrNode::Unrecognized { ref kind } if kind == "CreateTableAsStmt"));
}

#[test]
fn test_foreign_table() {
    let node = single("CREATE FOREIGN TABLE remote_users (id int) SERVER upstream;");
    let IrNode::CreateForeignTable(ft) = node else {
        panic!("expected CreateForeignTable");
    };
    assert_eq!(ft.name, QualifiedName::unqualified("remote_users"));
    assert_eq!(ft.server, "upstream");
}

#[test]
fn test_security_definer_function_without_search_path() {
    let node = single(
        "CREATE FUNCTION public.whoami() RETURNS uuid LANGUAGE sql SECURITY DEFINER AS $$ SELECT auth.uid() $$;",
    );
    let IrNode::CreateFunction(f) = node else {
        panic!("expected CreateFunction");
    };
    assert_eq!(f.name, QualifiedName::qualified("public", "whoami"));
    assert!(f.security_definer);
    assert!(!f.sets_search_path);
}

#[test]
fn test_function_with_search_path() {
    let node = single(
        "CREATE FUNCTION f() RETURNS int LANGUAGE sql SECURITY DEFINER SET search_path = '' AS $$ SELECT 1 $$;",
    );
    let IrNode::CreateFunction(f) = node else {
        panic!("expected CreateFunction");
    };
    assert!(f.security_definer);
    assert!(f.sets_search_path);
}

#[test]
fn test_security_invoker_function() {
    let node = single("CREATE FUNCTION f() RETURNS int LANGUAGE sql AS $$ SELECT 1 $$;");
    let IrNode::CreateFunction(f) = node else {
        panic!("expected CreateFunction");
    };
    assert!(!f.security_definer);
}

#[test]
fn test_extension_schema() {
    let node = single("CREATE EXTENSION IF NOT EXISTS pgcrypto WITH SCHEMA extensions;");
    let IrNode::CreateExtension(ext) = node else {
        panic!("expected CreateExtension");
    };
    assert_eq!(ext.name, "pgcrypto");
    assert_eq!(ext.schema.as_deref(), Some("extensions"));
    assert!(ext.if_not_exists);

    let node = single("CREATE EXTENSION pg_trgm;");
    assert!(matches!(node, IrNode::CreateExtension(CreateExtension { schema: None, .. })));
}

#[test]
fn test_unrecognized_keeps_parser_tag() {
    let node = single("GRANT SELECT ON posts TO anon;");
    assert!(matches!(node, IrNode::Unrecognized { ref kind } if kind == "GrantStmt"));
}
