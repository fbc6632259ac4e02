use super::*;
use crate::line_index::LineIndex;
use crate::parser::pg_query::parse_sql;
use std::path::PathBuf;

/// Helper: parse SQL and replay it into `model` as if it were `file`.
fn replay_sql(model: &mut SchemaModel, file: &str, sql: &str) {
    let statements = parse_sql(sql, &LineIndex::new(sql)).expect("valid SQL");
    apply(model, &statements, &PathBuf::from(file));
}

fn model_from(sql: &str) -> SchemaModel {
    let mut model = SchemaModel::new();
    replay_sql(&mut model, "001.sql", sql);
    model
}

// -----------------------------------------------------------------------
// Tables
// -----------------------------------------------------------------------

#[test]
fn test_create_table_registers_under_public() {
    let model = model_from("CREATE TABLE users (id uuid PRIMARY KEY, email text NOT NULL, bio text);");
    let users = model.get_table("public.users").expect("users");
    assert_eq!(users.schema, "public");
    assert!(users.has_primary_key);
    assert!(!users.has_row_security);
    assert!(!users.synthesized);
    assert_eq!(users.columns.len(), 3);
    assert!(!users.get_column("email").expect("email").nullable);
    assert!(users.get_column("bio").expect("bio").nullable);
    assert_eq!(users.provenance, Provenance::new(&PathBuf::from("001.sql"), 1));
}

#[test]
fn test_create_table_without_primary_key() {
    let model = model_from("CREATE TABLE app.logs (msg text);");
    let logs = model.get_table("app.logs").expect("logs");
    assert!(!logs.has_primary_key);
    assert!(model.get_table("public.logs").is_none());
}

#[test]
fn test_foreign_keys_inline_and_table_level() {
    let model = model_from(
        "CREATE TABLE posts (
            id int PRIMARY KEY,
            author_id uuid REFERENCES auth.users (id),
            team_id int,
            FOREIGN KEY (team_id) REFERENCES teams (id)
        );",
    );
    let posts = model.get_table("public.posts").expect("posts");
    assert_eq!(
        posts.foreign_keys,
        vec![
            ForeignKeyInfo {
                columns: vec!["author_id".into()],
                ref_table: "auth.users".into(),
                ref_columns: vec!["id".into()],
            },
            ForeignKeyInfo {
                columns: vec!["team_id".into()],
                ref_table: "public.teams".into(),
                ref_columns: vec!["id".into()],
            },
        ]
    );
}

#[test]
fn test_alter_table_toggles_row_security() {
    let mut model = model_from("CREATE TABLE t (id int PRIMARY KEY);");
    replay_sql(&mut model, "002.sql", "ALTER TABLE public.t ENABLE ROW LEVEL SECURITY;");
    assert!(model.get_table("public.t").expect("t").has_row_security);

    replay_sql(&mut model, "003.sql", "ALTER TABLE t DISABLE ROW LEVEL SECURITY;");
    assert!(!model.get_table("public.t").expect("t").has_row_security);
}

#[test]
fn test_enable_rls_on_unknown_table_synthesizes_entry() {
    let model = model_from("ALTER TABLE profiles ENABLE ROW LEVEL SECURITY;");
    let profiles = model.get_table("public.profiles").expect("synthesized");
    assert!(profiles.synthesized);
    assert!(profiles.has_row_security);
    assert!(profiles.has_primary_key, "synthesized tables assume a primary key");
}

#[test]
fn test_other_alters_on_unknown_table_are_skipped() {
    let model = model_from("ALTER TABLE ghosts ADD COLUMN x int;");
    assert!(!model.has_table("public.ghosts"));
}

#[test]
fn test_alter_table_adds_foreign_key_and_primary_key() {
    let mut model = model_from("CREATE TABLE t (id int, owner uuid);");
    replay_sql(
        &mut model,
        "002.sql",
        "ALTER TABLE t ADD PRIMARY KEY (id), ADD CONSTRAINT t_owner_fk FOREIGN KEY (owner) REFERENCES owners (id);",
    );
    let t = model.get_table("public.t").expect("t");
    assert!(t.has_primary_key);
    assert_eq!(t.foreign_keys.len(), 1);
    assert_eq!(t.foreign_keys[0].columns, vec!["owner"]);
}

#[test]
fn test_drop_table_removes_table_indexes_and_policies() {
    let mut model = model_from(
        "CREATE TABLE t (id int PRIMARY KEY);
         CREATE INDEX idx_t ON t (id);
         CREATE POLICY p ON t USING (true);",
    );
    replay_sql(&mut model, "002.sql", "DROP TABLE t;");
    assert!(!model.has_table("public.t"));
    assert!(model.indexes_on("public.t").is_empty());
    assert!(model.policies_on("public.t").is_empty());
}

#[test]
fn test_drop_table_in_other_schema_leaves_public_alone() {
    let mut model = model_from("CREATE TABLE t (id int PRIMARY KEY);");
    replay_sql(&mut model, "002.sql", "DROP TABLE app.t;");
    assert!(model.has_table("public.t"));
}

// -----------------------------------------------------------------------
// Indexes
// -----------------------------------------------------------------------

#[test]
fn test_indexes_accumulate_in_migration_order() {
    let mut model = model_from("CREATE INDEX idx_a ON t (a);");
    replay_sql(&mut model, "002.sql", "CREATE UNIQUE INDEX idx_ab ON public.t (a, b);");
    let indexes = model.indexes_on("public.t");
    assert_eq!(indexes.len(), 2);
    assert_eq!(indexes[0].name, "idx_a");
    assert_eq!(indexes[1].name, "idx_ab");
    assert_eq!(indexes[1].columns, vec!["a", "b"]);
    assert!(indexes[1].unique);
    assert_eq!(indexes[1].provenance.file, PathBuf::from("002.sql"));
}

#[test]
fn test_unnamed_index_is_skipped() {
    let model = model_from("CREATE INDEX ON t (a);");
    assert!(model.indexes_on("public.t").is_empty());
}

#[test]
fn test_expression_only_index_is_skipped() {
    let model = model_from("CREATE INDEX idx_lower ON t (lower(email));");
    assert!(model.indexes_on("public.t").is_empty());
}

#[test]
fn test_drop_index_removes_it() {
    let mut model = model_from("CREATE INDEX idx_a ON t (a); CREATE INDEX idx_b ON t (b);");
    replay_sql(&mut model, "002.sql", "DROP INDEX idx_a;");
    let names: Vec<_> = model
        .indexes_on("public.t")
        .iter()
        .map(|i| i.name.as_str())
        .collect();
    assert_eq!(names, vec!["idx_b"]);
}

// -----------------------------------------------------------------------
// Policies, views, functions, extensions
// -----------------------------------------------------------------------

#[test]
fn test_policy_defaults_applied() {
    let model = model_from("CREATE POLICY p ON posts USING (true);");
    let policies = model.policies_on("public.posts");
    assert_eq!(policies.len(), 1);
    assert_eq!(policies[0].command, PolicyCommand::All);
    assert!(policies[0].permissive);
    assert_eq!(policies[0].roles, vec!["public"]);
}

#[test]
fn test_policy_explicit_roles_and_command() {
    let model = model_from(
        "CREATE POLICY p ON posts AS RESTRICTIVE FOR DELETE TO authenticated USING (auth.uid() = owner);",
    );
    let p = &model.policies_on("public.posts")[0];
    assert_eq!(p.command, PolicyCommand::Delete);
    assert!(!p.permissive);
    assert_eq!(p.roles, vec!["authenticated"]);
}

#[test]
fn test_view_flags() {
    let model = model_from(
        "CREATE VIEW public.emails WITH (security_invoker = on) AS SELECT email FROM auth.users;
         CREATE VIEW stats AS SELECT count(*) FROM posts;",
    );
    let emails = model.get_view("public.emails").expect("emails");
    assert!(emails.security_invoker);
    assert!(emails.references_auth_users);

    let stats = model.get_view("public.stats").expect("stats");
    assert!(!stats.security_invoker);
    assert!(!stats.references_auth_users);
}

#[test]
fn test_drop_view_removes_it() {
    let mut model = model_from("CREATE VIEW v AS SELECT 1;");
    replay_sql(&mut model, "002.sql", "DROP VIEW v;");
    assert!(model.get_view("public.v").is_none());
}

#[test]
fn test_function_flags() {
    let model = model_from(
        "CREATE FUNCTION private.audit() RETURNS void LANGUAGE sql SECURITY DEFINER SET search_path = '' AS $$ SELECT 1 $$;",
    );
    let f = model.get_function("private.audit").expect("function");
    assert!(f.security_definer);
    assert!(f.has_explicit_search_path);
}

#[test]
fn test_extension_added() {
    let model = model_from("CREATE EXTENSION IF NOT EXISTS pgcrypto;");
    assert!(model.has_extension("pgcrypto"));
    assert_eq!(model.extensions().collect::<Vec<_>>(), vec!["pgcrypto"]);
}

#[test]
fn test_unrecognized_statements_leave_model_untouched() {
    let model = model_from("GRANT SELECT ON posts TO anon; COMMENT ON TABLE posts IS 'x';");
    assert_eq!(model.tables().count(), 0);
    assert_eq!(model.views().count(), 0);
}
