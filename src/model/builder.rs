//! Test harness for building schema model state
//!
//! Fluent API for constructing a [`SchemaModel`] in schema-rule tests
//! without going through the parser.
//!
//! ```rust,ignore
//! let model = ModelBuilder::new()
//!     .table("public.orders", |t| {
//!         t.pk().rls().fk(&["customer_id"], "public.customers");
//!     })
//!     .index("public.orders", "idx_customer", &["customer_id"], false)
//!     .policy("public.orders", "read_own", PolicyCommand::Select, &["authenticated"])
//!     .build();
//! ```

use std::path::PathBuf;

use crate::model::types::*;
use crate::parser::ir::PolicyCommand;

/// Builder for constructing a SchemaModel in tests
pub struct ModelBuilder {
    model: SchemaModel,
    file: PathBuf,
    line: usize,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            model: SchemaModel::new(),
            file: PathBuf::from("migrations/001_init.sql"),
            line: 0,
        }
    }

    /// Each declared object gets the next line of the same file.
    fn next_provenance(&mut self) -> Provenance {
        self.line += 1;
        Provenance {
            file: self.file.clone(),
            line: self.line,
        }
    }

    /// Add a table given as `schema.name`. The closure configures it.
    pub fn table(mut self, full_name: &str, f: impl FnOnce(&mut TableBuilder)) -> Self {
        let (schema, name) = full_name.split_once('.').unwrap_or(("public", full_name));
        let mut builder = TableBuilder {
            state: TableInfo {
                name: name.to_string(),
                schema: schema.to_string(),
                has_primary_key: false,
                has_row_security: false,
                columns: vec![],
                foreign_keys: vec![],
                synthesized: false,
                provenance: self.next_provenance(),
            },
        };
        f(&mut builder);
        self.model.insert_table(builder.state);
        self
    }

    pub fn index(mut self, table: &str, name: &str, columns: &[&str], unique: bool) -> Self {
        let provenance = self.next_provenance();
        self.model.add_index(IndexInfo {
            name: name.to_string(),
            table: table.to_string(),
            columns: columns.iter().map(|s| s.to_string()).collect(),
            unique,
            provenance,
        });
        self
    }

    /// Add a permissive policy.
    pub fn policy(self, table: &str, name: &str, command: PolicyCommand, roles: &[&str]) -> Self {
        self.policy_with(table, name, command, roles, true)
    }

    pub fn policy_with(
        mut self,
        table: &str,
        name: &str,
        command: PolicyCommand,
        roles: &[&str],
        permissive: bool,
    ) -> Self {
        let provenance = self.next_provenance();
        self.model.add_policy(PolicyInfo {
            name: name.to_string(),
            table: table.to_string(),
            command,
            permissive,
            roles: roles.iter().map(|s| s.to_string()).collect(),
            provenance,
        });
        self
    }

    pub fn build(self) -> SchemaModel {
        self.model
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing a TableInfo in tests
pub struct TableBuilder {
    state: TableInfo,
}

impl TableBuilder {
    pub fn column(&mut self, name: &str, type_name: &str, nullable: bool) -> &mut Self {
        self.state.columns.push(ColumnInfo {
            name: name.to_string(),
            type_name: type_name.to_string(),
            nullable,
        });
        self
    }

    pub fn pk(&mut self) -> &mut Self {
        self.state.has_primary_key = true;
        self
    }

    pub fn rls(&mut self) -> &mut Self {
        self.state.has_row_security = true;
        self
    }

    pub fn fk(&mut self, columns: &[&str], ref_table: &str) -> &mut Self {
        self.state.foreign_keys.push(ForeignKeyInfo {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            ref_table: ref_table.to_string(),
            ref_columns: vec!["id".to_string()],
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_builder_basic() {
        let model = ModelBuilder::new()
            .table("public.users", |t| {
                t.column("id", "uuid", false).pk().rls();
            })
            .index("public.users", "idx_users_id", &["id"], true)
            .build();

        let users = model.get_table("public.users").expect("table");
        assert!(users.has_primary_key);
        assert!(users.has_row_security);
        assert_eq!(users.provenance.line, 1);
        assert_eq!(model.indexes_on("public.users").len(), 1);
        assert_eq!(model.indexes_on("public.users")[0].provenance.line, 2);
    }

    #[test]
    fn test_unqualified_table_defaults_to_public() {
        let model = ModelBuilder::new().table("orders", |_| {}).build();
        assert!(model.has_table("public.orders"));
    }
}
