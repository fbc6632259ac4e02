//! Schema model types
//!
//! The schema model represents the net effect of a sequence of migrations:
//! tables, indexes, row-level-security policies, views, functions and
//! extensions. It's built by replaying migrations in order and is read-only
//! once schema-scoped rules start.

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};

use crate::parser::ir::PolicyCommand;

/// Where an object was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub file: PathBuf,
    pub line: usize,
}

impl Provenance {
    pub fn new(file: &Path, line: usize) -> Self {
        Self {
            file: file.to_path_buf(),
            line,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    /// `schema.name` → table, in order of first creation.
    tables: IndexMap<String, TableInfo>,
    /// `schema.table` → indexes on that table, in migration order.
    indexes: IndexMap<String, Vec<IndexInfo>>,
    /// `schema.table` → policies on that table, in migration order.
    policies: IndexMap<String, Vec<PolicyInfo>>,
    views: IndexMap<String, ViewInfo>,
    functions: IndexMap<String, FunctionInfo>,
    extensions: IndexSet<String>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_table(&self, full_name: &str) -> Option<&TableInfo> {
        self.tables.get(full_name)
    }

    pub fn get_table_mut(&mut self, full_name: &str) -> Option<&mut TableInfo> {
        self.tables.get_mut(full_name)
    }

    pub fn has_table(&self, full_name: &str) -> bool {
        self.tables.contains_key(full_name)
    }

    /// Insert or replace a table. A replaced table keeps its position.
    pub fn insert_table(&mut self, table: TableInfo) {
        self.tables.insert(table.full_name(), table);
    }

    /// Remove a table together with the indexes and policies attached to it.
    pub fn remove_table(&mut self, full_name: &str) -> Option<TableInfo> {
        self.indexes.shift_remove(full_name);
        self.policies.shift_remove(full_name);
        self.tables.shift_remove(full_name)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&str, &TableInfo)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn add_index(&mut self, index: IndexInfo) {
        self.indexes
            .entry(index.table.clone())
            .or_default()
            .push(index);
    }

    /// Remove every index named `name` whose table lives in `schema`.
    pub fn remove_index(&mut self, schema: &str, name: &str) -> bool {
        let prefix = format!("{schema}.");
        let mut removed = false;
        for (table, list) in self.indexes.iter_mut() {
            if table.starts_with(&prefix) {
                let before = list.len();
                list.retain(|idx| idx.name != name);
                removed |= list.len() != before;
            }
        }
        self.indexes.retain(|_, list| !list.is_empty());
        removed
    }

    pub fn indexes_on(&self, full_table: &str) -> &[IndexInfo] {
        self.indexes
            .get(full_table)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn indexes(&self) -> impl Iterator<Item = (&str, &[IndexInfo])> {
        self.indexes.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn add_policy(&mut self, policy: PolicyInfo) {
        self.policies
            .entry(policy.table.clone())
            .or_default()
            .push(policy);
    }

    pub fn policies_on(&self, full_table: &str) -> &[PolicyInfo] {
        self.policies
            .get(full_table)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn policies(&self) -> impl Iterator<Item = (&str, &[PolicyInfo])> {
        self.policies.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn insert_view(&mut self, view: ViewInfo) {
        self.views.insert(view.full_name(), view);
    }

    pub fn remove_view(&mut self, full_name: &str) -> Option<ViewInfo> {
        self.views.shift_remove(full_name)
    }

    pub fn get_view(&self, full_name: &str) -> Option<&ViewInfo> {
        self.views.get(full_name)
    }

    pub fn views(&self) -> impl Iterator<Item = &ViewInfo> {
        self.views.values()
    }

    pub fn insert_function(&mut self, function: FunctionInfo) {
        self.functions.insert(function.name.clone(), function);
    }

    pub fn get_function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.get(name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionInfo> {
        self.functions.values()
    }

    pub fn add_extension(&mut self, name: &str) {
        self.extensions.insert(name.to_string());
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub name: String,
    pub schema: String,
    pub has_primary_key: bool,
    pub has_row_security: bool,
    pub columns: Vec<ColumnInfo>,
    pub foreign_keys: Vec<ForeignKeyInfo>,
    /// Entry was synthesized by `ENABLE ROW LEVEL SECURITY` on a table the
    /// model had not seen. Its primary key flag is assumed, not observed.
    pub synthesized: bool,
    pub provenance: Provenance,
}

impl TableInfo {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub type_name: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyInfo {
    pub columns: Vec<String>,
    /// `schema.table` of the referenced table.
    pub ref_table: String,
    pub ref_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexInfo {
    pub name: String,
    /// `schema.table` the index is on.
    pub table: String,
    /// Indexed columns in key order. Expression elements are kept as text.
    pub columns: Vec<String>,
    pub unique: bool,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyInfo {
    pub name: String,
    /// `schema.table` the policy is attached to.
    pub table: String,
    pub command: PolicyCommand,
    pub permissive: bool,
    /// Never empty: a policy without `TO` applies to `public`.
    pub roles: Vec<String>,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewInfo {
    pub name: String,
    pub schema: String,
    pub security_invoker: bool,
    /// Raw text mentions the `auth.users` identity table.
    pub references_auth_users: bool,
    pub provenance: Provenance,
}

impl ViewInfo {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    /// `schema.name`; unqualified functions land in `public`.
    pub name: String,
    pub security_definer: bool,
    pub has_explicit_search_path: bool,
    pub provenance: Provenance,
}
