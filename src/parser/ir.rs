//! Intermediate Representation (IR) for SQL statements
//!
//! The IR layer decouples the parser from the model builder and rules. It
//! carries only the structural facts the rules need, not the full PostgreSQL AST.

use std::fmt;

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// A parsed SQL statement mapped to a high-level operation.
///
/// Closed set of recognized statement forms plus a catch-all that keeps the
/// parser's tag, so forward-compatible input is tolerated without an error.
#[derive(Debug, Clone, PartialEq)]
pub enum IrNode {
    CreateTable(CreateTable),
    AlterTable(AlterTable),
    CreateIndex(CreateIndex),
    CreatePolicy(CreatePolicy),
    CreateView(CreateView),
    CreateMaterializedView(CreateMaterializedView),
    CreateForeignTable(CreateForeignTable),
    CreateFunction(CreateFunction),
    CreateExtension(CreateExtension),
    Drop(DropObject),
    /// SQL that parsed successfully but has no IR mapping (GRANT, COMMENT ON, DO, ...).
    Unrecognized { kind: String },
}

impl IrNode {
    pub fn kind(&self) -> StatementKind {
        match self {
            IrNode::CreateTable(_) => StatementKind::CreateTable,
            IrNode::AlterTable(_) => StatementKind::AlterTable,
            IrNode::CreateIndex(_) => StatementKind::CreateIndex,
            IrNode::CreatePolicy(_) => StatementKind::CreatePolicy,
            IrNode::CreateView(_) => StatementKind::CreateView,
            IrNode::CreateMaterializedView(_) => StatementKind::CreateMaterializedView,
            IrNode::CreateForeignTable(_) => StatementKind::CreateForeignTable,
            IrNode::CreateFunction(_) => StatementKind::CreateFunction,
            IrNode::CreateExtension(_) => StatementKind::CreateExtension,
            IrNode::Drop(_) => StatementKind::Drop,
            IrNode::Unrecognized { .. } => StatementKind::Unrecognized,
        }
    }
}

/// Discriminant of [`IrNode`], used to index a file's statements for rule dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr)]
pub enum StatementKind {
    CreateTable,
    AlterTable,
    CreateIndex,
    CreatePolicy,
    CreateView,
    CreateMaterializedView,
    CreateForeignTable,
    CreateFunction,
    CreateExtension,
    Drop,
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: QualifiedName,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
}

impl CreateTable {
    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.is_inline_pk)
            || self
                .constraints
                .iter()
                .any(|c| matches!(c, TableConstraint::PrimaryKey { .. }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    pub name: QualifiedName,
    pub actions: Vec<AlterTableAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableAction {
    AddColumn(ColumnDef),
    AddConstraint(TableConstraint),
    EnableRowSecurity,
    DisableRowSecurity,
    /// Catch-all for ALTER TABLE actions we parse but don't model.
    Other {
        description: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub index_name: Option<String>,
    pub table_name: QualifiedName,
    pub columns: Vec<IndexColumn>,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexColumn {
    Column(String),
    /// Expression element, kept as deparsed text.
    Expression(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePolicy {
    pub name: String,
    pub table: QualifiedName,
    pub command: PolicyCommand,
    pub permissive: bool,
    /// Empty when the statement has no `TO` clause.
    pub roles: Vec<String>,
}

/// Command a policy applies to. `All` covers the four base commands.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    serde::Serialize,
)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyCommand {
    Select,
    Insert,
    Update,
    Delete,
    All,
}

impl PolicyCommand {
    pub const BASE: [PolicyCommand; 4] = [
        PolicyCommand::Select,
        PolicyCommand::Insert,
        PolicyCommand::Update,
        PolicyCommand::Delete,
    ];

    /// Base commands this command stands for.
    pub fn expand(self) -> &'static [PolicyCommand] {
        match self {
            PolicyCommand::All => &Self::BASE,
            PolicyCommand::Select => &[PolicyCommand::Select],
            PolicyCommand::Insert => &[PolicyCommand::Insert],
            PolicyCommand::Update => &[PolicyCommand::Update],
            PolicyCommand::Delete => &[PolicyCommand::Delete],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateView {
    pub name: QualifiedName,
    /// `WITH (...)` reloptions in declaration order.
    pub options: Vec<RelOption>,
}

impl CreateView {
    pub fn option(&self, name: &str) -> Option<&RelOption> {
        self.options
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
    }

    /// True when the option is present and set to a boolean-like true value.
    /// A bare option (`WITH (security_invoker)`) counts as true.
    pub fn option_enabled(&self, name: &str) -> bool {
        self.option(name).is_some_and(RelOption::is_truthy)
    }

    /// True when the option is present and explicitly set to a false value.
    pub fn option_disabled(&self, name: &str) -> bool {
        self.option(name).is_some_and(RelOption::is_falsy)
    }
}

/// A `name [= value]` storage option.
#[derive(Debug, Clone, PartialEq)]
pub struct RelOption {
    pub name: String,
    pub value: Option<String>,
}

impl RelOption {
    pub fn is_truthy(&self) -> bool {
        match &self.value {
            None => true,
            Some(v) => matches!(
                v.to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "on"
            ),
        }
    }

    pub fn is_falsy(&self) -> bool {
        self.value.as_deref().is_some_and(|v| {
            matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off")
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateMaterializedView {
    pub name: QualifiedName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateForeignTable {
    pub name: QualifiedName,
    pub server: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateFunction {
    pub name: QualifiedName,
    pub security_definer: bool,
    /// `SET search_path = ...` appears among the function options.
    pub sets_search_path: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateExtension {
    pub name: String,
    /// Target of `WITH SCHEMA`, if given.
    pub schema: Option<String>,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropObject {
    pub kind: DropKind,
    pub name: QualifiedName,
    pub if_exists: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropKind {
    Table,
    Index,
    View,
    MaterializedView,
}

// --- Supporting types ---

/// Schema-qualified name. `schema` is None for unqualified references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub schema: Option<String>,
    pub name: String,
}

pub const DEFAULT_SCHEMA: &str = "public";

impl QualifiedName {
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Schema, with unqualified names resolving to `public`.
    pub fn schema_or_default(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    /// `schema.name` key used by the schema model.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema_or_default(), self.name)
    }

    pub fn is_public(&self) -> bool {
        self.schema_or_default() == DEFAULT_SCHEMA
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(s) => write!(f, "{}.{}", s, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    /// Base type name, lowercased (`int4`, `text`, `uuid`, ...).
    pub type_name: String,
    pub nullable: bool, // true = nullable (default), false = NOT NULL
    /// True if this column has an inline PRIMARY KEY constraint.
    pub is_inline_pk: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    PrimaryKey {
        columns: Vec<String>,
    },
    ForeignKey {
        name: Option<String>,
        columns: Vec<String>,
        ref_table: QualifiedName,
        ref_columns: Vec<String>,
    },
    Unique {
        name: Option<String>,
        columns: Vec<String>,
    },
}

/// A parsed statement with its source text and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub node: IrNode,
    pub raw_sql: String,
    pub span: SourceSpan,
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        self.node.kind()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpan {
    pub start_line: usize,   // 1-based
    pub end_line: usize,     // 1-based, inclusive
    pub start_offset: usize, // byte offset from start of file
    pub end_offset: usize,
}
