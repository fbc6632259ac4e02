//! SQL parsing and IR generation

pub mod ir;
pub mod pg_query;

pub use ir::{
    AlterTable, AlterTableAction, ColumnDef, CreateExtension, CreateForeignTable, CreateFunction,
    CreateIndex, CreateMaterializedView, CreatePolicy, CreateTable, CreateView, DropKind,
    DropObject, IndexColumn, IrNode, PolicyCommand, QualifiedName, RelOption, SourceSpan,
    Statement, StatementKind, TableConstraint,
};
