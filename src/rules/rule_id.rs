use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use crate::model::SchemaModel;
use crate::parser::ir::{Statement, StatementKind};
use crate::rules::{
    ActiveRule, Category, Diagnostic, Rule, RuleContext, RuleScope, schema, severity::Severity,
};

/// Strongly-typed rule identifier.
///
/// A flat enum covering both rule scopes. Match statements are exhaustive:
/// adding a variant forces updates to the descriptor tables below and to
/// the dispatch in `check_file` / `check_schema`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumString, IntoStaticStr,
)]
pub enum RuleId {
    // File scope
    /// `CREATE TABLE` without a primary key.
    #[strum(serialize = "no-table-without-pk")]
    NoTableWithoutPk,
    /// Column names that look like credentials or personal data.
    #[strum(serialize = "no-sensitive-columns")]
    NoSensitiveColumns,
    /// `CREATE EXTENSION` into the `public` schema.
    #[strum(serialize = "no-extension-in-public")]
    NoExtensionInPublic,
    /// View with `security_invoker = false` and no `security_barrier`.
    #[strum(serialize = "no-security-definer-view")]
    NoSecurityDefinerView,
    /// `SECURITY DEFINER` function without `SET search_path`.
    #[strum(serialize = "function-search-path")]
    FunctionSearchPath,
    /// Public view or materialized view over `auth.users`.
    #[strum(serialize = "auth-users-exposed")]
    AuthUsersExposed,
    /// Materialized view in `public`.
    #[strum(serialize = "ban-materialized-view-public")]
    BanMaterializedViewPublic,
    /// Foreign table in `public`.
    #[strum(serialize = "ban-foreign-table-public")]
    BanForeignTablePublic,
    /// Permissive policy whose `USING` / `WITH CHECK` is always true.
    #[strum(serialize = "rls-policy-always-true")]
    RlsPolicyAlwaysTrue,
    /// Policy reading user-editable metadata.
    #[strum(serialize = "rls-references-user-metadata")]
    RlsReferencesUserMetadata,

    // Schema scope
    /// Public table whose final state has RLS disabled.
    #[strum(serialize = "schema/table-without-rls")]
    TableWithoutRls,
    /// Foreign key with no index leading with its columns.
    #[strum(serialize = "schema/fk-without-index")]
    FkWithoutIndex,
    /// RLS enabled, no policies.
    #[strum(serialize = "schema/rls-without-policy")]
    RlsWithoutPolicy,
    /// Policies on a table without RLS.
    #[strum(serialize = "schema/policy-without-rls")]
    PolicyWithoutRls,
    /// Identical or prefix-redundant indexes.
    #[strum(serialize = "schema/duplicate-index")]
    DuplicateIndex,
    /// More than one permissive policy per table, command and role.
    #[strum(serialize = "schema/multiple-permissive-policies")]
    MultiplePermissivePolicies,
}

macro_rules! lint_docs {
    ($slug:literal) => {
        concat!(
            "https://supabase.com/docs/guides/database/database-linter?lint=",
            $slug
        )
    };
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn file_rules() -> impl Iterator<Item = Self> {
        Self::iter().filter(|r| r.scope() == RuleScope::File)
    }

    pub fn schema_rules() -> impl Iterator<Item = Self> {
        Self::iter().filter(|r| r.scope() == RuleScope::Schema)
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuleId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for RuleId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = serde::Deserialize::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// `FromStr` is derived via `EnumString` from the `serialize` attributes.

impl Rule for RuleId {
    fn id(&self) -> Self {
        *self
    }

    fn name(&self) -> &'static str {
        match self {
            Self::NoTableWithoutPk => "No Table Without Primary Key",
            Self::NoSensitiveColumns => "No Sensitive Columns Exposed",
            Self::NoExtensionInPublic => "No Extension in Public Schema",
            Self::NoSecurityDefinerView => "No Security Definer View",
            Self::FunctionSearchPath => "Function Search Path Mutable",
            Self::AuthUsersExposed => "Auth Users Exposed",
            Self::BanMaterializedViewPublic => "Materialized View in Public Schema",
            Self::BanForeignTablePublic => "Foreign Table in Public Schema",
            Self::RlsPolicyAlwaysTrue => "RLS Policy Always True",
            Self::RlsReferencesUserMetadata => "RLS References User Metadata",
            Self::TableWithoutRls => "Table Without RLS",
            Self::FkWithoutIndex => "Foreign Key Without Index",
            Self::RlsWithoutPolicy => "RLS Without Policy",
            Self::PolicyWithoutRls => "Policy Without RLS",
            Self::DuplicateIndex => "Duplicate Index",
            Self::MultiplePermissivePolicies => "Multiple Permissive Policies",
        }
    }

    fn default_severity(&self) -> Severity {
        match self {
            Self::NoTableWithoutPk
            | Self::NoSecurityDefinerView
            | Self::AuthUsersExposed
            | Self::RlsReferencesUserMetadata
            | Self::TableWithoutRls
            | Self::PolicyWithoutRls => Severity::Error,
            Self::NoSensitiveColumns
            | Self::NoExtensionInPublic
            | Self::FunctionSearchPath
            | Self::BanMaterializedViewPublic
            | Self::BanForeignTablePublic
            | Self::RlsPolicyAlwaysTrue
            | Self::FkWithoutIndex
            | Self::RlsWithoutPolicy
            | Self::DuplicateIndex
            | Self::MultiplePermissivePolicies => Severity::Warning,
        }
    }

    fn category(&self) -> Category {
        match self {
            Self::NoTableWithoutPk
            | Self::FkWithoutIndex
            | Self::DuplicateIndex
            | Self::MultiplePermissivePolicies => Category::Performance,
            Self::NoExtensionInPublic => Category::Supabase,
            Self::NoSensitiveColumns
            | Self::NoSecurityDefinerView
            | Self::FunctionSearchPath
            | Self::AuthUsersExposed
            | Self::BanMaterializedViewPublic
            | Self::BanForeignTablePublic
            | Self::RlsPolicyAlwaysTrue
            | Self::RlsReferencesUserMetadata
            | Self::TableWithoutRls
            | Self::RlsWithoutPolicy
            | Self::PolicyWithoutRls => Category::Security,
        }
    }

    fn scope(&self) -> RuleScope {
        match self {
            Self::TableWithoutRls
            | Self::FkWithoutIndex
            | Self::RlsWithoutPolicy
            | Self::PolicyWithoutRls
            | Self::DuplicateIndex
            | Self::MultiplePermissivePolicies => RuleScope::Schema,
            _ => RuleScope::File,
        }
    }

    fn docs_url(&self) -> Option<&'static str> {
        let url = match self {
            Self::NoTableWithoutPk => lint_docs!("0004_no_primary_key"),
            Self::NoSensitiveColumns => lint_docs!("0023_sensitive_columns_exposed"),
            Self::NoExtensionInPublic => lint_docs!("0014_extension_in_public"),
            Self::NoSecurityDefinerView => lint_docs!("0010_security_definer_view"),
            Self::FunctionSearchPath => lint_docs!("0011_function_search_path_mutable"),
            Self::AuthUsersExposed => lint_docs!("0002_auth_users_exposed"),
            Self::BanMaterializedViewPublic => lint_docs!("0016_materialized_view_in_api"),
            Self::BanForeignTablePublic => lint_docs!("0017_foreign_table_in_api"),
            Self::RlsPolicyAlwaysTrue => lint_docs!("0024_permissive_rls_policy"),
            Self::RlsReferencesUserMetadata => lint_docs!("0015_rls_references_user_metadata"),
            Self::TableWithoutRls => lint_docs!("0013_rls_disabled_in_public"),
            Self::FkWithoutIndex => lint_docs!("0001_unindexed_foreign_keys"),
            Self::RlsWithoutPolicy => lint_docs!("0008_rls_enabled_no_policy"),
            Self::PolicyWithoutRls => lint_docs!("0007_policy_exists_rls_disabled"),
            Self::DuplicateIndex => lint_docs!("0009_duplicate_index"),
            Self::MultiplePermissivePolicies => lint_docs!("0006_multiple_permissive_policies"),
        };
        Some(url)
    }

    fn relevant_kinds(&self) -> &'static [StatementKind] {
        use StatementKind as K;
        match self {
            Self::NoTableWithoutPk | Self::NoSensitiveColumns => &[K::CreateTable],
            Self::NoExtensionInPublic => &[K::CreateExtension],
            Self::NoSecurityDefinerView => &[K::CreateView],
            Self::FunctionSearchPath => &[K::CreateFunction],
            Self::AuthUsersExposed => &[K::CreateView, K::CreateMaterializedView],
            Self::BanMaterializedViewPublic => &[K::CreateMaterializedView],
            Self::BanForeignTablePublic => &[K::CreateForeignTable],
            Self::RlsPolicyAlwaysTrue | Self::RlsReferencesUserMetadata => &[K::CreatePolicy],
            Self::TableWithoutRls
            | Self::FkWithoutIndex
            | Self::RlsWithoutPolicy
            | Self::PolicyWithoutRls
            | Self::DuplicateIndex
            | Self::MultiplePermissivePolicies => &[],
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::NoTableWithoutPk => super::no_table_without_pk::DESCRIPTION,
            Self::NoSensitiveColumns => super::no_sensitive_columns::DESCRIPTION,
            Self::NoExtensionInPublic => super::no_extension_in_public::DESCRIPTION,
            Self::NoSecurityDefinerView => super::no_security_definer_view::DESCRIPTION,
            Self::FunctionSearchPath => super::function_search_path::DESCRIPTION,
            Self::AuthUsersExposed => super::auth_users_exposed::DESCRIPTION,
            Self::BanMaterializedViewPublic => super::ban_materialized_view_public::DESCRIPTION,
            Self::BanForeignTablePublic => super::ban_foreign_table_public::DESCRIPTION,
            Self::RlsPolicyAlwaysTrue => super::rls_policy_always_true::DESCRIPTION,
            Self::RlsReferencesUserMetadata => super::rls_references_user_metadata::DESCRIPTION,
            Self::TableWithoutRls => schema::table_without_rls::DESCRIPTION,
            Self::FkWithoutIndex => schema::fk_without_index::DESCRIPTION,
            Self::RlsWithoutPolicy => schema::rls_without_policy::DESCRIPTION,
            Self::PolicyWithoutRls => schema::policy_without_rls::DESCRIPTION,
            Self::DuplicateIndex => schema::duplicate_index::DESCRIPTION,
            Self::MultiplePermissivePolicies => schema::multiple_permissive_policies::DESCRIPTION,
        }
    }

    fn explain(&self) -> &'static str {
        match self {
            Self::NoTableWithoutPk => super::no_table_without_pk::EXPLAIN,
            Self::NoSensitiveColumns => super::no_sensitive_columns::EXPLAIN,
            Self::NoExtensionInPublic => super::no_extension_in_public::EXPLAIN,
            Self::NoSecurityDefinerView => super::no_security_definer_view::EXPLAIN,
            Self::FunctionSearchPath => super::function_search_path::EXPLAIN,
            Self::AuthUsersExposed => super::auth_users_exposed::EXPLAIN,
            Self::BanMaterializedViewPublic => super::ban_materialized_view_public::EXPLAIN,
            Self::BanForeignTablePublic => super::ban_foreign_table_public::EXPLAIN,
            Self::RlsPolicyAlwaysTrue => super::rls_policy_always_true::EXPLAIN,
            Self::RlsReferencesUserMetadata => super::rls_references_user_metadata::EXPLAIN,
            Self::TableWithoutRls => schema::table_without_rls::EXPLAIN,
            Self::FkWithoutIndex => schema::fk_without_index::EXPLAIN,
            Self::RlsWithoutPolicy => schema::rls_without_policy::EXPLAIN,
            Self::PolicyWithoutRls => schema::policy_without_rls::EXPLAIN,
            Self::DuplicateIndex => schema::duplicate_index::EXPLAIN,
            Self::MultiplePermissivePolicies => schema::multiple_permissive_policies::EXPLAIN,
        }
    }

    fn check_file(&self, statements: &[&Statement], ctx: &mut RuleContext<'_>) {
        match self {
            Self::NoTableWithoutPk => super::no_table_without_pk::check(statements, ctx),
            Self::NoSensitiveColumns => super::no_sensitive_columns::check(statements, ctx),
            Self::NoExtensionInPublic => super::no_extension_in_public::check(statements, ctx),
            Self::NoSecurityDefinerView => super::no_security_definer_view::check(statements, ctx),
            Self::FunctionSearchPath => super::function_search_path::check(statements, ctx),
            Self::AuthUsersExposed => super::auth_users_exposed::check(statements, ctx),
            Self::BanMaterializedViewPublic => {
                super::ban_materialized_view_public::check(statements, ctx)
            }
            Self::BanForeignTablePublic => super::ban_foreign_table_public::check(statements, ctx),
            Self::RlsPolicyAlwaysTrue => super::rls_policy_always_true::check(statements, ctx),
            Self::RlsReferencesUserMetadata => {
                super::rls_references_user_metadata::check(statements, ctx)
            }
            Self::TableWithoutRls
            | Self::FkWithoutIndex
            | Self::RlsWithoutPolicy
            | Self::PolicyWithoutRls
            | Self::DuplicateIndex
            | Self::MultiplePermissivePolicies => {}
        }
    }

    fn check_schema(&self, model: &SchemaModel, rule: &ActiveRule) -> Vec<Diagnostic> {
        match self {
            Self::TableWithoutRls => schema::table_without_rls::check(model, rule),
            Self::FkWithoutIndex => schema::fk_without_index::check(model, rule),
            Self::RlsWithoutPolicy => schema::rls_without_policy::check(model, rule),
            Self::PolicyWithoutRls => schema::policy_without_rls::check(model, rule),
            Self::DuplicateIndex => schema::duplicate_index::check(model, rule),
            Self::MultiplePermissivePolicies => {
                schema::multiple_permissive_policies::check(model, rule)
            }
            Self::NoTableWithoutPk
            | Self::NoSensitiveColumns
            | Self::NoExtensionInPublic
            | Self::NoSecurityDefinerView
            | Self::FunctionSearchPath
            | Self::AuthUsersExposed
            | Self::BanMaterializedViewPublic
            | Self::BanForeignTablePublic
            | Self::RlsPolicyAlwaysTrue
            | Self::RlsReferencesUserMetadata => vec![],
        }
    }
}
