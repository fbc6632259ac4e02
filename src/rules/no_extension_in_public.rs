//! no-extension-in-public: extension installed into `public`

use crate::parser::ir::{DEFAULT_SCHEMA, IrNode, Statement};
use crate::rules::{Fix, RuleContext};

pub(super) const DESCRIPTION: &str =
    "Extensions should be installed in \"extensions\" schema, not public";

pub(super) const EXPLAIN: &str = "no-extension-in-public: Extension in public schema\n\
         \n\
         What it detects:\n\
         CREATE EXTENSION without WITH SCHEMA, or WITH SCHEMA public.\n\
         \n\
         Why it matters:\n\
         Objects an extension creates in public are exposed through the API\n\
         and clutter the schema that application tables live in.\n\
         \n\
         Example (bad):\n\
           CREATE EXTENSION pg_trgm;\n\
         \n\
         Fix:\n\
           CREATE EXTENSION IF NOT EXISTS \"pg_trgm\" WITH SCHEMA extensions;";

pub(super) fn check(statements: &[&Statement], ctx: &mut RuleContext<'_>) {
    for stmt in statements {
        let IrNode::CreateExtension(ext) = &stmt.node else {
            continue;
        };
        let in_public = ext
            .schema
            .as_deref()
            .is_none_or(|s| s == DEFAULT_SCHEMA);
        if !in_public {
            continue;
        }

        let name = &ext.name;
        ctx.report(
            stmt.span.start_line,
            format!("Extension \"{name}\" is being installed in public schema"),
            Some(Fix::new(
                format!("Install {name} in extensions schema"),
                format!("CREATE EXTENSION IF NOT EXISTS \"{name}\" WITH SCHEMA extensions;"),
            )),
        );
    }
}
