//! Fix aggregation
//!
//! Corrective statements are appended to the end of the file they were
//! reported in. Nothing already in the file is touched, so applied
//! migrations keep their text as a prefix.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::cache::StatementCache;
use crate::rules::{Diagnostic, Fix};

/// Block appended for one fix.
pub fn fix_block(fix: &Fix) -> String {
    format!("\n\n-- Autofix: {}\n{}", fix.description, fix.statement)
}

/// New content for every file with at least one fixable diagnostic.
///
/// Fix blocks follow diagnostic order. A statement already appended to a
/// file is not appended again. Files missing from `cache` are skipped.
pub fn aggregate_fixes(diagnostics: &[Diagnostic], cache: &StatementCache) -> BTreeMap<PathBuf, String> {
    let mut fixed: BTreeMap<PathBuf, String> = BTreeMap::new();
    let mut applied: HashSet<(&Path, &str)> = HashSet::new();

    for diagnostic in diagnostics {
        let Some(fix) = &diagnostic.fix else {
            continue;
        };
        if applied.contains(&(diagnostic.file.as_path(), fix.statement.as_str())) {
            continue;
        }
        if !fixed.contains_key(&diagnostic.file) {
            let Some(cached) = cache.get(&diagnostic.file) else {
                tracing::debug!(path = %diagnostic.file.display(), "fix target not in cache, skipping");
                continue;
            };
            fixed.insert(diagnostic.file.clone(), cached.content.clone());
        }
        if let Some(content) = fixed.get_mut(&diagnostic.file) {
            content.push_str(&fix_block(fix));
            applied.insert((diagnostic.file.as_path(), fix.statement.as_str()));
        }
    }

    fixed
}
