//! External ignore list
//!
//! One entry per line in the form `ruleId[:file[:line]]`. Blank lines and
//! lines starting with `#` are skipped.
//!
//! ```text
//! # generated by the auth extension
//! no-table-without-pk:supabase/migrations/0001_auth.sql
//! schema/fk-without-index:*
//! no-sensitive-columns:profiles.sql:12
//! ```

use std::path::Path;

use crate::suppress::WILDCARD;

/// Default ignore file name, looked up in the working directory.
pub const DEFAULT_IGNORE_FILE: &str = ".schemalintignore";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreEntry {
    pub rule_id: String,
    /// Substring matched against the diagnostic's file path. `None` matches
    /// every file.
    pub file: Option<String>,
    /// Exact line; only meaningful together with `file`.
    pub line: Option<usize>,
}

impl IgnoreEntry {
    /// Parse a single entry. Returns `None` for blank and comment lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let mut parts = line.splitn(3, ':');
        let rule_id = parts.next()?.trim().to_string();
        if rule_id.is_empty() {
            return None;
        }

        let file = parts
            .next()
            .map(str::trim)
            .filter(|f| !f.is_empty() && *f != WILDCARD)
            .map(str::to_string);
        // An unparseable line number widens the entry to the whole file.
        let line = file
            .as_ref()
            .and(parts.next())
            .and_then(|l| l.trim().parse().ok());

        Some(Self {
            rule_id,
            file,
            line,
        })
    }

    /// Whether this entry silences `rule_id` reported at `file:line`.
    pub fn matches(&self, rule_id: &str, file: &Path, line: Option<usize>) -> bool {
        if self.rule_id != rule_id && self.rule_id != WILDCARD {
            return false;
        }
        let Some(pattern) = &self.file else {
            return true;
        };
        // Compare with forward slashes so entries are portable.
        let path = file.to_string_lossy().replace('\\', "/");
        path.contains(pattern.as_str()) && self.line.is_none_or(|l| Some(l) == line)
    }
}

/// Parse the full contents of an ignore file.
pub fn parse_ignore_list(content: &str) -> Vec<IgnoreEntry> {
    content.lines().filter_map(IgnoreEntry::parse).collect()
}

/// Load an ignore file. A missing or unreadable file yields an empty list.
pub fn load_ignore_file(path: &Path) -> Vec<IgnoreEntry> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let entries = parse_ignore_list(&content);
            tracing::debug!(path = %path.display(), entries = entries.len(), "loaded ignore file");
            entries
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "could not read ignore file, ignoring it");
            Vec::new()
        }
    }
}

/// Whether any entry silences the diagnostic.
pub fn is_ignored(entries: &[IgnoreEntry], rule_id: &str, file: &Path, line: Option<usize>) -> bool {
    entries.iter().any(|e| e.matches(rule_id, file, line))
}
