//! Migration ordering
//!
//! Orders migration files the way migration runners apply them:
//! 1. A leading 14-digit timestamp (`20240115123456_init.sql`) sorts first,
//!    compared by its digits.
//! 2. Otherwise a leading integer, optionally prefixed with `v`/`V`
//!    (`001_init.sql`, `V2__users.sql`), compared numerically.
//! 3. Everything else, and every tie, falls back to the file name.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum OrderKey<'a> {
    // Variant order is the sort order: timestamped files first.
    Timestamp(&'a str),
    Numbered(Numeric<'a>),
    Plain,
}

/// A decimal digit string compared by numeric value without parsing,
/// so arbitrarily long prefixes never overflow.
#[derive(Debug, PartialEq, Eq)]
struct Numeric<'a>(&'a str);

impl Numeric<'_> {
    fn significant(&self) -> &str {
        let trimmed = self.0.trim_start_matches('0');
        if trimmed.is_empty() { "0" } else { trimmed }
    }
}

impl Ord for Numeric<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.significant(), other.significant());
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    }
}

impl PartialOrd for Numeric<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

const TIMESTAMP_DIGITS: usize = 14;

fn file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
}

fn order_key(name: &str) -> OrderKey<'_> {
    let leading_digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if leading_digits >= TIMESTAMP_DIGITS {
        return OrderKey::Timestamp(&name[..TIMESTAMP_DIGITS]);
    }

    let unprefixed = name
        .strip_prefix('v')
        .or_else(|| name.strip_prefix('V'))
        .unwrap_or(name);
    let digits = unprefixed.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        OrderKey::Numbered(Numeric(&unprefixed[..digits]))
    } else {
        OrderKey::Plain
    }
}

/// Compare two migration paths by their file names.
///
/// A strict weak ordering: ties on the ordering key fall back to the file
/// name and then the full path, so sorting is reproducible for any input order.
pub fn migration_cmp(a: &Path, b: &Path) -> Ordering {
    let (a_name, b_name) = (file_name(a), file_name(b));
    order_key(a_name)
        .cmp(&order_key(b_name))
        .then_with(|| a_name.cmp(b_name))
        .then_with(|| a.cmp(b))
}

/// Sort paths into migration order in place.
pub fn sort_migrations(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| migration_cmp(a, b));
}
