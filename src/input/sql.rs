//! SQL file collection
//!
//! Resolves file and directory arguments to `.sql` migration files, removes
//! duplicates and returns them in migration order.

use crate::input::LoadError;
use crate::input::order::sort_migrations;
use std::path::{Component, Path, PathBuf};

/// Collect migration files from the given paths.
///
/// Each path can be either a directory (all `.sql` files directly inside it
/// are taken) or a direct path to a `.sql` file. A path that does not exist
/// is an error. The result is deduplicated and sorted with
/// [`migration_cmp`](crate::input::migration_cmp).
pub fn collect_migration_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, LoadError> {
    let mut sql_files: Vec<PathBuf> = Vec::new();

    for path in paths {
        if path.is_dir() {
            sql_files.extend(collect_sql_files(path)?);
        } else if path.is_file() {
            if is_sql_file(path) {
                sql_files.push(path.clone());
            } else {
                tracing::debug!(path = %path.display(), "skipping non-SQL file");
            }
        } else {
            return Err(LoadError::Io {
                path: path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Path does not exist: {}", path.display()),
                ),
            });
        }
    }

    // `./m/001.sql` and `m/001.sql` name the same file. Path equality
    // already ignores interior `.` components but keeps a leading one.
    for file in &mut sql_files {
        *file = strip_cur_dir(file);
    }

    // Identical paths compare equal and end up adjacent after sorting.
    sort_migrations(&mut sql_files);
    sql_files.dedup();

    Ok(sql_files)
}

/// Drop `.` components so the same file is not collected twice.
fn strip_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Read a migration file into memory.
pub fn read_source(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Collect all `.sql` files from a directory (non-recursive).
fn collect_sql_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|e| LoadError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files: Vec<PathBuf> = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| LoadError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        if path.is_file() && is_sql_file(&path) {
            files.push(path);
        }
    }

    Ok(files)
}

/// Check if a path has a `.sql` extension.
fn is_sql_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("sql"))
        .unwrap_or(false)
}
