//! Parsed file cache
//!
//! Every file is read, parsed and scanned for suppression directives once per
//! [`StatementCache`]. Rule dispatch, model replay, suppression filtering and
//! fix aggregation all read the same [`CachedFile`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use rayon::prelude::*;

use crate::input::{LoadError, read_source};
use crate::line_index::LineIndex;
use crate::parser::ir::Statement;
use crate::parser::pg_query::parse_sql;
use crate::suppress::{Suppressions, parse_suppressions};

/// Default number of files parsed concurrently.
pub const DEFAULT_BATCH_WIDTH: usize = 10;

/// One source file, parsed.
#[derive(Debug)]
pub struct CachedFile {
    pub path: PathBuf,
    pub content: String,
    pub statements: Vec<Statement>,
    pub line_index: LineIndex,
    pub suppressions: Suppressions,
}

impl CachedFile {
    /// Parse `content` as the file at `path`.
    pub fn parse(path: &Path, content: String) -> Result<Self, LoadError> {
        let line_index = LineIndex::new(&content);
        let statements = parse_sql(&content, &line_index).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let suppressions = parse_suppressions(&content);

        tracing::debug!(
            path = %path.display(),
            statements = statements.len(),
            "parsed migration file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            content,
            statements,
            line_index,
            suppressions,
        })
    }
}

/// Path-keyed cache of parsed files.
///
/// Entries live until [`clear`](Self::clear). Two threads asking for the same
/// uncached path may both parse it; the first insert wins and both get the
/// stored entry. The lock is never held while parsing.
#[derive(Debug, Default)]
pub struct StatementCache {
    files: Mutex<HashMap<PathBuf, Arc<CachedFile>>>,
}

impl StatementCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached entry for `path`, if it has been parsed.
    pub fn get(&self, path: &Path) -> Option<Arc<CachedFile>> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Read and parse `path` unless it is already cached.
    pub fn get_or_parse(&self, path: &Path) -> Result<Arc<CachedFile>, LoadError> {
        if let Some(cached) = self.get(path) {
            return Ok(cached);
        }
        let content = read_source(path)?;
        self.insert_parsed(path, content)
    }

    /// Like [`get_or_parse`](Self::get_or_parse) but with the content supplied
    /// by the caller. An already cached entry for `path` is returned as is.
    pub fn get_or_parse_source(
        &self,
        path: &Path,
        content: impl Into<String>,
    ) -> Result<Arc<CachedFile>, LoadError> {
        if let Some(cached) = self.get(path) {
            return Ok(cached);
        }
        self.insert_parsed(path, content.into())
    }

    fn insert_parsed(&self, path: &Path, content: String) -> Result<Arc<CachedFile>, LoadError> {
        let parsed = Arc::new(CachedFile::parse(path, content)?);
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(
            files.entry(path.to_path_buf()).or_insert(parsed),
        ))
    }

    /// Parse `paths` in batches of at most `batch_width` files at a time,
    /// each batch joined before the next starts.
    ///
    /// Returns the entries in the order of `paths`. The first failure aborts
    /// the run.
    pub fn parse_files(
        &self,
        paths: &[PathBuf],
        batch_width: usize,
    ) -> Result<Vec<Arc<CachedFile>>, LoadError> {
        in_batches(paths, batch_width, |path| self.get_or_parse(path))
    }
}

/// Run `f` over `items` in parallel, at most `width` at a time. Each chunk is
/// joined before the next starts, and results keep the order of `items`.
fn in_batches<T, R, E, F>(items: &[T], width: usize, f: F) -> Result<Vec<R>, E>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(&T) -> Result<R, E> + Sync,
{
    let mut out = Vec::with_capacity(items.len());
    for batch in items.chunks(width.max(1)) {
        let results: Vec<Result<R, E>> = batch.par_iter().map(&f).collect();
        for result in results {
            out.push(result?);
        }
    }
    Ok(out)
}
