//! Migration file discovery
//!
//! Expands the paths given on the command line into the ordered list of
//! `.sql` files a lint run works on.

pub mod order;
pub mod sql;

use std::path::PathBuf;
use thiserror::Error;

pub use order::{migration_cmp, sort_migrations};
pub use sql::{collect_migration_files, read_source};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}
