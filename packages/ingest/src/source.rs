//! Uniform table sourcing.
//!
//! Pipeline stages never care whether a table came from a file on disk,
//! was built in memory by a caller, or is produced lazily by another
//! computation. [`TableSource`] captures those three origins and
//! [`TableSource::resolve`] collapses them into a plain `Vec` of rows.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::IngestError;

/// A table type that knows how to read itself from a CSV file.
pub trait CsvTable: Sized {
    /// Logical table name used in error and log messages.
    const TABLE: &'static str;

    /// Reads and parses the whole table from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, the header row is
    /// missing required columns, or any row fails to parse.
    fn read_csv(path: &Path) -> Result<Vec<Self>, IngestError>;
}

/// Closure form of a lazily produced table.
pub type DeferredTable<T> = Box<dyn FnOnce() -> Result<Vec<T>, IngestError> + Send>;

/// Where a table comes from.
pub enum TableSource<T> {
    /// A CSV file on disk, read on resolve.
    Path(PathBuf),
    /// Rows already in memory, passed through untouched.
    Table(Vec<T>),
    /// A loader invoked on resolve, for tables produced by earlier
    /// computations (e.g. edges built from centroids).
    Deferred(DeferredTable<T>),
}

impl<T: CsvTable> TableSource<T> {
    /// Resolves this source into rows.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the file or running the deferred
    /// loader fails.
    pub fn resolve(self) -> Result<Vec<T>, IngestError> {
        match self {
            Self::Path(path) => {
                log::debug!("reading {} table from {}", T::TABLE, path.display());
                T::read_csv(&path)
            }
            Self::Table(rows) => Ok(rows),
            Self::Deferred(load) => load(),
        }
    }
}

impl<T> TableSource<T> {
    /// Wraps a deferred loader.
    pub fn deferred(load: impl FnOnce() -> Result<Vec<T>, IngestError> + Send + 'static) -> Self {
        Self::Deferred(Box::new(load))
    }
}

impl<T> From<Vec<T>> for TableSource<T> {
    fn from(rows: Vec<T>) -> Self {
        Self::Table(rows)
    }
}

impl<T> From<PathBuf> for TableSource<T> {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl<T> From<&Path> for TableSource<T> {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl<T> fmt::Debug for TableSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Table(rows) => f
                .debug_struct("Table")
                .field("rows", &rows.len())
                .finish(),
            Self::Deferred(_) => f.write_str("Deferred"),
        }
    }
}
