use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the persistence layer. The UI reports these through
/// the status line; startup treats `Unavailable` as fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file cannot be opened, created, or read as a database.
    #[error("storage unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The store was opened without a schema and the expected table is absent.
    #[error("table {0:?} does not exist in the database")]
    MissingTable(String),

    /// A table or column name that cannot be used as a SQL identifier.
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),

    /// A search criterion referenced a column outside the schema.
    #[error("unknown column {0:?}")]
    UnknownColumn(String),

    /// The number of supplied values does not match the column count.
    #[error("expected {expected} values, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    /// An update targeted an id that no row carries.
    #[error("no record with id {0}")]
    NotFound(i64),

    #[error(transparent)]
    Sql(#[from] rusqlite::Error),
}
