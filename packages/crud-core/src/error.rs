//! Error types for the record store, the query engine and dataset fixtures.

use thiserror::Error;

use crate::record::RecordId;

/// Record store errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Table not found
    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    /// Table already exists
    #[error("Table '{0}' already exists")]
    TableAlreadyExists(String),

    /// Record not found
    #[error("Record {id} not found in table '{table}'")]
    RecordNotFound { table: String, id: RecordId },

    /// A record with the same key already exists
    #[error("Duplicate key {id} in table '{table}'")]
    DuplicateKey { table: String, id: RecordId },

    /// Optimistic lock failure
    #[error("Version conflict on record {id} in table '{table}': expected {expected}, found {found}")]
    Conflict {
        table: String,
        id: RecordId,
        expected: u64,
        found: u64,
    },

    /// Write rejected by the table schema
    #[error("Constraint violation in table '{table}': {reason}")]
    Constraint { table: String, reason: String },

    /// Lock poisoned (Mutex poisoned)
    #[error("Lock poisoned")]
    LockPoisoned,
}

/// Errors surfaced by [`ExampleQueryEngine`](crate::engine::ExampleQueryEngine)
/// and the typed service built on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrudError {
    /// The query matched zero records when exactly one was expected.
    #[error("No record in table '{table}' matches the query")]
    NotFound { table: String },

    /// The query matched more than one record when exactly one was expected.
    #[error("Query on table '{table}' is ambiguous: {count} records match")]
    Ambiguous { table: String, count: usize },

    /// Field not found in the table schema
    #[error("Field '{field}' not found in table '{table}'")]
    FieldNotFound { table: String, field: String },

    /// The query or record is incompatible with the table schema
    #[error("Validation error: {0}")]
    Validation(String),

    /// Opaque failure from the record store
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CrudError {
    /// Returns true for the "no match" and "record gone" cases.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CrudError::NotFound { .. } | CrudError::Store(StoreError::RecordNotFound { .. })
        )
    }
}

/// Dataset fixture errors.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// I/O error reading the dataset file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown dataset file extension
    #[error("Unsupported dataset format '{0}' (expected .yml, .yaml or .json)")]
    UnsupportedFormat(String),

    /// Row cannot be converted into a record
    #[error("Invalid row {row} in table '{table}': {reason}")]
    InvalidRow {
        table: String,
        row: usize,
        reason: String,
    },

    /// Store rejected a seeded row
    #[error(transparent)]
    Store(#[from] StoreError),
}
