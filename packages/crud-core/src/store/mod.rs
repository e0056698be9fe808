//! Record store abstraction and the in-memory implementation.
//!
//! The engine only talks to a store through [`RecordStore`]. All calls are
//! synchronous and block the caller until the store answers.

mod memory;

pub use memory::InMemoryRecordStore;

use crate::error::StoreError;
use crate::predicate::PredicateSet;
use crate::query::Query;
use crate::record::{NewRecord, Record, RecordId, Schema};

/// CRUD and predicate-based query primitives over named tables.
pub trait RecordStore: Send + Sync {
    /// Returns the schema of a table.
    fn schema(&self, table: &str) -> Result<Schema, StoreError>;

    /// Inserts a record, allocating a key when none is given.
    fn insert(&self, table: &str, record: NewRecord) -> Result<Record, StoreError>;

    /// Overwrites the stored state of an existing record.
    ///
    /// Returns the record as stored, with its new version.
    fn update_by_id(&self, table: &str, record: &Record) -> Result<Record, StoreError>;

    /// Deletes a record by key.
    fn delete_by_id(&self, table: &str, id: RecordId) -> Result<(), StoreError>;

    /// Reads a record by key.
    fn find_by_id(&self, table: &str, id: RecordId) -> Result<Option<Record>, StoreError>;

    /// Returns the first matching record in key order.
    fn find_one(&self, table: &str, predicates: &PredicateSet)
        -> Result<Option<Record>, StoreError>;

    /// Returns matching records, ordered and paginated per the query.
    fn find_many(&self, table: &str, query: &Query) -> Result<Vec<Record>, StoreError>;

    /// Counts matching records, ignoring pagination.
    fn count(&self, table: &str, predicates: &PredicateSet) -> Result<usize, StoreError>;

    /// Removes every record of a table.
    fn clear(&self, table: &str) -> Result<(), StoreError>;
}
