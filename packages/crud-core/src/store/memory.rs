//! In-memory record store.
//!
//! Each table has:
//! - Fixed schema that every write is validated against
//! - Copy-on-write row snapshot swapped atomically, so readers never block
//! - Writer mutex serializing mutations
//! - Monotonic record key sequence

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use arc_swap::ArcSwap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::CrudConfig;
use crate::error::StoreError;
use crate::predicate::PredicateSet;
use crate::query::Query;
use crate::record::{NewRecord, Record, RecordId, Schema};

use super::RecordStore;

type Rows = BTreeMap<RecordId, Record>;

#[derive(Debug)]
struct Table {
    /// Table schema
    schema: Schema,
    /// Current row snapshot, keyed and ordered by record id
    rows: ArcSwap<Rows>,
    /// Held for the duration of a copy-modify-swap
    write_lock: Mutex<()>,
    /// Next record ID to assign
    next_id: AtomicU64,
}

impl Table {
    fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: ArcSwap::from_pointee(Rows::new()),
            write_lock: Mutex::new(()),
            next_id: AtomicU64::new(1), // Start IDs at 1
        }
    }

    fn name(&self) -> &str {
        &self.schema.table
    }

    /// Applies a mutation to a private copy of the rows and publishes it.
    ///
    /// Nothing is published when the mutation fails.
    fn write<R>(&self, f: impl FnOnce(&mut Rows) -> Result<R, StoreError>) -> Result<R, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut rows = Rows::clone(&self.rows.load());
        let result = f(&mut rows)?;
        self.rows.store(Arc::new(rows));
        Ok(result)
    }

    /// Takes the next free key from the sequence. Must run under the write lock.
    fn allocate_id(&self, rows: &Rows) -> Result<RecordId, StoreError> {
        let mut candidate = self.next_id.load(Ordering::SeqCst);
        while rows.contains_key(&RecordId(candidate)) {
            candidate = candidate
                .checked_add(1)
                .ok_or_else(|| self.constraint("record key space exhausted".to_string()))?;
        }
        let next = candidate
            .checked_add(1)
            .ok_or_else(|| self.constraint("record key space exhausted".to_string()))?;
        self.next_id.store(next, Ordering::SeqCst);
        Ok(RecordId(candidate))
    }

    fn constraint(&self, reason: String) -> StoreError {
        tracing::warn!("Rejected write to {}: {}", self.name(), reason);
        StoreError::Constraint {
            table: self.name().to_string(),
            reason,
        }
    }

    /// Returns matching rows in key order.
    fn scan(&self, predicates: &PredicateSet) -> Vec<Record> {
        let rows = self.rows.load_full();

        #[cfg(feature = "parallel")]
        let matches: Vec<Record> = {
            let candidates: Vec<&Record> = rows.values().collect();
            candidates
                .par_iter()
                .filter(|r| predicates.matches(r))
                .map(|r| (*r).clone())
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let matches: Vec<Record> = rows
            .values()
            .filter(|r| predicates.matches(r))
            .cloned()
            .collect();

        matches
    }

    fn count(&self, predicates: &PredicateSet) -> usize {
        let rows = self.rows.load_full();

        #[cfg(feature = "parallel")]
        let count = {
            let candidates: Vec<&Record> = rows.values().collect();
            candidates.par_iter().filter(|r| predicates.matches(r)).count()
        };

        #[cfg(not(feature = "parallel"))]
        let count = rows.values().filter(|r| predicates.matches(r)).count();

        count
    }
}

/// Record store holding all tables in memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    /// Map of table name to table instance
    tables: RwLock<HashMap<String, Arc<Table>>>,
    /// Reject updates carrying a stale version
    optimistic_locking: bool,
}

impl InMemoryRecordStore {
    /// Creates a new empty store with last-write-wins updates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store honouring the locking setting of the configuration.
    pub fn from_config(config: &CrudConfig) -> Self {
        Self::new().with_optimistic_locking(config.optimistic_locking)
    }

    /// Enables or disables version checks on update.
    pub fn with_optimistic_locking(mut self, enabled: bool) -> Self {
        self.optimistic_locking = enabled;
        self
    }

    /// Creates a new table from its schema.
    ///
    /// # Errors
    /// `TableAlreadyExists` if a table with the same name exists,
    /// `Constraint` if the schema declares a field twice.
    pub fn create_table(&self, schema: Schema) -> Result<(), StoreError> {
        let mut seen_names = std::collections::HashSet::new();
        for field in &schema.fields {
            if !seen_names.insert(field.name.as_str()) {
                return Err(StoreError::Constraint {
                    table: schema.table.clone(),
                    reason: format!("field '{}' declared twice", field.name),
                });
            }
        }

        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        if tables.contains_key(&schema.table) {
            return Err(StoreError::TableAlreadyExists(schema.table));
        }
        tracing::info!(
            "Creating table {} with {} fields",
            schema.table,
            schema.fields.len()
        );
        tables.insert(schema.table.clone(), Arc::new(Table::new(schema)));
        Ok(())
    }

    /// Deletes a table by name.
    pub fn drop_table(&self, name: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        tables.remove(name).ok_or_else(|| StoreError::TableNotFound {
            table: name.to_string(),
        })?;
        Ok(())
    }

    /// Returns all table names, sorted.
    pub fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Number of records in a table.
    pub fn len(&self, table: &str) -> Result<usize, StoreError> {
        Ok(self.table(table)?.rows.load().len())
    }

    fn table(&self, name: &str) -> Result<Arc<Table>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        tables
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::TableNotFound {
                table: name.to_string(),
            })
    }
}

impl RecordStore for InMemoryRecordStore {
    fn schema(&self, table: &str) -> Result<Schema, StoreError> {
        Ok(self.table(table)?.schema.clone())
    }

    fn insert(&self, table: &str, record: NewRecord) -> Result<Record, StoreError> {
        let table = self.table(table)?;
        let fields = table
            .schema
            .conform(record.fields)
            .map_err(|reason| table.constraint(reason))?;

        table.write(|rows| {
            let id = match record.id {
                Some(id) => {
                    if rows.contains_key(&id) {
                        return Err(StoreError::DuplicateKey {
                            table: table.name().to_string(),
                            id,
                        });
                    }
                    let next = id
                        .0
                        .checked_add(1)
                        .ok_or_else(|| table.constraint(format!("record key {id} is out of range")))?;
                    table.next_id.fetch_max(next, Ordering::SeqCst);
                    id
                }
                None => table.allocate_id(rows)?,
            };

            let stored = Record {
                id,
                version: 0,
                fields,
            };
            rows.insert(id, stored.clone());
            tracing::debug!("Inserted record {} into {}", id, table.name());
            Ok(stored)
        })
    }

    fn update_by_id(&self, table: &str, record: &Record) -> Result<Record, StoreError> {
        let table = self.table(table)?;
        let fields = table
            .schema
            .conform(record.fields.clone())
            .map_err(|reason| table.constraint(reason))?;

        table.write(|rows| {
            let current = rows
                .get_mut(&record.id)
                .ok_or_else(|| StoreError::RecordNotFound {
                    table: table.name().to_string(),
                    id: record.id,
                })?;

            if self.optimistic_locking && current.version != record.version {
                tracing::warn!(
                    "Version conflict on {} record {}: expected {}, found {}",
                    table.name(),
                    record.id,
                    record.version,
                    current.version
                );
                return Err(StoreError::Conflict {
                    table: table.name().to_string(),
                    id: record.id,
                    expected: record.version,
                    found: current.version,
                });
            }

            current.fields = fields;
            current.version += 1;
            tracing::debug!(
                "Updated record {} in {} (version {})",
                record.id,
                table.name(),
                current.version
            );
            Ok(current.clone())
        })
    }

    fn delete_by_id(&self, table: &str, id: RecordId) -> Result<(), StoreError> {
        let table = self.table(table)?;
        table.write(|rows| {
            rows.remove(&id)
                .map(|_| ())
                .ok_or_else(|| StoreError::RecordNotFound {
                    table: table.name().to_string(),
                    id,
                })
        })
    }

    fn find_by_id(&self, table: &str, id: RecordId) -> Result<Option<Record>, StoreError> {
        Ok(self.table(table)?.rows.load().get(&id).cloned())
    }

    fn find_one(
        &self,
        table: &str,
        predicates: &PredicateSet,
    ) -> Result<Option<Record>, StoreError> {
        let table = self.table(table)?;
        let rows = table.rows.load();
        Ok(rows.values().find(|r| predicates.matches(r)).cloned())
    }

    fn find_many(&self, table: &str, query: &Query) -> Result<Vec<Record>, StoreError> {
        let table = self.table(table)?;
        Ok(query.finish(table.scan(&query.predicates)))
    }

    fn count(&self, table: &str, predicates: &PredicateSet) -> Result<usize, StoreError> {
        Ok(self.table(table)?.count(predicates))
    }

    fn clear(&self, table: &str) -> Result<(), StoreError> {
        let table = self.table(table)?;
        table.write(|rows| {
            rows.clear();
            table.next_id.store(1, Ordering::SeqCst);
            Ok(())
        })?;
        tracing::debug!("Cleared table {}", table.name());
        Ok(())
    }
}
