//! Example-driven query engine.
//!
//! Translates a partially populated [`Example`] into an AND-combined
//! [`PredicateSet`], validates it against the table schema and delegates
//! execution to a [`RecordStore`]. The engine itself holds no mutable state.

use std::sync::Arc;

use crate::config::{CrudConfig, MultipleMatchPolicy};
use crate::criteria::Criteria;
use crate::error::{CrudError, StoreError};
use crate::example::Example;
use crate::predicate::{Comparator, Predicate, PredicateSet};
use crate::query::Query;
use crate::record::{FieldMap, NewRecord, Record, RecordId, Schema};
use crate::store::RecordStore;
use crate::value::Value;

/// Query-by-example engine scoped to one table of a record store.
pub struct ExampleQueryEngine<S: RecordStore> {
    /// Backing store
    store: Arc<S>,
    /// Table every operation runs against
    table: String,
    /// Configuration
    config: CrudConfig,
}

impl<S: RecordStore> ExampleQueryEngine<S> {
    /// Creates an engine for `table` on the given store.
    pub fn new(store: Arc<S>, table: impl Into<String>, config: CrudConfig) -> Self {
        Self {
            store,
            table: table.into(),
            config,
        }
    }

    /// Table this engine queries.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Backing store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Engine configuration.
    pub fn config(&self) -> &CrudConfig {
        &self.config
    }

    /// Returns the single record matching the example.
    ///
    /// # Errors
    /// - `NotFound` when nothing matches
    /// - `Ambiguous` when several records match and the multiple-match
    ///   policy is `Reject`; with `FirstByKey` the lowest key is returned
    /// - `Validation`/`FieldNotFound` when the example does not fit the schema
    pub fn find_by_example(&self, example: &Example) -> Result<Record, CrudError> {
        let predicates = example.to_predicates();
        self.find_unique(&predicates)
    }

    /// Returns every record matching the example, in key order.
    pub fn find_all_by_example(&self, example: &Example) -> Result<Vec<Record>, CrudError> {
        let query = Query::new(example.to_predicates());
        self.list(&query)
    }

    /// Counts the records matching the example.
    pub fn count(&self, example: &Example) -> Result<usize, CrudError> {
        let predicates = example.to_predicates();
        self.count_matching(&predicates)
    }

    /// Counts records whose `field` compares to `bound` under `comparator`.
    ///
    /// # Errors
    /// `Validation` if the comparator is not a range comparator or the bound
    /// cannot be compared with the field.
    pub fn count_by_range(
        &self,
        field: &str,
        comparator: Comparator,
        bound: impl Into<Value>,
    ) -> Result<usize, CrudError> {
        if !comparator.is_range() {
            return Err(CrudError::Validation(format!(
                "{comparator} is not a range comparator"
            )));
        }
        let predicates = PredicateSet::new().and(Predicate::new(field, comparator, bound));
        self.count_matching(&predicates)
    }

    /// Persists the full current state of an existing record.
    ///
    /// # Errors
    /// - `NotFound` if the record's key no longer exists
    /// - `Validation` if the record violates the table schema
    /// - `Store(..)` for any other store rejection, e.g. a version conflict
    pub fn update(&self, record: &Record) -> Result<Record, CrudError> {
        tracing::debug!("Updating {} record {}", self.table, record.id);
        self.store
            .update_by_id(&self.table, record)
            .map_err(|e| self.translate(e))
    }

    /// Inserts a new record.
    pub fn insert(&self, record: NewRecord) -> Result<Record, CrudError> {
        self.store
            .insert(&self.table, record)
            .map_err(|e| self.translate(e))
    }

    /// Inserts a record built from a field map, letting the store pick the key.
    pub fn insert_fields(&self, fields: FieldMap) -> Result<Record, CrudError> {
        self.insert(NewRecord::new(fields))
    }

    /// Deletes a record by key.
    pub fn delete(&self, id: RecordId) -> Result<(), CrudError> {
        self.store
            .delete_by_id(&self.table, id)
            .map_err(|e| self.translate(e))
    }

    /// Reads a record by key.
    pub fn find_by_id(&self, id: RecordId) -> Result<Record, CrudError> {
        self.store
            .find_by_id(&self.table, id)?
            .ok_or_else(|| CrudError::NotFound {
                table: self.table.clone(),
            })
    }

    /// Starts a fluent criteria query on this engine's table.
    pub fn criteria(&self) -> Criteria<'_, S> {
        Criteria::new(self)
    }

    /// Table schema, as reported by the store.
    pub fn schema(&self) -> Result<Schema, CrudError> {
        Ok(self.store.schema(&self.table)?)
    }

    pub(crate) fn validate(&self, predicates: &PredicateSet) -> Result<(), CrudError> {
        let schema = self.schema()?;
        predicates.validate(&schema)
    }

    pub(crate) fn find_unique(&self, predicates: &PredicateSet) -> Result<Record, CrudError> {
        self.validate(predicates)?;
        tracing::debug!("Finding unique {} where {}", self.table, predicates);

        let found = match self.config.multiple_match_policy {
            MultipleMatchPolicy::FirstByKey => self.store.find_one(&self.table, predicates)?,
            MultipleMatchPolicy::Reject => {
                let probe = Query::new(predicates.clone()).with_limit(2);
                let mut matches = self.store.find_many(&self.table, &probe)?;
                if matches.len() > 1 {
                    // The count reads a later snapshot than the probe.
                    let count = self.store.count(&self.table, predicates)?.max(2);
                    tracing::debug!("{} records match, refusing to pick one", count);
                    return Err(CrudError::Ambiguous {
                        table: self.table.clone(),
                        count,
                    });
                }
                matches.pop()
            }
        };

        found.ok_or_else(|| CrudError::NotFound {
            table: self.table.clone(),
        })
    }

    pub(crate) fn count_matching(&self, predicates: &PredicateSet) -> Result<usize, CrudError> {
        self.validate(predicates)?;
        let count = self.store.count(&self.table, predicates)?;
        tracing::debug!("Counted {} {} where {}", count, self.table, predicates);
        Ok(count)
    }

    pub(crate) fn list(&self, query: &Query) -> Result<Vec<Record>, CrudError> {
        self.validate(&query.predicates)?;
        if let Some(order) = &query.order_by {
            let schema = self.schema()?;
            if schema.field(&order.field).is_none() {
                return Err(CrudError::FieldNotFound {
                    table: self.table.clone(),
                    field: order.field.clone(),
                });
            }
        }

        let mut query = query.clone();
        if query.limit.is_none() {
            query.limit = self.config.default_max_results;
        }
        let records = self.store.find_many(&self.table, &query)?;
        tracing::debug!(
            "Listed {} {} where {}",
            records.len(),
            self.table,
            query.predicates
        );
        Ok(records)
    }

    /// Maps store write failures onto engine errors.
    fn translate(&self, error: StoreError) -> CrudError {
        match error {
            StoreError::RecordNotFound { .. } => CrudError::NotFound {
                table: self.table.clone(),
            },
            StoreError::Constraint { reason, .. } => CrudError::Validation(reason),
            other => CrudError::Store(other),
        }
    }
}
