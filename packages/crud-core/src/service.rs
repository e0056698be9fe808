//! Typed CRUD service over an [`ExampleQueryEngine`].

use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::CrudConfig;
use crate::engine::ExampleQueryEngine;
use crate::entity::{Car, Entity};
use crate::error::CrudError;
use crate::predicate::Comparator;
use crate::record::{NewRecord, RecordId};
use crate::store::RecordStore;
use crate::value::Value;

/// Entity-typed facade: examples in, entities out.
pub struct CrudService<E: Entity, S: RecordStore> {
    engine: ExampleQueryEngine<S>,
    _entity: PhantomData<fn() -> E>,
}

/// Service for [`Car`] entities.
pub type CarService<S> = CrudService<Car, S>;

impl<E: Entity, S: RecordStore> CrudService<E, S> {
    pub fn new(store: Arc<S>, config: CrudConfig) -> Self {
        Self {
            engine: ExampleQueryEngine::new(store, E::TABLE, config),
            _entity: PhantomData,
        }
    }

    /// Underlying engine, for criteria queries and raw record access.
    pub fn crud(&self) -> &ExampleQueryEngine<S> {
        &self.engine
    }

    /// Returns the single entity matching the set fields of `example`.
    pub fn find_by_example(&self, example: &E) -> Result<E, CrudError> {
        let record = self.engine.find_by_example(&example.to_example())?;
        E::from_record(&record)
    }

    pub fn find_all_by_example(&self, example: &E) -> Result<Vec<E>, CrudError> {
        self.engine
            .find_all_by_example(&example.to_example())?
            .iter()
            .map(E::from_record)
            .collect()
    }

    pub fn find_by_id(&self, id: RecordId) -> Result<E, CrudError> {
        E::from_record(&self.engine.find_by_id(id)?)
    }

    pub fn count(&self, example: &E) -> Result<usize, CrudError> {
        self.engine.count(&example.to_example())
    }

    pub fn count_by_range(
        &self,
        field: &str,
        comparator: Comparator,
        bound: impl Into<Value>,
    ) -> Result<usize, CrudError> {
        self.engine.count_by_range(field, comparator, bound)
    }

    /// Inserts the entity. A preset key is kept, otherwise the store assigns one.
    pub fn insert(&self, entity: &E) -> Result<E, CrudError> {
        let record = NewRecord {
            id: entity.id(),
            fields: entity.to_fields(),
        };
        E::from_record(&self.engine.insert(record)?)
    }

    /// Overwrites the stored state of a persisted entity.
    pub fn update(&self, entity: &E) -> Result<E, CrudError> {
        let record = entity.to_record()?;
        E::from_record(&self.engine.update(&record)?)
    }

    pub fn delete(&self, entity: &E) -> Result<(), CrudError> {
        let id = entity.id().ok_or_else(|| {
            CrudError::Validation(format!("{} entity has no key", E::TABLE))
        })?;
        self.engine.delete(id)
    }
}
