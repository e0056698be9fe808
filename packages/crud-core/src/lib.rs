//! Query-by-example CRUD engine.
//!
//! Provides a record store abstraction with a lock-free in-memory backend,
//! example and criteria queries, a typed entity service, and dataset
//! fixtures for seeding stores in tests.

pub mod config;
pub mod criteria;
pub mod dataset;
pub mod engine;
pub mod entity;
pub mod error;
pub mod example;
pub mod predicate;
pub mod query;
pub mod record;
pub mod service;
pub mod store;
pub mod value;

pub use config::{CrudConfig, MultipleMatchPolicy};
pub use engine::ExampleQueryEngine;
pub use entity::{Car, Entity};
pub use error::{CrudError, DatasetError, StoreError};
pub use example::Example;
pub use predicate::{Comparator, MatchMode, Predicate, PredicateSet};
pub use record::{Record, RecordId};
pub use service::{CarService, CrudService};
pub use store::{InMemoryRecordStore, RecordStore};
pub use value::{FieldType, Value};
