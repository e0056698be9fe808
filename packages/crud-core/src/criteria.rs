//! Fluent criteria builder.
//!
//! ```ignore
//! let cheap = engine.criteria().le("price", 12999.0).count()?;
//! ```

use crate::error::CrudError;
use crate::example::Example;
use crate::engine::ExampleQueryEngine;
use crate::predicate::{Comparator, MatchMode, Predicate};
use crate::query::{Query, SortDirection};
use crate::record::Record;
use crate::store::RecordStore;
use crate::value::Value;

/// A query under construction against one engine's table.
pub struct Criteria<'a, S: RecordStore> {
    engine: &'a ExampleQueryEngine<S>,
    query: Query,
}

impl<'a, S: RecordStore> Criteria<'a, S> {
    pub(crate) fn new(engine: &'a ExampleQueryEngine<S>) -> Self {
        Self {
            engine,
            query: Query::default(),
        }
    }

    /// Adds an arbitrary predicate.
    pub fn add(mut self, predicate: Predicate) -> Self {
        self.query.predicates.push(predicate);
        self
    }

    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.add(Predicate::new(field, Comparator::Eq, value))
    }

    pub fn ne(self, field: &str, value: impl Into<Value>) -> Self {
        self.add(Predicate::new(field, Comparator::Ne, value))
    }

    pub fn lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.add(Predicate::new(field, Comparator::Lt, value))
    }

    pub fn le(self, field: &str, value: impl Into<Value>) -> Self {
        self.add(Predicate::new(field, Comparator::Le, value))
    }

    pub fn gt(self, field: &str, value: impl Into<Value>) -> Self {
        self.add(Predicate::new(field, Comparator::Gt, value))
    }

    pub fn ge(self, field: &str, value: impl Into<Value>) -> Self {
        self.add(Predicate::new(field, Comparator::Ge, value))
    }

    pub fn like(self, field: &str, value: &str, mode: MatchMode) -> Self {
        self.add(Predicate::new(field, Comparator::Like(mode), value))
    }

    pub fn ilike(self, field: &str, value: &str, mode: MatchMode) -> Self {
        self.add(Predicate::new(field, Comparator::ILike(mode), value))
    }

    /// Adds the predicates derived from an example.
    pub fn example(mut self, example: &Example) -> Self {
        self.query.predicates.extend(example.to_predicates());
        self
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.query = self.query.with_order(field, direction);
        self
    }

    /// Number of matches to skip.
    pub fn first_result(mut self, offset: usize) -> Self {
        self.query.offset = offset;
        self
    }

    pub fn max_results(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Counts matches, ignoring ordering and pagination.
    pub fn count(&self) -> Result<usize, CrudError> {
        self.engine.count_matching(&self.query.predicates)
    }

    /// Returns the ordered, paginated matches.
    pub fn list(&self) -> Result<Vec<Record>, CrudError> {
        self.engine.list(&self.query)
    }

    /// Returns the single match, with the same semantics as
    /// [`ExampleQueryEngine::find_by_example`].
    pub fn find_one(&self) -> Result<Record, CrudError> {
        self.engine.find_unique(&self.query.predicates)
    }

    /// The query built so far.
    pub fn query(&self) -> &Query {
        &self.query
    }
}
