//! Query descriptors: predicates plus ordering and pagination.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::predicate::PredicateSet;
use crate::record::Record;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Sort in ascending order
    #[default]
    Ascending,
    /// Sort in descending order
    Descending,
}

/// Ordering on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// A filtered, ordered and paginated read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// AND-combined filters
    pub predicates: PredicateSet,
    /// Field ordering; key order when absent
    pub order_by: Option<OrderBy>,
    /// Number of matches to skip
    pub offset: usize,
    /// Maximum number of records to return
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(predicates: PredicateSet) -> Self {
        Self {
            predicates,
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_order(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Sorts and paginates records that already satisfy the predicates.
    ///
    /// Input is expected in key order. NULLs sort last in both directions;
    /// ties keep key order.
    pub(crate) fn finish(&self, mut matches: Vec<Record>) -> Vec<Record> {
        if let Some(order) = &self.order_by {
            matches.sort_by(|a, b| {
                match (a.get(&order.field), b.get(&order.field)) {
                    (Some(x), Some(y)) => {
                        let ordering = x.compare(y).unwrap_or(Ordering::Equal);
                        match order.direction {
                            SortDirection::Ascending => ordering,
                            SortDirection::Descending => ordering.reverse(),
                        }
                    }
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
                .then(a.id.cmp(&b.id))
            });
        }

        let page = matches.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => page.take(limit).collect(),
            None => page.collect(),
        }
    }
}
