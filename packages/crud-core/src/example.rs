//! Query-by-example prototypes.
//!
//! An [`Example`] records which fields were explicitly set. Only those
//! fields produce predicates; a field that was never set does not constrain
//! the query, while a field set to a zero value (`0.0`, `""`, `false`) does.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::predicate::{Comparator, MatchMode, Predicate, PredicateSet};
use crate::record::Record;
use crate::value::Value;

/// A partially populated prototype record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Fields explicitly set on the prototype
    fields: BTreeMap<String, Value>,
    /// Text matching strategy
    #[serde(default)]
    match_mode: MatchMode,
    /// Case-insensitive text matching
    #[serde(default)]
    ignore_case: bool,
}

impl Example {
    /// Creates an empty example, which matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a field as set.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Marks a field as set only when a value is present.
    pub fn set_opt<V: Into<Value>>(self, field: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(field, value),
            None => self,
        }
    }

    /// Removes a field from the example so it no longer constrains the query.
    pub fn exclude(mut self, field: &str) -> Self {
        self.fields.remove(field);
        self
    }

    /// Sets the text matching strategy.
    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Enables case-insensitive text matching.
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    /// Builds an example from every non-NULL field of a record.
    pub fn from_record(record: &Record) -> Self {
        Self {
            fields: record.fields.clone(),
            ..Default::default()
        }
    }

    /// Returns true if the field was explicitly set.
    pub fn is_set(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of set fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Derives one predicate per set field.
    ///
    /// Text values use `Like`/`ILike` unless the example matches exactly and
    /// case-sensitively, in which case plain equality is used.
    pub fn to_predicates(&self) -> PredicateSet {
        self.fields
            .iter()
            .map(|(field, value)| {
                let op = match value {
                    Value::Text(_) if self.ignore_case => Comparator::ILike(self.match_mode),
                    Value::Text(_) if self.match_mode != MatchMode::Exact => {
                        Comparator::Like(self.match_mode)
                    }
                    _ => Comparator::Eq,
                };
                Predicate::new(field.clone(), op, value.clone())
            })
            .collect()
    }
}
