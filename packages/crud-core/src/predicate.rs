//! Filter predicates and their AND-composition.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CrudError;
use crate::record::{Record, Schema};
use crate::value::{FieldType, Value};

/// How a text value in an example is matched against stored text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Whole value must be equal
    #[default]
    Exact,
    /// Value occurs anywhere in the stored text
    Anywhere,
    /// Stored text starts with the value
    Start,
    /// Stored text ends with the value
    End,
}

impl MatchMode {
    fn matches(self, haystack: &str, needle: &str) -> bool {
        match self {
            MatchMode::Exact => haystack == needle,
            MatchMode::Anywhere => haystack.contains(needle),
            MatchMode::Start => haystack.starts_with(needle),
            MatchMode::End => haystack.ends_with(needle),
        }
    }
}

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Case-sensitive text match
    Like(MatchMode),
    /// Case-insensitive text match
    ILike(MatchMode),
}

impl Comparator {
    /// Returns true for `<`, `<=`, `>` and `>=`.
    pub fn is_range(self) -> bool {
        matches!(
            self,
            Comparator::Lt | Comparator::Le | Comparator::Gt | Comparator::Ge
        )
    }

    fn is_text_match(self) -> bool {
        matches!(self, Comparator::Like(_) | Comparator::ILike(_))
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Eq => f.write_str("="),
            Comparator::Ne => f.write_str("<>"),
            Comparator::Lt => f.write_str("<"),
            Comparator::Le => f.write_str("<="),
            Comparator::Gt => f.write_str(">"),
            Comparator::Ge => f.write_str(">="),
            Comparator::Like(mode) => write!(f, "like({mode:?})"),
            Comparator::ILike(mode) => write!(f, "ilike({mode:?})"),
        }
    }
}

/// A single filter condition on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: String,
    pub op: Comparator,
    pub value: Value,
}

impl Predicate {
    pub fn new(field: impl Into<String>, op: Comparator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Comparator::Eq, value)
    }

    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Comparator::Le, value)
    }

    /// Evaluates the predicate against a record.
    ///
    /// A NULL field never matches, `Ne` included.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(stored) = record.get(&self.field) else {
            return false;
        };

        match self.op {
            Comparator::Like(mode) => match (stored.as_str(), self.value.as_str()) {
                (Some(haystack), Some(needle)) => mode.matches(haystack, needle),
                _ => false,
            },
            Comparator::ILike(mode) => match (stored.as_str(), self.value.as_str()) {
                (Some(haystack), Some(needle)) => {
                    mode.matches(&haystack.to_lowercase(), &needle.to_lowercase())
                }
                _ => false,
            },
            op => match stored.compare(&self.value) {
                Some(ordering) => match op {
                    Comparator::Eq => ordering == Ordering::Equal,
                    Comparator::Ne => ordering != Ordering::Equal,
                    Comparator::Lt => ordering == Ordering::Less,
                    Comparator::Le => ordering != Ordering::Greater,
                    Comparator::Gt => ordering == Ordering::Greater,
                    Comparator::Ge => ordering != Ordering::Less,
                    Comparator::Like(_) | Comparator::ILike(_) => false,
                },
                None => false,
            },
        }
    }

    /// Checks the predicate against a table schema.
    ///
    /// # Errors
    /// `FieldNotFound` for unknown fields, `Validation` when the value
    /// cannot be compared with the field under this operator.
    pub fn validate(&self, schema: &Schema) -> Result<(), CrudError> {
        let def = schema
            .field(&self.field)
            .ok_or_else(|| CrudError::FieldNotFound {
                table: schema.table.clone(),
                field: self.field.clone(),
            })?;

        if let Value::Float(v) = self.value {
            if v.is_nan() {
                return Err(CrudError::Validation(format!(
                    "NaN is not a valid bound for field '{}'",
                    self.field
                )));
            }
        }

        if self.op.is_text_match() {
            if def.r#type != FieldType::Text || self.value.as_str().is_none() {
                return Err(CrudError::Validation(format!(
                    "{} needs a text field and a text value, field '{}' is {}",
                    self.op, self.field, def.r#type
                )));
            }
            return Ok(());
        }

        if !def.r#type.is_comparable_with(&self.value) {
            return Err(CrudError::Validation(format!(
                "cannot compare field '{}' ({}) with {} value '{}'",
                self.field,
                def.r#type,
                self.value.field_type(),
                self.value
            )));
        }

        if self.op.is_range() && !def.r#type.is_ordered() {
            return Err(CrudError::Validation(format!(
                "range comparison {} is not supported on {} field '{}'",
                self.op, def.r#type, self.field
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.value)
    }
}

/// AND-conjunction of predicates. The empty set matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredicateSet(Vec<Predicate>);

impl PredicateSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.0.push(predicate);
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.0.push(predicate);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Predicate> {
        self.0.iter()
    }

    /// Returns true if the record satisfies every predicate.
    pub fn matches(&self, record: &Record) -> bool {
        self.0.iter().all(|p| p.matches(record))
    }

    /// Validates every predicate against the schema.
    pub fn validate(&self, schema: &Schema) -> Result<(), CrudError> {
        self.0.iter().try_for_each(|p| p.validate(schema))
    }
}

impl FromIterator<Predicate> for PredicateSet {
    fn from_iter<I: IntoIterator<Item = Predicate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Predicate> for PredicateSet {
    fn extend<I: IntoIterator<Item = Predicate>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for PredicateSet {
    type Item = Predicate;
    type IntoIter = std::vec::IntoIter<Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PredicateSet {
    type Item = &'a Predicate;
    type IntoIter = std::slice::Iter<'a, Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for PredicateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<all>");
        }
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}
