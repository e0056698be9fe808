//! Typed entities mapped onto store records.

use serde::{Deserialize, Serialize};

use crate::error::CrudError;
use crate::example::Example;
use crate::record::{FieldDef, FieldMap, Record, RecordId, Schema};
use crate::value::{FieldType, Value};

/// A typed view over the records of one table.
///
/// Optional fields left at `None` are NULL in the store and are not part of
/// the entity's example.
pub trait Entity: Sized {
    /// Table backing the entity
    const TABLE: &'static str;

    /// Schema of the backing table.
    fn schema() -> Schema;

    /// Record key, once persisted.
    fn id(&self) -> Option<RecordId>;

    /// Version the entity was read at.
    fn version(&self) -> u64;

    /// Set fields as a field map.
    fn to_fields(&self) -> FieldMap;

    /// Builds the entity from a stored record.
    fn from_record(record: &Record) -> Result<Self, CrudError>;

    /// Example made of the set fields. The key is never part of it.
    fn to_example(&self) -> Example {
        self.to_fields()
            .into_iter()
            .fold(Example::new(), |example, (field, value)| example.set(field, value))
    }

    /// Full record for an update; fails when the entity was never persisted.
    fn to_record(&self) -> Result<Record, CrudError> {
        let id = self.id().ok_or_else(|| {
            CrudError::Validation(format!("{} entity has no key", Self::TABLE))
        })?;
        Ok(Record {
            id,
            version: self.version(),
            fields: self.to_fields(),
        })
    }
}

/// A car.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: Option<RecordId>,
    #[serde(default)]
    pub version: u64,
    pub model: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
}

impl Car {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = Some(model.into());
    }

    pub fn set_price(&mut self, price: f64) {
        self.price = Some(price);
    }
}

fn text(record: &Record, field: &str) -> Result<Option<String>, CrudError> {
    match record.get(field) {
        None => Ok(None),
        Some(Value::Text(s)) => Ok(Some(s.clone())),
        Some(other) => Err(CrudError::Validation(format!(
            "field '{field}' of record {} is {}, expected text",
            record.id,
            other.field_type()
        ))),
    }
}

fn number(record: &Record, field: &str) -> Result<Option<f64>, CrudError> {
    match record.get(field) {
        None => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or_else(|| {
            CrudError::Validation(format!(
                "field '{field}' of record {} is {}, expected a number",
                record.id,
                value.field_type()
            ))
        }),
    }
}

impl Entity for Car {
    const TABLE: &'static str = "car";

    fn schema() -> Schema {
        Schema::new(
            Self::TABLE,
            vec![
                FieldDef::new("model", FieldType::Text),
                FieldDef::new("name", FieldType::Text),
                FieldDef::new("price", FieldType::Float),
            ],
        )
    }

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        if let Some(model) = &self.model {
            fields.insert("model".to_string(), Value::from(model.as_str()));
        }
        if let Some(name) = &self.name {
            fields.insert("name".to_string(), Value::from(name.as_str()));
        }
        if let Some(price) = self.price {
            fields.insert("price".to_string(), Value::Float(price));
        }
        fields
    }

    fn from_record(record: &Record) -> Result<Self, CrudError> {
        Ok(Self {
            id: Some(record.id),
            version: record.version,
            model: text(record, "model")?,
            name: text(record, "name")?,
            price: number(record, "price")?,
        })
    }
}
