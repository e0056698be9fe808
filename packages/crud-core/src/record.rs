//! Records, record keys and table schemas.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{FieldType, Value};

/// Field name to value mapping. An absent field is NULL.
pub type FieldMap = BTreeMap<String, Value>;

/// Stable record key assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId(id)
    }
}

/// A stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record key
    pub id: RecordId,
    /// Write counter, bumped by every successful update
    #[serde(default)]
    pub version: u64,
    /// Field values
    pub fields: FieldMap,
}

impl Record {
    /// Returns the value of a field, or `None` when it is NULL.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Sets a field value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Clears a field back to NULL.
    pub fn unset(&mut self, field: &str) {
        self.fields.remove(field);
    }
}

/// A record about to be inserted. Without an `id` the store allocates one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRecord {
    pub id: Option<RecordId>,
    pub fields: FieldMap,
}

impl NewRecord {
    pub fn new(fields: FieldMap) -> Self {
        Self { id: None, fields }
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Field definition within a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Declared type
    pub r#type: FieldType,
    /// Whether the field may be NULL
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl FieldDef {
    /// Creates a nullable field.
    pub fn new(name: impl Into<String>, r#type: FieldType) -> Self {
        Self {
            name: name.into(),
            r#type,
            nullable: true,
        }
    }

    /// Marks the field as NOT NULL.
    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Table schema: name plus ordered field definitions.
///
/// The record key is not part of the field list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Table name
    pub table: String,
    /// Field definitions in declaration order
    pub fields: Vec<FieldDef>,
}

impl Schema {
    pub fn new(table: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            table: table.into(),
            fields,
        }
    }

    /// Looks up a field definition by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validates a field map for a write and coerces values to their
    /// declared types.
    ///
    /// # Errors
    /// Returns a human-readable reason for unknown fields, type mismatches
    /// and NULL in a NOT NULL field.
    pub fn conform(&self, fields: FieldMap) -> Result<FieldMap, String> {
        let mut conformed = FieldMap::new();
        for (name, value) in fields {
            let def = self
                .field(&name)
                .ok_or_else(|| format!("unknown field '{name}'"))?;
            let found = value.field_type();
            let value = def.r#type.coerce(value).ok_or_else(|| {
                format!(
                    "field '{name}' expects {}, got {found}",
                    def.r#type
                )
            })?;
            conformed.insert(name, value);
        }

        if let Some(missing) = self
            .fields
            .iter()
            .find(|f| !f.nullable && !conformed.contains_key(&f.name))
        {
            return Err(format!("field '{}' must not be null", missing.name));
        }

        Ok(conformed)
    }
}
