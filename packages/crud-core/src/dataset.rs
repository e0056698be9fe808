//! Dataset fixtures: tables of rows loaded from YAML or JSON and seeded
//! into a record store before a scenario runs.
//!
//! File format, one top-level key per table:
//!
//! ```yaml
//! car:
//!   - id: 1
//!     model: "Ferrari"
//!     price: 2450.8
//! ```
//!
//! The optional `id` column becomes the record key. NULL cells are skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::CrudConfig;
use crate::error::DatasetError;
use crate::record::{FieldDef, FieldMap, NewRecord, RecordId, Schema};
use crate::store::RecordStore;
use crate::value::{FieldType, Value};

/// Column holding the record key.
pub const ID_COLUMN: &str = "id";

/// One dataset row: column name to optional cell value.
pub type Row = BTreeMap<String, Option<Value>>;

/// How seeding treats rows already in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedStrategy {
    /// Append rows to whatever the tables already hold
    Insert,
    /// Clear every table named in the dataset, then insert
    #[default]
    CleanInsert,
}

/// A parsed dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    tables: BTreeMap<String, Vec<Row>>,
}

impl Dataset {
    pub fn from_yaml_str(source: &str) -> Result<Self, DatasetError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, DatasetError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads a dataset file, picking the parser from the extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let source = fs::read_to_string(path)?;
        tracing::debug!("Loading dataset {}", path.display());

        match extension.as_str() {
            "yml" | "yaml" => Self::from_yaml_str(&source),
            "json" => Self::from_json_str(&source),
            other => Err(DatasetError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Loads a dataset by name, relative to the configured dataset directory.
    pub fn load_named(config: &CrudConfig, name: &str) -> Result<Self, DatasetError> {
        Self::load(config.dataset_dir.join(name))
    }

    /// Table names in the dataset.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Rows of a table; empty when the dataset does not mention it.
    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    /// Derives a nullable schema for a table from the cells it holds.
    ///
    /// Columns keep the type of their first non-NULL cell; an integer column
    /// that also holds floats widens to `Float`. Columns that are NULL in
    /// every row default to `Text`.
    pub fn infer_schema(&self, table: &str) -> Result<Schema, DatasetError> {
        let mut types: BTreeMap<&str, Option<FieldType>> = BTreeMap::new();

        for (index, row) in self.rows(table).iter().enumerate() {
            for (column, cell) in row {
                if column == ID_COLUMN {
                    continue;
                }
                let slot = types.entry(column.as_str()).or_default();
                let Some(found) = cell.as_ref().map(Value::field_type) else {
                    continue;
                };
                *slot = match *slot {
                    None => Some(found),
                    Some(known) if known == found => Some(known),
                    Some(FieldType::Int) if found == FieldType::Float => Some(FieldType::Float),
                    Some(FieldType::Float) if found == FieldType::Int => Some(FieldType::Float),
                    Some(known) => {
                        return Err(DatasetError::InvalidRow {
                            table: table.to_string(),
                            row: index,
                            reason: format!("column '{column}' mixes {known} and {found}"),
                        })
                    }
                };
            }
        }

        let fields = types
            .into_iter()
            .map(|(name, ty)| FieldDef::new(name, ty.unwrap_or(FieldType::Text)))
            .collect();
        Ok(Schema::new(table, fields))
    }

    /// Seeds the store and returns the number of inserted rows.
    ///
    /// # Errors
    /// `InvalidRow` for a malformed `id` cell, `Store` when the store
    /// rejects a row (unknown table, schema violation, duplicate key).
    pub fn seed<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        strategy: SeedStrategy,
    ) -> Result<usize, DatasetError> {
        if strategy == SeedStrategy::CleanInsert {
            self.cleanup(store)?;
        }

        let mut inserted = 0;
        for (table, rows) in &self.tables {
            for (index, row) in rows.iter().enumerate() {
                let record = to_new_record(table, index, row)?;
                store.insert(table, record)?;
                inserted += 1;
            }
            tracing::info!("Seeded {} rows into {}", rows.len(), table);
        }
        Ok(inserted)
    }

    /// Clears every table named in the dataset.
    pub fn cleanup<S: RecordStore + ?Sized>(&self, store: &S) -> Result<(), DatasetError> {
        for table in self.tables.keys() {
            store.clear(table)?;
        }
        Ok(())
    }
}

fn to_new_record(table: &str, index: usize, row: &Row) -> Result<NewRecord, DatasetError> {
    let mut record = NewRecord::default();
    let mut fields = FieldMap::new();

    for (column, cell) in row {
        let Some(value) = cell else {
            continue;
        };
        if column == ID_COLUMN {
            let id = match value {
                Value::Int(id) if *id >= 0 => RecordId(*id as u64),
                other => {
                    return Err(DatasetError::InvalidRow {
                        table: table.to_string(),
                        row: index,
                        reason: format!("id must be a non-negative integer, got '{other}'"),
                    })
                }
            };
            record.id = Some(id);
        } else {
            fields.insert(column.clone(), value.clone());
        }
    }

    record.fields = fields;
    Ok(record)
}
