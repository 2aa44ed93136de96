//! Relational schema metadata the generator consumes.
//!
//! Descriptors are plain data, usually loaded from a JSON catalog
//! exported by whatever reads the live database.

use daogen_core::{DaogenError, DaogenResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A set of schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub schemas: Vec<SchemaDescriptor>,
}

impl Catalog {
    /// Parses a catalog from JSON.
    pub fn from_json_str(json: &str) -> DaogenResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a catalog file.
    pub fn from_json_file(path: impl AsRef<Path>) -> DaogenResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| DaogenError::io(path.display().to_string(), e))?;
        Self::from_json_str(&json)
    }

    /// Finds a schema by name.
    #[must_use]
    pub fn schema(&self, name: &str) -> Option<&SchemaDescriptor> {
        self.schemas.iter().find(|s| s.name == name)
    }
}

/// A named group of tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableDescriptor>,
}

impl SchemaDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_table(mut self, table: TableDescriptor) -> Self {
        self.tables.push(table);
        self
    }

    /// Checks the structure the generator relies on: unique table names
    /// and unique column names per table.
    pub fn validate(&self) -> DaogenResult<()> {
        let mut tables = HashSet::new();
        for table in &self.tables {
            if !tables.insert(table.name.as_str()) {
                return Err(DaogenError::malformed(&self.name, &table.name, "duplicate table name"));
            }
            let mut columns = HashSet::new();
            for column in &table.columns {
                if !columns.insert(column.name.as_str()) {
                    return Err(DaogenError::malformed(
                        &self.name,
                        &table.name,
                        format!("duplicate column {}", column.name),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A table with its columns and optional primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub primary_key: Option<PrimaryKeyDescriptor>,
}

impl TableDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
        }
    }

    #[must_use]
    pub fn column(mut self, name: impl Into<String>, rust_type: impl Into<String>, nullable: bool) -> Self {
        self.columns.push(ColumnDescriptor {
            name: name.into(),
            rust_type: rust_type.into(),
            nullable,
        });
        self
    }

    #[must_use]
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = Some(PrimaryKeyDescriptor {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared semantic type, e.g. `i32` or `String`.
    pub rust_type: String,
    #[serde(default)]
    pub nullable: bool,
}

/// Primary key constraint; `columns` are in key declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    pub columns: Vec<String>,
}
