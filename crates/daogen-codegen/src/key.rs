//! Primary key resolution.

use crate::schema::{SchemaDescriptor, TableDescriptor};
use crate::strategy::NamingStrategy;
use daogen_core::{DaogenError, DaogenResult};
use serde::Serialize;

/// The key type generated code uses for a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedKeyType {
    /// Single-column key; the column's own type.
    Single { column: String, type_name: String },
    /// Multi-column key; a generated struct.
    Composite(CompositeKeyType),
}

impl ResolvedKeyType {
    /// The key type as written in generated code.
    #[must_use]
    pub fn type_path(&self) -> &str {
        match self {
            Self::Single { type_name, .. } => type_name,
            Self::Composite(composite) => &composite.path,
        }
    }

    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }
}

/// A generated composite key struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeKeyType {
    /// Struct name.
    pub type_name: String,
    /// Full path of the struct.
    pub path: String,
    /// Fields in key declaration order.
    pub fields: Vec<KeyField>,
}

impl CompositeKeyType {
    /// Whether every field supports total equality, ordering and hashing.
    #[must_use]
    pub fn is_totally_ordered(&self) -> bool {
        self.fields.iter().all(|f| !mentions_float(&f.type_name))
    }
}

/// Whether any path segment or type argument of `type_name` is `f32` or
/// `f64`, e.g. `Option<f64>` or `std::primitive::f32`.
fn mentions_float(type_name: &str) -> bool {
    type_name
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|segment| matches!(segment, "f32" | "f64"))
}

/// One column of a composite key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyField {
    /// Column name in the schema.
    pub column: String,
    /// Field name on the value type and on the key struct.
    pub member: String,
    pub type_name: String,
}

/// Determines each table's key type from its primary key.
pub struct KeyResolver<'a> {
    strategy: &'a dyn NamingStrategy,
}

impl<'a> KeyResolver<'a> {
    #[must_use]
    pub fn new(strategy: &'a dyn NamingStrategy) -> Self {
        Self { strategy }
    }

    /// Resolves the key type of `table`.
    ///
    /// Returns `Ok(None)` for a table without primary key. A key that is
    /// empty or names a column the table does not have is malformed.
    pub fn resolve(&self, schema: &SchemaDescriptor, table: &TableDescriptor) -> DaogenResult<Option<ResolvedKeyType>> {
        let Some(primary_key) = &table.primary_key else {
            return Ok(None);
        };

        let columns = primary_key
            .columns
            .iter()
            .map(|name| {
                table.find_column(name).ok_or_else(|| {
                    DaogenError::malformed(
                        &schema.name,
                        &table.name,
                        format!("primary key references unknown column {name}"),
                    )
                })
            })
            .collect::<DaogenResult<Vec<_>>>()?;

        match columns.as_slice() {
            [] => Err(DaogenError::malformed(&schema.name, &table.name, "primary key has no columns")),
            [column] => Ok(Some(ResolvedKeyType::Single {
                column: column.name.clone(),
                type_name: column.rust_type.clone(),
            })),
            _ => Ok(Some(ResolvedKeyType::Composite(CompositeKeyType {
                type_name: self.strategy.composite_key_name(table),
                path: self.strategy.composite_key_type(schema, table),
                fields: columns
                    .iter()
                    .map(|c| KeyField {
                        column: c.name.clone(),
                        member: self.strategy.member_name(&c.name),
                        type_name: c.rust_type.clone(),
                    })
                    .collect(),
            }))),
        }
    }
}
