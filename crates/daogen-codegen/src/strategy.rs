//! Naming of generated types, members and files.

use crate::schema::{Catalog, SchemaDescriptor, TableDescriptor};
use convert_case::{Case, Casing};
use daogen_config::OutputConfig;
use daogen_core::{DaogenError, DaogenResult};
use std::collections::HashMap;
use std::path::PathBuf;

/// Supplies every name the generator emits.
///
/// Type names are full Rust paths as seen from generated code; file paths
/// are relative to the output target directory.
pub trait NamingStrategy: Send + Sync {
    /// Record type of a table (the mapping layer's row representation).
    fn record_type(&self, schema: &SchemaDescriptor, table: &TableDescriptor) -> String;

    /// Value type of a table (the plain data type DAOs return).
    fn value_type(&self, schema: &SchemaDescriptor, table: &TableDescriptor) -> String;

    /// Interface type of a table, if the table exposes one.
    fn interface_type(&self, schema: &SchemaDescriptor, table: &TableDescriptor) -> Option<String>;

    /// Simple name of the DAO struct.
    fn dao_name(&self, table: &TableDescriptor) -> String;

    /// Full path of the DAO struct.
    fn dao_type(&self, schema: &SchemaDescriptor, table: &TableDescriptor) -> String;

    /// Rust module holding the DAO.
    fn dao_module_name(&self, table: &TableDescriptor) -> String;

    /// Directory the DAO files of a schema go to.
    fn dao_dir(&self, schema: &SchemaDescriptor) -> PathBuf;

    /// Simple name of a table's composite key struct.
    fn composite_key_name(&self, table: &TableDescriptor) -> String;

    /// Full path of a table's composite key struct.
    fn composite_key_type(&self, schema: &SchemaDescriptor, table: &TableDescriptor) -> String;

    /// Field name of a column on the value type and on composite keys.
    fn member_name(&self, column: &str) -> String;

    /// Directory the schema's module file goes to.
    fn module_dir(&self, schema: &SchemaDescriptor) -> PathBuf;

    /// Full path of the schema's module struct.
    fn module_type(&self, schema: &SchemaDescriptor) -> String;

    /// File of a table's DAO.
    fn dao_file(&self, schema: &SchemaDescriptor, table: &TableDescriptor) -> PathBuf {
        self.dao_dir(schema).join(format!("{}.rs", self.dao_module_name(table)))
    }

    /// File of the schema's module.
    fn module_file(&self, schema: &SchemaDescriptor) -> PathBuf {
        self.module_dir(schema).join("dao_module.rs")
    }
}

/// Checks that the names `strategy` derives for the keyed tables of a
/// schema are distinct: DAO modules, the DAO and key structs sharing one
/// module, and the members of each table.
///
/// Distinct table or column names can still collide once cased, e.g.
/// `some_thing` and `SomeThing`.
pub fn validate_names(strategy: &dyn NamingStrategy, schema: &SchemaDescriptor) -> DaogenResult<()> {
    let mut modules = HashMap::new();
    let mut types = HashMap::new();

    for table in schema.tables.iter().filter(|t| t.primary_key.is_some()) {
        claim(&mut modules, strategy.dao_module_name(table), "DAO module", schema, table)?;
        claim(&mut types, strategy.dao_name(table), "type", schema, table)?;
        if table.primary_key.as_ref().is_some_and(|pk| pk.columns.len() > 1) {
            claim(&mut types, strategy.composite_key_name(table), "type", schema, table)?;
        }

        let mut members = HashMap::new();
        for column in &table.columns {
            let member = strategy.member_name(&column.name);
            if let Some(other) = members.insert(member.clone(), column.name.as_str()) {
                return Err(DaogenError::malformed(
                    &schema.name,
                    &table.name,
                    format!("columns {other} and {} both map to member {member}", column.name),
                ));
            }
        }
    }
    Ok(())
}

/// Checks that no two schemas of a catalog share generated modules or
/// output directories.
pub fn validate_schema_names(strategy: &dyn NamingStrategy, catalog: &Catalog) -> DaogenResult<()> {
    let mut modules = HashMap::new();
    let mut dirs = HashMap::new();

    for schema in &catalog.schemas {
        let module = strategy.module_type(schema);
        if let Some(other) = modules.insert(module.clone(), schema.name.as_str()) {
            return Err(DaogenError::malformed(
                &schema.name,
                "*",
                format!("schema {other} already generates {module}"),
            ));
        }
        let dir = strategy.dao_dir(schema);
        if let Some(other) = dirs.insert(dir.clone(), schema.name.as_str()) {
            return Err(DaogenError::malformed(
                &schema.name,
                "*",
                format!("schema {other} already writes to {}", dir.display()),
            ));
        }
    }
    Ok(())
}

fn claim<'a>(
    seen: &mut HashMap<String, &'a str>,
    name: String,
    kind: &str,
    schema: &SchemaDescriptor,
    table: &'a TableDescriptor,
) -> DaogenResult<()> {
    match seen.insert(name.clone(), table.name.as_str()) {
        Some(other) => Err(DaogenError::malformed(
            &schema.name,
            &table.name,
            format!("{kind} {name} is also derived from table {other}"),
        )),
        None => Ok(()),
    }
}

/// Derives names from table and column names.
///
/// For schema `vertx`, table `something` and root `crate::generated`:
///
/// ```text
/// crate::generated::vertx::tables::records::SomethingRecord
/// crate::generated::vertx::tables::pojos::Something
/// crate::generated::vertx::tables::interfaces::ISomething
/// crate::generated::vertx::tables::daos::SomethingDao     vertx/tables/daos/something_dao.rs
/// crate::generated::vertx::tables::modules::DaoModule     vertx/tables/modules/dao_module.rs
/// ```
#[derive(Debug, Clone)]
pub struct DefaultNamingStrategy {
    root_module: String,
    interfaces: bool,
}

impl DefaultNamingStrategy {
    #[must_use]
    pub fn new(root_module: impl Into<String>, interfaces: bool) -> Self {
        Self {
            root_module: root_module.into(),
            interfaces,
        }
    }

    /// Builds the strategy from output settings.
    #[must_use]
    pub fn from_output(output: &OutputConfig, interfaces: bool) -> Self {
        Self::new(output.root_module.clone(), interfaces)
    }

    fn tables_path(&self, schema: &SchemaDescriptor) -> String {
        format!("{}::{}::tables", self.root_module, schema_module(schema))
    }
}

impl Default for DefaultNamingStrategy {
    fn default() -> Self {
        Self::from_output(&OutputConfig::default(), true)
    }
}

impl NamingStrategy for DefaultNamingStrategy {
    fn record_type(&self, schema: &SchemaDescriptor, table: &TableDescriptor) -> String {
        format!("{}::records::{}Record", self.tables_path(schema), pascal(&table.name))
    }

    fn value_type(&self, schema: &SchemaDescriptor, table: &TableDescriptor) -> String {
        format!("{}::pojos::{}", self.tables_path(schema), pascal(&table.name))
    }

    fn interface_type(&self, schema: &SchemaDescriptor, table: &TableDescriptor) -> Option<String> {
        self.interfaces
            .then(|| format!("{}::interfaces::I{}", self.tables_path(schema), pascal(&table.name)))
    }

    fn dao_name(&self, table: &TableDescriptor) -> String {
        format!("{}Dao", pascal(&table.name))
    }

    fn dao_type(&self, schema: &SchemaDescriptor, table: &TableDescriptor) -> String {
        format!("{}::daos::{}", self.tables_path(schema), self.dao_name(table))
    }

    fn dao_module_name(&self, table: &TableDescriptor) -> String {
        format!("{}_dao", table.name.to_case(Case::Snake))
    }

    fn dao_dir(&self, schema: &SchemaDescriptor) -> PathBuf {
        [schema_module(schema).as_str(), "tables", "daos"].iter().collect()
    }

    fn composite_key_name(&self, table: &TableDescriptor) -> String {
        format!("{}Key", pascal(&table.name))
    }

    fn composite_key_type(&self, schema: &SchemaDescriptor, table: &TableDescriptor) -> String {
        format!("{}::daos::{}", self.tables_path(schema), self.composite_key_name(table))
    }

    fn member_name(&self, column: &str) -> String {
        escape_keyword(column.to_case(Case::Snake))
    }

    fn module_dir(&self, schema: &SchemaDescriptor) -> PathBuf {
        [schema_module(schema).as_str(), "tables", "modules"].iter().collect()
    }

    fn module_type(&self, schema: &SchemaDescriptor) -> String {
        format!("{}::modules::DaoModule", self.tables_path(schema))
    }
}

/// Last segment of a `::` separated path.
pub(crate) fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

fn pascal(name: &str) -> String {
    name.to_case(Case::Pascal)
}

fn schema_module(schema: &SchemaDescriptor) -> String {
    escape_keyword(schema.name.to_case(Case::Snake))
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "dyn", "else", "enum", "extern", "false", "fn",
    "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static",
    "struct", "trait", "true", "try", "type", "unsafe", "use", "where", "while", "yield",
];

fn escape_keyword(ident: String) -> String {
    if KEYWORDS.contains(&ident.as_str()) {
        format!("r#{ident}")
    } else {
        ident
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (SchemaDescriptor, TableDescriptor) {
        (SchemaDescriptor::new("VERTX"), TableDescriptor::new("SOMETHINGCOMPOSITE"))
    }

    #[test]
    fn test_type_paths() {
        let strategy = DefaultNamingStrategy::default();
        let (schema, table) = fixture();
        assert_eq!(
            strategy.record_type(&schema, &table),
            "crate::generated::vertx::tables::records::SomethingcompositeRecord"
        );
        assert_eq!(
            strategy.value_type(&schema, &table),
            "crate::generated::vertx::tables::pojos::Somethingcomposite"
        );
        assert_eq!(
            strategy.interface_type(&schema, &table).as_deref(),
            Some("crate::generated::vertx::tables::interfaces::ISomethingcomposite")
        );
        assert_eq!(
            strategy.dao_type(&schema, &table),
            "crate::generated::vertx::tables::daos::SomethingcompositeDao"
        );
        assert_eq!(
            strategy.composite_key_type(&schema, &table),
            "crate::generated::vertx::tables::daos::SomethingcompositeKey"
        );
        assert_eq!(strategy.module_type(&schema), "crate::generated::vertx::tables::modules::DaoModule");
    }

    #[test]
    fn test_file_paths() {
        let strategy = DefaultNamingStrategy::default();
        let schema = SchemaDescriptor::new("vertx");
        let table = TableDescriptor::new("user_account");
        assert_eq!(
            strategy.dao_file(&schema, &table),
            PathBuf::from("vertx/tables/daos/user_account_dao.rs")
        );
        assert_eq!(strategy.module_file(&schema), PathBuf::from("vertx/tables/modules/dao_module.rs"));
        assert_eq!(strategy.dao_name(&table), "UserAccountDao");
    }

    #[test]
    fn test_interfaces_disabled() {
        let strategy = DefaultNamingStrategy::new("crate::db", false);
        let (schema, table) = fixture();
        assert!(strategy.interface_type(&schema, &table).is_none());
        assert!(strategy.value_type(&schema, &table).starts_with("crate::db::vertx::"));
    }

    fn keyed(name: &str) -> TableDescriptor {
        TableDescriptor::new(name).column("id", "i64", false).primary_key(["id"])
    }

    #[test]
    fn test_distinct_names_pass() {
        let strategy = DefaultNamingStrategy::default();
        let schema = SchemaDescriptor::new("vertx")
            .with_table(keyed("something"))
            .with_table(keyed("somethingcomposite"))
            .with_table(TableDescriptor::new("Something"));
        validate_names(&strategy, &schema).unwrap();
    }

    #[test]
    fn test_tables_colliding_once_cased() {
        let strategy = DefaultNamingStrategy::default();
        let schema = SchemaDescriptor::new("vertx")
            .with_table(keyed("some_thing"))
            .with_table(keyed("SomeThing"));

        let err = validate_names(&strategy, &schema).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_METADATA");
        assert!(err.to_string().contains("vertx.SomeThing"));
        assert!(err.to_string().contains("some_thing_dao is also derived from table some_thing"));
    }

    #[test]
    fn test_members_colliding() {
        let strategy = DefaultNamingStrategy::default();
        let schema = SchemaDescriptor::new("vertx").with_table(
            TableDescriptor::new("somethingcomposite")
                .column("someId", "i32", false)
                .column("some_id", "i32", false)
                .primary_key(["someId", "some_id"]),
        );

        let err = validate_names(&strategy, &schema).unwrap_err();
        assert!(err.to_string().contains("vertx.somethingcomposite"));
        assert!(err.to_string().contains("columns someId and some_id both map to member some_id"));
    }

    #[test]
    fn test_schemas_colliding_in_catalog() {
        let strategy = DefaultNamingStrategy::default();
        let catalog = Catalog {
            schemas: vec![SchemaDescriptor::new("Vertx"), SchemaDescriptor::new("vertx")],
        };

        let err = validate_schema_names(&strategy, &catalog).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_METADATA");
        assert!(err.to_string().contains("schema Vertx already generates crate::generated::vertx::tables::modules::DaoModule"));
    }

    #[test]
    fn test_member_names() {
        let strategy = DefaultNamingStrategy::default();
        assert_eq!(strategy.member_name("SOMESECONDID"), "somesecondid");
        assert_eq!(strategy.member_name("createdAt"), "created_at");
        assert_eq!(strategy.member_name("type"), "r#type");
    }
}
