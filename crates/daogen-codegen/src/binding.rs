//! Injection bindings for generated DAOs.

use crate::key::ResolvedKeyType;
use crate::module::has_component;
use crate::schema::{SchemaDescriptor, TableDescriptor};
use crate::strategy::NamingStrategy;
use crate::writer::SourceWriter;
use daogen_config::GeneratorConfig;
use daogen_core::{DaogenError, DaogenResult};
use serde::Serialize;
use tracing::debug;

/// The abstraction a binding registers the DAO under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Abstraction {
    /// `dyn InterfaceDao<R, dyn I, K>`: values visible only as the interface type.
    Interface { interface: String },
    /// `dyn AsyncDao<R, V, K>`.
    Concrete,
}

/// Lifecycle of a generated binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingScope {
    /// Built with the module, one instance shared by every binding of the DAO.
    EagerSingleton,
}

/// One `HasComponent` impl of a DAO module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaoBinding {
    pub table: String,
    pub abstraction: Abstraction,
    pub record: String,
    pub value: String,
    pub key: String,
    pub implementation: String,
    pub scope: BindingScope,
}

impl DaoBinding {
    /// The bound interface type.
    #[must_use]
    pub fn signature(&self) -> String {
        match &self.abstraction {
            Abstraction::Interface { interface } => {
                format!("dyn InterfaceDao<{}, dyn {interface}, {}>", self.record, self.key)
            }
            Abstraction::Concrete => format!("dyn AsyncDao<{}, {}, {}>", self.record, self.value, self.key),
        }
    }

    /// Writes the impl resolving this binding from `module`, whose `field`
    /// holds the DAO singleton.
    pub fn render(&self, out: &mut SourceWriter, module: &str, field: &str) {
        has_component(out, module, &self.signature(), &self.implementation, field);
    }
}

/// Produces the bindings of each table's DAO.
pub struct BindingGenerator<'a> {
    strategy: &'a dyn NamingStrategy,
    config: &'a GeneratorConfig,
}

impl<'a> BindingGenerator<'a> {
    #[must_use]
    pub fn new(strategy: &'a dyn NamingStrategy, config: &'a GeneratorConfig) -> Self {
        Self { strategy, config }
    }

    /// Returns the bindings for `table`: the interface-scoped binding first
    /// (when enabled and the table has an interface type), then the
    /// concrete one.
    ///
    /// Calling this for a table without resolved key is a programming error
    /// and fails with [`DaogenError::MissingKey`].
    pub fn bindings(
        &self,
        schema: &SchemaDescriptor,
        table: &TableDescriptor,
        key: Option<&ResolvedKeyType>,
    ) -> DaogenResult<Vec<DaoBinding>> {
        let key = key.ok_or_else(|| DaogenError::MissingKey {
            table: format!("{}.{}", schema.name, table.name),
        })?;

        let concrete = DaoBinding {
            table: table.name.clone(),
            abstraction: Abstraction::Concrete,
            record: self.strategy.record_type(schema, table),
            value: self.strategy.value_type(schema, table),
            key: key.type_path().to_string(),
            implementation: self.strategy.dao_type(schema, table),
            scope: BindingScope::EagerSingleton,
        };

        let mut bindings = Vec::with_capacity(2);
        if self.config.generate_interface_binding {
            if let Some(interface) = self.strategy.interface_type(schema, table) {
                bindings.push(DaoBinding {
                    abstraction: Abstraction::Interface { interface },
                    ..concrete.clone()
                });
            }
        }
        bindings.push(concrete);

        for binding in &bindings {
            debug!(table = %table.name, binding = %binding.signature(), "Collected DAO binding");
        }
        Ok(bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyResolver;
    use crate::strategy::DefaultNamingStrategy;

    fn fixture() -> (SchemaDescriptor, TableDescriptor) {
        let table = TableDescriptor::new("something")
            .column("someid", "i32", false)
            .primary_key(["someid"]);
        (SchemaDescriptor::new("vertx"), table)
    }

    #[test]
    fn test_interface_binding_precedes_concrete() {
        let strategy = DefaultNamingStrategy::default();
        let config = GeneratorConfig::default();
        let (schema, table) = fixture();
        let key = KeyResolver::new(&strategy).resolve(&schema, &table).unwrap();

        let bindings = BindingGenerator::new(&strategy, &config)
            .bindings(&schema, &table, key.as_ref())
            .unwrap();

        assert_eq!(bindings.len(), 2);
        assert!(matches!(bindings[0].abstraction, Abstraction::Interface { .. }));
        assert_eq!(bindings[1].abstraction, Abstraction::Concrete);
        assert_eq!(bindings[0].implementation, bindings[1].implementation);
        assert_eq!(bindings[1].scope, BindingScope::EagerSingleton);

        let mut out = SourceWriter::new();
        bindings[1].render(&mut out, "DaoModule", "something_dao");
        assert_eq!(
            out.finish(),
            "impl HasComponent<dyn AsyncDao<crate::generated::vertx::tables::records::SomethingRecord, \
             crate::generated::vertx::tables::pojos::Something, i32>> for DaoModule {\n    \
             fn build_component(context: &mut ModuleBuildContext<Self>) -> \
             Arc<dyn AsyncDao<crate::generated::vertx::tables::records::SomethingRecord, \
             crate::generated::vertx::tables::pojos::Something, i32>> {\n        \
             context.build_component::<crate::generated::vertx::tables::daos::SomethingDao>()\n    }\n\n    \
             fn resolve(&self) -> Arc<dyn AsyncDao<crate::generated::vertx::tables::records::SomethingRecord, \
             crate::generated::vertx::tables::pojos::Something, i32>> {\n        \
             self.something_dao.clone()\n    }\n\n    \
             fn resolve_ref(&self) -> &dyn AsyncDao<crate::generated::vertx::tables::records::SomethingRecord, \
             crate::generated::vertx::tables::pojos::Something, i32> {\n        \
             &*self.something_dao\n    }\n}\n"
        );
        assert_eq!(
            bindings[0].signature(),
            "dyn InterfaceDao<crate::generated::vertx::tables::records::SomethingRecord, \
             dyn crate::generated::vertx::tables::interfaces::ISomething, i32>"
        );
    }

    #[test]
    fn test_interface_binding_disabled() {
        let strategy = DefaultNamingStrategy::default();
        let config = GeneratorConfig {
            generate_interface_binding: false,
            ..GeneratorConfig::default()
        };
        let (schema, table) = fixture();
        let key = KeyResolver::new(&strategy).resolve(&schema, &table).unwrap();

        let bindings = BindingGenerator::new(&strategy, &config)
            .bindings(&schema, &table, key.as_ref())
            .unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].abstraction, Abstraction::Concrete);
    }

    #[test]
    fn test_table_without_interface_type() {
        let strategy = DefaultNamingStrategy::new("crate::generated", false);
        let config = GeneratorConfig::default();
        let (schema, table) = fixture();
        let key = KeyResolver::new(&strategy).resolve(&schema, &table).unwrap();

        let bindings = BindingGenerator::new(&strategy, &config)
            .bindings(&schema, &table, key.as_ref())
            .unwrap();
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_missing_key_is_a_programming_error() {
        let strategy = DefaultNamingStrategy::default();
        let config = GeneratorConfig::default();
        let (schema, table) = fixture();

        let err = BindingGenerator::new(&strategy, &config)
            .bindings(&schema, &table, None)
            .unwrap_err();
        assert_eq!(err.error_code(), "MISSING_KEY");
        assert!(err.to_string().contains("vertx.something"));
    }
}
