//! Per-table DAO source.
//!
//! A generated DAO is a thin struct over the runtime's `DaoSupport`. It
//! implements `SupportedDao`, which gives it the full `AsyncDao` contract,
//! plus `InterfaceView` when the table is bound by interface and a shaku
//! `Component` impl, generic over any module supplying its mapper and the
//! executor, when injection annotations are on.

use crate::key::{CompositeKeyType, ResolvedKeyType};
use crate::schema::{SchemaDescriptor, TableDescriptor};
use crate::strategy::{last_segment, NamingStrategy};
use crate::writer::{Artifact, SourceWriter, GENERATED_HEADER};
use daogen_config::GeneratorConfig;
use std::path::Path;

/// Emits DAO files.
pub struct DaoEmitter<'a> {
    strategy: &'a dyn NamingStrategy,
    config: &'a GeneratorConfig,
    runtime: &'a str,
}

/// Type names of one table as seen from inside its DAO file.
struct TableTypes {
    record: String,
    value: String,
    interface: Option<String>,
    key: String,
    imports: Vec<String>,
}

impl<'a> DaoEmitter<'a> {
    #[must_use]
    pub fn new(strategy: &'a dyn NamingStrategy, config: &'a GeneratorConfig, runtime: &'a str) -> Self {
        Self {
            strategy,
            config,
            runtime,
        }
    }

    /// Emits the DAO of one table.
    #[must_use]
    pub fn emit(&self, schema: &SchemaDescriptor, table: &TableDescriptor, key: &ResolvedKeyType) -> Artifact {
        let types = self.table_types(schema, table, key);
        let dao = self.strategy.dao_name(table);
        let view = self.config.generate_interface_binding && types.interface.is_some();
        let inject = self.config.generate_injection_annotations;

        let mut runtime_items = vec!["BlockingExecutor", "DaoSupport", "SupportedDao", "TableMapper"];
        if view {
            runtime_items.push("InterfaceView");
        }
        if inject {
            runtime_items.extend(["Component", "HasComponent", "Module", "ModuleBuildContext"]);
        }
        runtime_items.sort_unstable();

        let mut out = SourceWriter::new();
        out.println(GENERATED_HEADER);
        out.println(format!("// DAO for table {}.{}", schema.name, table.name));
        out.newline();
        out.println(format!("use {}::{{{}}};", self.runtime, runtime_items.join(", ")));
        out.println("use std::sync::Arc;");
        for import in &types.imports {
            out.println(format!("use {import};"));
        }
        out.newline();

        if let ResolvedKeyType::Composite(composite) = key {
            composite_key(&mut out, schema, table, composite);
        }

        let params = format!("{}, {}, {}", types.record, types.value, types.key);

        out.println(format!("/// Asynchronous DAO for `{}.{}`.", schema.name, table.name));
        out.println(format!("pub struct {dao} {{"));
        out.tab(1).println(format!("support: DaoSupport<{params}>,"));
        out.println("}");
        out.newline();

        out.println(format!("impl {dao} {{"));
        out.tab(1).println("/// Table the DAO operates on.");
        out.tab(1).println(format!("pub const TABLE: &'static str = {:?};", table.name));
        out.newline();
        out.tab(1).println("/// Creates the DAO over a mapping layer and a blocking executor.");
        out.tab(1).println("#[must_use]");
        out.tab(1)
            .println(format!("pub fn new(mapper: Arc<dyn TableMapper<{params}>>, executor: BlockingExecutor) -> Self {{"));
        out.tab(2).println("Self {");
        out.tab(3).println("support: DaoSupport::new(Self::TABLE, mapper, executor, Self::key_of),");
        out.tab(2).println("}");
        out.tab(1).println("}");
        out.newline();
        out.tab(1).println("/// Reads the primary key of a value, `None` while any key column is unset.");
        out.tab(1).println("#[must_use]");
        out.tab(1)
            .println(format!("pub fn key_of(value: &{}) -> Option<{}> {{", types.value, types.key));
        out.tab(2).println(self.key_expression(key));
        out.tab(1).println("}");
        out.println("}");
        out.newline();

        out.println(format!("impl SupportedDao<{params}> for {dao} {{"));
        out.tab(1).println(format!("fn support(&self) -> &DaoSupport<{params}> {{"));
        out.tab(2).println("&self.support");
        out.tab(1).println("}");
        out.println("}");

        if let (true, Some(interface)) = (view, &types.interface) {
            out.newline();
            out.println(format!(
                "impl InterfaceView<{}, dyn {interface}, {}> for {dao} {{",
                types.record, types.key
            ));
            out.tab(1).println(format!("type Value = {};", types.value));
            out.newline();
            out.tab(1).println(format!("fn view_support(&self) -> &DaoSupport<{params}> {{"));
            out.tab(2).println("&self.support");
            out.tab(1).println("}");
            out.newline();
            out.tab(1)
                .println(format!("fn view(value: {}) -> Box<dyn {interface}> {{", types.value));
            out.tab(2).println("Box::new(value)");
            out.tab(1).println("}");
            out.println("}");
        }

        if inject {
            let mapper = format!("dyn TableMapper<{params}>");
            out.newline();
            out.println(format!("impl<M> Component<M> for {dao}"));
            out.println("where");
            out.tab(1)
                .println(format!("M: Module + HasComponent<{mapper}> + HasComponent<BlockingExecutor>,"));
            out.println("{");
            out.tab(1).println("type Interface = Self;");
            out.tab(1).println("type Parameters = ();");
            out.newline();
            out.tab(1).println("fn build(context: &mut ModuleBuildContext<M>, _: ()) -> Box<Self> {");
            out.tab(2)
                .println(format!("let mapper = <M as HasComponent<{mapper}>>::build_component(context);"));
            out.tab(2).println("let executor = <M as HasComponent<BlockingExecutor>>::build_component(context);");
            out.tab(2).println("Box::new(Self::new(mapper, BlockingExecutor::clone(&executor)))");
            out.tab(1).println("}");
            out.println("}");
        }

        Artifact {
            path: self.strategy.dao_file(schema, table),
            contents: out.finish(),
        }
    }

    /// Emits the `mod.rs` of a schema's DAO directory, listing DAOs in the
    /// given order.
    #[must_use]
    pub fn emit_index(&self, schema: &SchemaDescriptor, tables: &[(&TableDescriptor, &ResolvedKeyType)]) -> Artifact {
        let mut out = SourceWriter::new();
        out.println(GENERATED_HEADER);
        out.newline();
        for (table, _) in tables {
            out.println(format!("mod {};", self.strategy.dao_module_name(table)));
        }
        if !tables.is_empty() {
            out.newline();
        }
        for (table, key) in tables {
            let module = self.strategy.dao_module_name(table);
            let dao = self.strategy.dao_name(table);
            match key {
                ResolvedKeyType::Composite(composite) => {
                    out.println(format!("pub use {module}::{{{dao}, {}}};", composite.type_name));
                }
                ResolvedKeyType::Single { .. } => {
                    out.println(format!("pub use {module}::{dao};"));
                }
            }
        }

        Artifact {
            path: self.strategy.dao_dir(schema).join(Path::new("mod.rs")),
            contents: out.finish(),
        }
    }

    fn table_types(&self, schema: &SchemaDescriptor, table: &TableDescriptor, key: &ResolvedKeyType) -> TableTypes {
        let record = self.strategy.record_type(schema, table);
        let value = self.strategy.value_type(schema, table);
        let interface = self.strategy.interface_type(schema, table);

        let mut imports = vec![record.clone(), value.clone()];
        if self.config.generate_interface_binding {
            imports.extend(interface.clone());
        }
        imports.sort();

        TableTypes {
            record: last_segment(&record).to_string(),
            value: last_segment(&value).to_string(),
            interface: interface.as_deref().map(|i| last_segment(i).to_string()),
            key: match key {
                ResolvedKeyType::Single { type_name, .. } => type_name.clone(),
                ResolvedKeyType::Composite(composite) => composite.type_name.clone(),
            },
            imports,
        }
    }

    fn key_expression(&self, key: &ResolvedKeyType) -> String {
        match key {
            ResolvedKeyType::Single { column, .. } => {
                format!("value.{}.clone()", self.strategy.member_name(column))
            }
            ResolvedKeyType::Composite(composite) => {
                let fields: Vec<String> = composite
                    .fields
                    .iter()
                    .map(|f| format!("value.{}.clone()?", f.member))
                    .collect();
                format!("Some({}::new({}))", composite.type_name, fields.join(", "))
            }
        }
    }
}

fn composite_key(out: &mut SourceWriter, schema: &SchemaDescriptor, table: &TableDescriptor, key: &CompositeKeyType) {
    let derives = if key.is_totally_ordered() {
        "Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash"
    } else {
        "Debug, Clone, PartialEq, PartialOrd"
    };
    let name = &key.type_name;

    out.println(format!("/// Primary key of `{}.{}`.", schema.name, table.name));
    out.println(format!("#[derive({derives})]"));
    out.println(format!("pub struct {name} {{"));
    for field in &key.fields {
        out.tab(1).println(format!("{}: {},", field.member, field.type_name));
    }
    out.println("}");
    out.newline();

    let params: Vec<String> = key
        .fields
        .iter()
        .map(|f| format!("{}: {}", f.member, f.type_name))
        .collect();
    let members: Vec<&str> = key.fields.iter().map(|f| f.member.as_str()).collect();

    out.println(format!("impl {name} {{"));
    out.tab(1).println("#[must_use]");
    out.tab(1).println(format!("pub const fn new({}) -> Self {{", params.join(", ")));
    out.tab(2).println(format!("Self {{ {} }}", members.join(", ")));
    out.tab(1).println("}");
    for field in &key.fields {
        out.newline();
        out.tab(1).println("#[must_use]");
        out.tab(1)
            .println(format!("pub const fn {}(&self) -> &{} {{", field.member, field.type_name));
        out.tab(2).println(format!("&self.{}", field.member));
        out.tab(1).println("}");
    }
    out.println("}");
    out.newline();
}
