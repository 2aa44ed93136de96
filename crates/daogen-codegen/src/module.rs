//! The per-schema DAO module.
//!
//! A generated `DaoModule` is a shaku module. It builds the executor, one
//! mapper per table and one singleton per DAO, then resolves every binding
//! of a DAO to that same singleton.

use crate::binding::{Abstraction, DaoBinding};
use crate::schema::SchemaDescriptor;
use crate::strategy::{last_segment, NamingStrategy};
use crate::writer::{Artifact, SourceWriter, GENERATED_HEADER};
use daogen_config::GeneratorConfig;
use tracing::debug;

/// The bindings collected for one table.
#[derive(Debug, Clone)]
pub struct TableBindings {
    pub table: String,
    /// Module field holding the DAO singleton.
    pub field: String,
    pub bindings: Vec<DaoBinding>,
}

impl TableBindings {
    fn mapper_field(&self) -> String {
        format!("{}_mapper", self.field)
    }

    /// The binding every table has, carrying the full type triple.
    fn concrete(&self) -> Option<&DaoBinding> {
        self.bindings.iter().find(|b| b.abstraction == Abstraction::Concrete)
    }
}

/// A rendered module and its directory index.
#[derive(Debug, Clone)]
pub struct ModuleArtifact {
    pub module: Artifact,
    pub index: Artifact,
    pub binding_count: usize,
}

/// Renders a schema's bindings into one `DaoModule`.
pub struct ModuleEmitter<'a> {
    strategy: &'a dyn NamingStrategy,
    config: &'a GeneratorConfig,
    runtime: &'a str,
}

impl<'a> ModuleEmitter<'a> {
    #[must_use]
    pub fn new(strategy: &'a dyn NamingStrategy, config: &'a GeneratorConfig, runtime: &'a str) -> Self {
        Self {
            strategy,
            config,
            runtime,
        }
    }

    /// Renders every binding, in table order and then binding order.
    ///
    /// When DAOs are generated without their own `Component` impl, the
    /// module supplies one, so the module builds either way.
    #[must_use]
    pub fn emit(&self, schema: &SchemaDescriptor, tables: &[TableBindings]) -> ModuleArtifact {
        let module_type = self.strategy.module_type(schema);
        let module = last_segment(&module_type);
        let tables: Vec<(&TableBindings, &DaoBinding)> =
            tables.iter().filter_map(|t| t.concrete().map(|c| (t, c))).collect();
        let binding_count = tables.iter().map(|(t, _)| t.bindings.len()).sum();
        let local_components = !self.config.generate_injection_annotations;

        let mut runtime_items = vec!["BlockingExecutor", "HasComponent", "Module", "ModuleBuildContext", "ModuleBuilder"];
        if !tables.is_empty() {
            runtime_items.extend(["MapperComponent", "TableMapper"]);
            if local_components {
                runtime_items.push("Component");
            }
        }
        let abstractions = || tables.iter().flat_map(|(t, _)| &t.bindings).map(|b| &b.abstraction);
        if abstractions().any(|a| *a == Abstraction::Concrete) {
            runtime_items.push("AsyncDao");
        }
        if abstractions().any(|a| matches!(a, Abstraction::Interface { .. })) {
            runtime_items.push("InterfaceDao");
        }
        runtime_items.sort_unstable();

        let mut out = SourceWriter::new();
        out.println(GENERATED_HEADER);
        out.println(format!("// DAO bindings for schema {}", schema.name));
        out.newline();
        out.println(format!("use {}::{{{}}};", self.runtime, runtime_items.join(", ")));
        out.println("use std::sync::Arc;");
        out.newline();

        out.println(format!("/// Binds every DAO of schema `{}` as a singleton.", schema.name));
        out.println(format!("pub struct {module} {{"));
        out.tab(1).println("executor: Arc<BlockingExecutor>,");
        for (table, concrete) in &tables {
            out.tab(1)
                .println(format!("{}: Arc<{}>,", table.mapper_field(), mapper_interface(concrete)));
            out.tab(1)
                .println(format!("{}: Arc<{}>,", table.field, concrete.implementation));
        }
        out.println("}");
        out.newline();

        out.println(format!("impl {module} {{"));
        out.tab(1).println("#[must_use]");
        out.tab(1).println("pub fn builder() -> ModuleBuilder<Self> {");
        out.tab(2).println("ModuleBuilder::with_submodules(())");
        out.tab(1).println("}");
        out.println("}");
        out.newline();

        out.println(format!("impl Module for {module} {{"));
        out.tab(1).println("type Submodules = ();");
        out.newline();
        out.tab(1).println("fn build(mut context: ModuleBuildContext<Self>) -> Self {");
        out.tab(2).println("Self {");
        out.tab(3).println("executor: context.build_component::<BlockingExecutor>(),");
        for (table, concrete) in &tables {
            out.tab(3).println(format!(
                "{}: context.build_component::<{}>(),",
                table.mapper_field(),
                mapper_component(concrete)
            ));
            out.tab(3).println(format!(
                "{}: context.build_component::<{}>(),",
                table.field, concrete.implementation
            ));
        }
        out.tab(2).println("}");
        out.tab(1).println("}");
        out.println("}");
        out.newline();

        has_component(&mut out, module, "BlockingExecutor", "BlockingExecutor", "executor");
        for (table, concrete) in &tables {
            out.newline();
            if local_components {
                dao_component(&mut out, module, concrete);
                out.newline();
            }
            has_component(
                &mut out,
                module,
                &mapper_interface(concrete),
                &mapper_component(concrete),
                &table.mapper_field(),
            );
            for binding in &table.bindings {
                debug!(table = %binding.table, binding = %binding.signature(), "Emitting binding");
                out.newline();
                binding.render(&mut out, module, &table.field);
            }
        }

        let mut index = SourceWriter::new();
        index.println(GENERATED_HEADER);
        index.newline();
        index.println("mod dao_module;");
        index.newline();
        index.println(format!("pub use dao_module::{module};"));

        let dir = self.strategy.module_dir(schema);
        ModuleArtifact {
            module: Artifact {
                path: self.strategy.module_file(schema),
                contents: out.finish(),
            },
            index: Artifact {
                path: dir.join("mod.rs"),
                contents: index.finish(),
            },
            binding_count,
        }
    }
}

fn mapper_interface(binding: &DaoBinding) -> String {
    format!("dyn TableMapper<{}, {}, {}>", binding.record, binding.value, binding.key)
}

fn mapper_component(binding: &DaoBinding) -> String {
    format!("MapperComponent<{}, {}, {}>", binding.record, binding.value, binding.key)
}

/// Writes a `HasComponent<interface>` impl for `module`, built from
/// `component` and resolved from the Arc stored in `field`.
pub(crate) fn has_component(out: &mut SourceWriter, module: &str, interface: &str, component: &str, field: &str) {
    out.println(format!("impl HasComponent<{interface}> for {module} {{"));
    out.tab(1)
        .println(format!("fn build_component(context: &mut ModuleBuildContext<Self>) -> Arc<{interface}> {{"));
    out.tab(2).println(format!("context.build_component::<{component}>()"));
    out.tab(1).println("}");
    out.newline();
    out.tab(1).println(format!("fn resolve(&self) -> Arc<{interface}> {{"));
    out.tab(2).println(format!("self.{field}.clone()"));
    out.tab(1).println("}");
    out.newline();
    out.tab(1).println(format!("fn resolve_ref(&self) -> &{interface} {{"));
    out.tab(2).println(format!("&*self.{field}"));
    out.tab(1).println("}");
    out.println("}");
}

/// Makes a DAO without its own `Component` impl buildable by `module`.
fn dao_component(out: &mut SourceWriter, module: &str, concrete: &DaoBinding) {
    out.println(format!("impl Component<{module}> for {} {{", concrete.implementation));
    out.tab(1).println("type Interface = Self;");
    out.tab(1).println("type Parameters = ();");
    out.newline();
    out.tab(1)
        .println(format!("fn build(context: &mut ModuleBuildContext<{module}>, _: ()) -> Box<Self> {{"));
    out.tab(2)
        .println(format!("let mapper = context.build_component::<{}>();", mapper_component(concrete)));
    out.tab(2).println("let executor = context.build_component::<BlockingExecutor>();");
    out.tab(2).println("Box::new(Self::new(mapper, BlockingExecutor::clone(&executor)))");
    out.tab(1).println("}");
    out.println("}");
}
