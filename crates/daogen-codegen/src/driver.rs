//! One generation run per schema.
//!
//! ```text
//! Start ──► PerTable (resolve key, emit DAO, collect bindings) ──► ModuleEmission ──► Done
//!   │                    │                                               │
//!   └────────────────────┴──────────────── malformed metadata ──────────┴──► Fatal
//! ```
//!
//! Every artifact of a schema is built before the first one is written, so
//! a fatal error leaves the target untouched.

use crate::binding::{BindingGenerator, DaoBinding};
use crate::dao::DaoEmitter;
use crate::key::{KeyResolver, ResolvedKeyType};
use crate::module::{ModuleEmitter, TableBindings};
use crate::schema::{Catalog, SchemaDescriptor, TableDescriptor};
use crate::strategy::{validate_names, validate_schema_names, DefaultNamingStrategy, NamingStrategy};
use crate::writer::{Artifact, SourceSink, WriteOutcome};
use daogen_config::{GeneratorConfig, OutputConfig};
use daogen_core::DaogenResult;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    Start,
    PerTable,
    ModuleEmission,
    Done,
    Fatal,
}

/// Result of generating one schema.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub schema: String,
    /// Tables a DAO was generated for, in declaration order.
    pub generated: Vec<GeneratedTable>,
    /// Tables left out, in declaration order.
    pub skipped: Vec<SkippedTable>,
    /// Path of the DAO module, relative to the sink root.
    pub module: Option<PathBuf>,
    pub binding_count: usize,
    /// Files created or changed.
    pub written: usize,
    /// Files that already had the generated contents.
    pub unchanged: usize,
    pub phase: GenerationPhase,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedTable {
    pub table: String,
    pub key: ResolvedKeyType,
    pub dao: PathBuf,
    pub bindings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTable {
    pub table: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoPrimaryKey,
}

enum TableOutcome {
    Generated {
        table: String,
        key: ResolvedKeyType,
        dao: Artifact,
        bindings: Vec<DaoBinding>,
    },
    Skipped(SkippedTable),
}

/// Drives DAO and module generation.
pub struct GeneratorDriver {
    config: GeneratorConfig,
    runtime: String,
    strategy: Arc<dyn NamingStrategy>,
}

impl GeneratorDriver {
    /// Creates a driver with an explicit naming strategy.
    #[must_use]
    pub fn new(config: GeneratorConfig, runtime: impl Into<String>, strategy: Arc<dyn NamingStrategy>) -> Self {
        Self {
            config,
            runtime: runtime.into(),
            strategy,
        }
    }

    /// Creates a driver using [`DefaultNamingStrategy`] over the output settings.
    #[must_use]
    pub fn from_config(config: GeneratorConfig, output: &OutputConfig) -> Self {
        let strategy = DefaultNamingStrategy::from_output(output, config.generate_interfaces);
        Self::new(config, output.runtime_crate.clone(), Arc::new(strategy))
    }

    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Resolves the key of every table without generating anything.
    pub fn resolve_keys(&self, schema: &SchemaDescriptor) -> DaogenResult<Vec<(String, Option<ResolvedKeyType>)>> {
        schema.validate()?;
        validate_names(self.strategy.as_ref(), schema)?;
        let resolver = KeyResolver::new(self.strategy.as_ref());
        schema
            .tables
            .iter()
            .map(|table| Ok((table.name.clone(), resolver.resolve(schema, table)?)))
            .collect()
    }

    /// Generates every schema of a catalog, stopping at the first fatal error.
    ///
    /// Schemas that would generate into the same modules fail the run
    /// before anything is written.
    pub fn run_catalog(&self, catalog: &Catalog, sink: &mut dyn SourceSink) -> DaogenResult<Vec<GenerationReport>> {
        validate_schema_names(self.strategy.as_ref(), catalog)?;
        catalog.schemas.iter().map(|schema| self.run(schema, sink)).collect()
    }

    /// Generates the DAOs and module of one schema.
    pub fn run(&self, schema: &SchemaDescriptor, sink: &mut dyn SourceSink) -> DaogenResult<GenerationReport> {
        let started = Instant::now();
        let mut phase = GenerationPhase::Start;
        info!(schema = %schema.name, tables = schema.tables.len(), ?phase, "Starting DAO generation");

        let result = self.generate(schema, sink, &mut phase);
        match &result {
            Ok(report) => info!(
                schema = %schema.name,
                generated = report.generated.len(),
                skipped = report.skipped.len(),
                bindings = report.binding_count,
                written = report.written,
                elapsed_ms = started.elapsed().as_millis() as u64,
                phase = ?GenerationPhase::Done,
                "DAO generation finished"
            ),
            Err(e) => error!(schema = %schema.name, failed_in = ?phase, phase = ?GenerationPhase::Fatal, error = %e, "DAO generation aborted"),
        }
        result
    }

    fn generate(
        &self,
        schema: &SchemaDescriptor,
        sink: &mut dyn SourceSink,
        phase: &mut GenerationPhase,
    ) -> DaogenResult<GenerationReport> {
        schema.validate()?;
        validate_names(self.strategy.as_ref(), schema)?;

        transition(phase, GenerationPhase::PerTable, &schema.name);
        let outcomes = if self.config.parallel {
            schema
                .tables
                .par_iter()
                .map(|table| self.process_table(schema, table))
                .collect::<DaogenResult<Vec<_>>>()?
        } else {
            schema
                .tables
                .iter()
                .map(|table| self.process_table(schema, table))
                .collect::<DaogenResult<Vec<_>>>()?
        };

        let mut artifacts = Vec::new();
        let mut generated = Vec::new();
        let mut skipped = Vec::new();
        let mut table_bindings = Vec::new();
        let mut index_entries = Vec::new();

        for (table, outcome) in schema.tables.iter().zip(outcomes) {
            match outcome {
                TableOutcome::Generated {
                    table: name,
                    key,
                    dao,
                    bindings,
                } => {
                    generated.push(GeneratedTable {
                        table: name.clone(),
                        key: key.clone(),
                        dao: dao.path.clone(),
                        bindings: bindings.len(),
                    });
                    artifacts.push(dao);
                    index_entries.push((table, key));
                    table_bindings.push(TableBindings {
                        table: name,
                        field: self.strategy.dao_module_name(table),
                        bindings,
                    });
                }
                TableOutcome::Skipped(skip) => skipped.push(skip),
            }
        }

        if !index_entries.is_empty() {
            let entries: Vec<(&TableDescriptor, &ResolvedKeyType)> =
                index_entries.iter().map(|(table, key)| (*table, key)).collect();
            artifacts.push(self.dao_emitter().emit_index(schema, &entries));
        }

        let mut module = None;
        let mut binding_count = 0;
        if self.config.generate_module {
            transition(phase, GenerationPhase::ModuleEmission, &schema.name);
            info!("Generate DaoModule ...");
            let emitted = ModuleEmitter::new(self.strategy.as_ref(), &self.config, &self.runtime).emit(schema, &table_bindings);
            module = Some(emitted.module.path.clone());
            binding_count = emitted.binding_count;
            artifacts.push(emitted.module);
            artifacts.push(emitted.index);
        }

        let (mut written, mut unchanged) = (0, 0);
        for artifact in &artifacts {
            match sink.write_artifact(artifact)? {
                WriteOutcome::Unchanged => unchanged += 1,
                WriteOutcome::Created | WriteOutcome::Updated => written += 1,
            }
        }

        *phase = GenerationPhase::Done;
        Ok(GenerationReport {
            schema: schema.name.clone(),
            generated,
            skipped,
            module,
            binding_count,
            written,
            unchanged,
            phase: GenerationPhase::Done,
        })
    }

    fn process_table(&self, schema: &SchemaDescriptor, table: &TableDescriptor) -> DaogenResult<TableOutcome> {
        let Some(key) = KeyResolver::new(self.strategy.as_ref()).resolve(schema, table)? else {
            info!("{} has no primary key. Skipping...", table.name);
            return Ok(TableOutcome::Skipped(SkippedTable {
                table: table.name.clone(),
                reason: SkipReason::NoPrimaryKey,
            }));
        };

        debug!(table = %table.name, key = key.type_path(), "Generating DAO");
        let dao = self.dao_emitter().emit(schema, table, &key);
        let bindings = BindingGenerator::new(self.strategy.as_ref(), &self.config).bindings(schema, table, Some(&key))?;

        Ok(TableOutcome::Generated {
            table: table.name.clone(),
            key,
            dao,
            bindings,
        })
    }

    fn dao_emitter(&self) -> DaoEmitter<'_> {
        DaoEmitter::new(self.strategy.as_ref(), &self.config, &self.runtime)
    }
}

fn transition(phase: &mut GenerationPhase, next: GenerationPhase, schema: &str) {
    debug!(schema, from = ?*phase, to = ?next, "Generation phase transition");
    *phase = next;
}
