//! Subcommand implementations.

use crate::cli::ConfigArgs;
use daogen_codegen::{Catalog, FileSink, GenerationReport, GeneratorDriver, MemorySink, SkipReason, SourceSink};
use daogen_config::{AppConfig, ConfigLoader};
use daogen_core::{DaogenError, DaogenResult};
use std::path::{Path, PathBuf};
use tracing::info;

/// Options of `daogen generate`.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub schema: PathBuf,
    pub target_dir: Option<PathBuf>,
    pub dry_run: bool,
    pub no_module: bool,
    pub no_interface_binding: bool,
    pub parallel: bool,
    pub json: bool,
}

/// Loads the layered configuration.
pub fn load_config(args: &ConfigArgs) -> DaogenResult<AppConfig> {
    let mut loader = ConfigLoader::new(&args.config_dir);
    if let Some(file) = &args.config {
        loader = loader.with_file(file);
    }
    loader.load()
}

/// Applies command-line overrides on top of the loaded configuration.
pub fn apply_overrides(config: &mut AppConfig, options: &GenerateOptions) {
    if let Some(dir) = &options.target_dir {
        config.output.target_dir.clone_from(dir);
    }
    if options.no_module {
        config.generator.generate_module = false;
    }
    if options.no_interface_binding {
        config.generator.generate_interface_binding = false;
    }
    if options.parallel {
        config.generator.parallel = true;
    }
}

/// Runs generation and prints a summary.
pub fn generate(config: &AppConfig, options: &GenerateOptions) -> DaogenResult<Vec<GenerationReport>> {
    let catalog = Catalog::from_json_file(&options.schema)?;
    let driver = GeneratorDriver::from_config(config.generator.clone(), &config.output);

    let reports = if options.dry_run {
        let mut sink = MemorySink::new();
        let reports = run_into(&driver, &catalog, &mut sink)?;
        for (path, contents) in sink.files() {
            println!("{} ({} bytes)", config.output.target_dir.join(path).display(), contents.len());
        }
        reports
    } else {
        let mut sink = FileSink::new(&config.output.target_dir);
        run_into(&driver, &catalog, &mut sink)?
    };

    if options.json {
        let json = serde_json::to_string_pretty(&reports).map_err(|e| DaogenError::internal(e.to_string()))?;
        println!("{json}");
    } else {
        for report in &reports {
            print_summary(report);
        }
    }
    Ok(reports)
}

fn run_into(driver: &GeneratorDriver, catalog: &Catalog, sink: &mut dyn SourceSink) -> DaogenResult<Vec<GenerationReport>> {
    let reports = driver.run_catalog(catalog, sink)?;
    info!(schemas = reports.len(), "Generation complete");
    Ok(reports)
}

fn print_summary(report: &GenerationReport) {
    println!(
        "{}: {} DAO(s), {} binding(s), {} file(s) written, {} unchanged",
        report.schema,
        report.generated.len(),
        report.binding_count,
        report.written,
        report.unchanged
    );
    for skipped in &report.skipped {
        let reason = match skipped.reason {
            SkipReason::NoPrimaryKey => "no primary key",
        };
        println!("  skipped {}.{} ({reason})", report.schema, skipped.table);
    }
}

/// Prints the key each table resolves to.
pub fn inspect(config: &AppConfig, schema: &Path) -> DaogenResult<()> {
    let catalog = Catalog::from_json_file(schema)?;
    let driver = GeneratorDriver::from_config(config.generator.clone(), &config.output);

    for schema in &catalog.schemas {
        for (table, key) in driver.resolve_keys(schema)? {
            match key {
                Some(key) => println!("{}.{table}: {}", schema.name, key.type_path()),
                None => println!("{}.{table}: <no primary key, skipped>", schema.name),
            }
        }
    }
    Ok(())
}

/// Prints the effective configuration.
pub fn show_config(config: &AppConfig) -> DaogenResult<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CATALOG: &str = r#"{
        "schemas": [{
            "name": "vertx",
            "tables": [
                {
                    "name": "something",
                    "columns": [{ "name": "someid", "rust_type": "i32" }],
                    "primary_key": { "columns": ["someid"] }
                },
                { "name": "audit_log", "columns": [{ "name": "message", "rust_type": "String", "nullable": true }] }
            ]
        }]
    }"#;

    fn write_catalog(dir: &Path) -> PathBuf {
        let path = dir.join("catalog.json");
        fs::write(&path, CATALOG).unwrap();
        path
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        let options = GenerateOptions {
            target_dir: Some(PathBuf::from("out")),
            no_module: true,
            no_interface_binding: true,
            parallel: true,
            ..GenerateOptions::default()
        };
        apply_overrides(&mut config, &options);

        assert_eq!(config.output.target_dir, PathBuf::from("out"));
        assert!(!config.generator.generate_module);
        assert!(!config.generator.generate_interface_binding);
        assert!(config.generator.parallel);
    }

    #[test]
    fn test_generate_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        let options = GenerateOptions {
            schema: write_catalog(dir.path()),
            target_dir: Some(dir.path().join("generated")),
            ..GenerateOptions::default()
        };
        apply_overrides(&mut config, &options);

        let reports = generate(&config, &options).unwrap();
        assert_eq!(reports[0].skipped.len(), 1);
        assert!(dir.path().join("generated/vertx/tables/daos/something_dao.rs").exists());
        assert!(dir.path().join("generated/vertx/tables/modules/dao_module.rs").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        let options = GenerateOptions {
            schema: write_catalog(dir.path()),
            target_dir: Some(dir.path().join("generated")),
            dry_run: true,
            ..GenerateOptions::default()
        };
        apply_overrides(&mut config, &options);

        let reports = generate(&config, &options).unwrap();
        assert_eq!(reports[0].generated.len(), 1);
        assert!(!dir.path().join("generated").exists());
    }

    #[test]
    fn test_missing_catalog_is_an_error() {
        let options = GenerateOptions {
            schema: PathBuf::from("/nonexistent/catalog.json"),
            ..GenerateOptions::default()
        };
        let err = generate(&AppConfig::default(), &options).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_inspect() {
        let dir = tempfile::tempdir().unwrap();
        inspect(&AppConfig::default(), &write_catalog(dir.path())).unwrap();
    }

    #[test]
    fn test_load_config_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[generator]\nparallel = true\n").unwrap();
        let args = ConfigArgs {
            config_dir: dir.path().to_path_buf(),
            config: None,
        };
        assert!(load_config(&args).unwrap().generator.parallel);
    }
}
