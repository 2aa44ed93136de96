//! Configuration loader with layered sources.

use crate::{AppConfig, OutputConfig};
use config::{Config, ConfigError, Environment, File};
use daogen_core::{DaogenError, DaogenResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable prefix for overrides (`DAOGEN__GENERATOR__PARALLEL=true`).
pub const ENV_PREFIX: &str = "DAOGEN";

/// Layered configuration loader.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_dir: Option<PathBuf>,
    config_file: Option<PathBuf>,
    use_env: bool,
}

impl ConfigLoader {
    /// Creates a loader reading from a configuration directory.
    ///
    /// Sources are applied in order:
    /// 1. `{dir}/default.toml`
    /// 2. `{dir}/local.toml` - developer overrides, not committed
    /// 3. the explicit file, if one was given with [`with_file`](Self::with_file)
    /// 4. environment variables with the `DAOGEN` prefix and `__` separator
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: Some(config_dir.into()),
            config_file: None,
            use_env: true,
        }
    }

    /// Creates a loader for the default location (`./config`).
    #[must_use]
    pub fn from_default_location() -> Self {
        Self::new("./config")
    }

    /// Adds an explicit configuration file, applied after the directory layers.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Disables environment overrides. Used by tests.
    #[must_use]
    pub const fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Loads and validates the configuration.
    pub fn load(&self) -> DaogenResult<AppConfig> {
        if self.use_env {
            if let Err(e) = dotenvy::dotenv() {
                debug!("No .env file found or error loading it: {}", e);
            }
        }

        let mut builder = Config::builder();

        if let Some(dir) = &self.config_dir {
            for layer in ["default.toml", "local.toml"] {
                let path = dir.join(layer);
                if path.exists() {
                    debug!("Loading config layer from: {}", path.display());
                    builder = builder.add_source(File::from(path).required(false));
                }
            }
        }

        if let Some(file) = &self.config_file {
            if !file.exists() {
                return Err(DaogenError::configuration(format!(
                    "Configuration file not found: {}",
                    file.display()
                )));
            }
            debug!("Loading config file: {}", file.display());
            builder = builder.add_source(File::from(file.as_path()).required(true));
        }

        if self.use_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config = builder.build().map_err(config_error_to_daogen_error)?;
        let app_config: AppConfig = config.try_deserialize().map_err(config_error_to_daogen_error)?;

        Self::validate_config(&app_config)?;

        info!(
            target_dir = %app_config.output.target_dir.display(),
            root_module = %app_config.output.root_module,
            generate_module = app_config.generator.generate_module,
            generate_interface_binding = app_config.generator.generate_interface_binding,
            "Configuration loaded"
        );

        Ok(app_config)
    }

    /// Validates the configuration.
    pub fn validate_config(config: &AppConfig) -> DaogenResult<()> {
        if config.output.target_dir.as_os_str().is_empty() {
            return Err(DaogenError::configuration("Output target_dir is required"));
        }

        if !OutputConfig::is_module_path(&config.output.root_module) {
            return Err(DaogenError::configuration(format!(
                "Output root_module is not a Rust module path: {:?}",
                config.output.root_module
            )));
        }

        if !OutputConfig::is_module_path(&config.output.runtime_crate) {
            return Err(DaogenError::configuration(format!(
                "Output runtime_crate is not a Rust path: {:?}",
                config.output.runtime_crate
            )));
        }

        if config.generator.generate_interface_binding && !config.generator.generate_interfaces {
            warn!("generate_interface_binding is set but generate_interfaces is off; no interface bindings will be emitted");
        }

        Ok(())
    }

    /// Returns the configured directory, if any.
    #[must_use]
    pub fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }
}

fn config_error_to_daogen_error(err: ConfigError) -> DaogenError {
    DaogenError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_without_sources_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new(dir.path()).without_env().load().unwrap();
        assert!(config.generator.generate_module);
        assert_eq!(config.output.root_module, "crate::generated");
    }

    #[test]
    fn test_local_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[generator]\ngenerate_module = false\nparallel = true\n",
        )
        .unwrap();
        fs::write(dir.path().join("local.toml"), "[generator]\nparallel = false\n").unwrap();

        let config = ConfigLoader::new(dir.path()).without_env().load().unwrap();
        assert!(!config.generator.generate_module);
        assert!(!config.generator.parallel);
    }

    #[test]
    fn test_explicit_file_applied_last() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[output]\nroot_module = \"crate::db\"\n").unwrap();
        let explicit = dir.path().join("ci.toml");
        fs::write(&explicit, "[output]\nroot_module = \"crate::ci_db\"\n").unwrap();

        let config = ConfigLoader::new(dir.path())
            .with_file(&explicit)
            .without_env()
            .load()
            .unwrap();
        assert_eq!(config.output.root_module, "crate::ci_db");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigLoader::new(dir.path())
            .with_file(dir.path().join("nope.toml"))
            .without_env()
            .load()
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_invalid_root_module_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[output]\nroot_module = \"not a path\"\n").unwrap();
        let err = ConfigLoader::new(dir.path()).without_env().load().unwrap_err();
        assert!(err.to_string().contains("root_module"));
    }

    #[test]
    fn test_module_without_injection_annotations_accepted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[generator]\ngenerate_module = true\ngenerate_injection_annotations = false\n",
        )
        .unwrap();

        let config = ConfigLoader::new(dir.path()).without_env().load().unwrap();
        assert!(config.generator.generate_module);
        assert!(!config.generator.generate_injection_annotations);
        ConfigLoader::validate_config(&config).unwrap();
    }
}
