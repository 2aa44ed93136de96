//! Generator configuration structures.

use daogen_core::{DaogenError, DaogenResult, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// What gets generated.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Where generated artifacts go and how they refer to each other.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Renders the configuration as TOML, e.g. to seed `config/default.toml`.
    pub fn to_toml_string(&self) -> DaogenResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| DaogenError::configuration(format!("Failed to render configuration: {e}")))
    }
}

/// Switches controlling which artifacts are emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Emit the narrower interface-scoped binding for tables with an interface type.
    pub generate_interface_binding: bool,
    /// Emit the per-schema DAO module at all.
    pub generate_module: bool,
    /// Make generated DAOs constructible by the injector.
    pub generate_injection_annotations: bool,
    /// Whether tables expose an interface type alongside their value type.
    pub generate_interfaces: bool,
    /// Build per-table artifacts on a worker pool.
    pub parallel: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            generate_interface_binding: true,
            generate_module: true,
            generate_injection_annotations: true,
            generate_interfaces: true,
            parallel: false,
        }
    }
}

/// Output locations and module paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory generated files are written below.
    pub target_dir: PathBuf,
    /// Rust module path the target directory is mounted at.
    pub root_module: String,
    /// Path of the runtime crate as seen from generated code.
    pub runtime_crate: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from("src/generated"),
            root_module: "crate::generated".to_string(),
            runtime_crate: "daogen_runtime".to_string(),
        }
    }
}

impl OutputConfig {
    /// Checks that a string is a `::`-separated Rust path.
    #[must_use]
    pub fn is_module_path(path: &str) -> bool {
        !path.is_empty()
            && path.split("::").all(|segment| {
                let mut chars = segment.chars();
                matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
                    && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_generator_config() {
        let config = GeneratorConfig::default();
        assert!(config.generate_interface_binding);
        assert!(config.generate_module);
        assert!(config.generate_injection_annotations);
        assert!(config.generate_interfaces);
        assert!(!config.parallel);
    }

    #[test]
    fn test_default_output_config() {
        let config = OutputConfig::default();
        assert_eq!(config.target_dir, PathBuf::from("src/generated"));
        assert_eq!(config.root_module, "crate::generated");
        assert_eq!(config.runtime_crate, "daogen_runtime");
    }

    #[test]
    fn test_module_path_validation() {
        assert!(OutputConfig::is_module_path("crate::generated"));
        assert!(OutputConfig::is_module_path("daogen_runtime"));
        assert!(!OutputConfig::is_module_path(""));
        assert!(!OutputConfig::is_module_path("crate::"));
        assert!(!OutputConfig::is_module_path("crate::9lives"));
        assert!(!OutputConfig::is_module_path("my-crate"));
    }

    #[test]
    fn test_partial_generator_section() {
        let config: AppConfig = serde_json::from_str(r#"{"generator": {"generate_module": false}}"#).unwrap();
        assert!(!config.generator.generate_module);
        assert!(config.generator.generate_interface_binding);
        assert_eq!(config.output.root_module, "crate::generated");
    }

    #[test]
    fn test_toml_rendering() {
        let rendered = AppConfig::default().to_toml_string().unwrap();
        assert!(rendered.contains("[generator]"));
        assert!(rendered.contains("generate_module = true"));
        assert!(rendered.contains("[output]"));
    }
}
