//! Configuration settings for batis-codegen

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults;
use crate::error::{CodegenError, Result};

/// How column names become entity field names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamingStrategy {
    /// `user_name` -> `userName`
    #[default]
    #[serde(rename = "camelCase")]
    CamelCase,
    /// `user_name` -> `user_name`
    #[serde(rename = "snake_case")]
    SnakeCase,
}

/// Whether configured table prefixes are removed from class names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixMode {
    #[default]
    Keep,
    Strip,
}

/// Main configuration struct for code generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Path to a MySQL DDL file describing the schema
    #[serde(default)]
    pub schema_file: PathBuf,

    /// Path to a JSON metadata snapshot (alternative to `schema_file`)
    #[serde(default)]
    pub snapshot_file: Option<PathBuf>,

    /// Tables to include (comma-separated, or "*" for all)
    #[serde(default = "default_include_tables")]
    pub include_tables: String,

    /// Tables to exclude (comma-separated)
    #[serde(default = "default_exclude_tables")]
    pub exclude_tables: String,

    /// Output root; Java sources and mapper XML are written below it
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Base Java package (`<package>.entity`, `<package>.mapper`)
    #[serde(default = "default_package_name")]
    pub package_name: String,

    /// Directory holding `entity.hbs`, `mapper.hbs` and/or `xml.hbs` overrides
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Indentation width of rendered artifacts
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,

    /// Field naming strategy
    #[serde(default)]
    pub naming_strategy: NamingStrategy,

    /// Table prefixes that may be stripped from class names (first match wins)
    #[serde(default)]
    pub table_prefixes: Vec<String>,

    /// Whether `table_prefixes` are stripped
    #[serde(default)]
    pub prefix_mode: PrefixMode,

    /// Dry run mode - preview without writing files
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,
}

// Default value functions for serde
fn default_include_tables() -> String {
    defaults::INCLUDE_TABLES.to_string()
}
fn default_exclude_tables() -> String {
    defaults::EXCLUDE_TABLES.to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(defaults::OUTPUT_DIR)
}
fn default_package_name() -> String {
    defaults::PACKAGE_NAME.to_string()
}
fn default_indent_size() -> usize {
    defaults::INDENT_SIZE
}
fn default_dry_run() -> bool {
    defaults::DRY_RUN
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            schema_file: PathBuf::new(),
            snapshot_file: None,
            include_tables: default_include_tables(),
            exclude_tables: default_exclude_tables(),
            output_dir: default_output_dir(),
            package_name: default_package_name(),
            template_dir: None,
            indent_size: default_indent_size(),
            naming_strategy: NamingStrategy::default(),
            table_prefixes: Vec::new(),
            prefix_mode: PrefixMode::default(),
            dry_run: default_dry_run(),
            log_level: None,
        }
    }
}

impl CodegenConfig {
    /// Create a default config with the given schema file
    pub fn default_with_schema(schema_file: PathBuf) -> Self {
        Self {
            schema_file,
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CodegenConfig = toml::from_str(&content).map_err(|e| {
            CodegenError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from config file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            // Try default locations
            builder = builder.add_source(File::with_name("batis-codegen").required(false));
        }

        // Override with environment variables (BATIS_CODEGEN_PACKAGE_NAME, ...)
        builder = builder.add_source(
            Environment::with_prefix("BATIS_CODEGEN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("table_prefixes"),
        );

        let config: CodegenConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Prefixes to strip from table names, if stripping is enabled
    pub fn strip_prefixes(&self) -> Option<&[String]> {
        match self.prefix_mode {
            PrefixMode::Strip if !self.table_prefixes.is_empty() => Some(&self.table_prefixes),
            _ => None,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match &self.snapshot_file {
            Some(snapshot) => {
                if !snapshot.exists() {
                    return Err(CodegenError::ValidationError(format!(
                        "Snapshot file not found: {}",
                        snapshot.display()
                    )));
                }
            }
            None => {
                if self.schema_file.as_os_str().is_empty() {
                    return Err(CodegenError::ValidationError(
                        "schema_file or snapshot_file is required".into(),
                    ));
                }
                if !self.schema_file.exists() {
                    return Err(CodegenError::ValidationError(format!(
                        "Schema file not found: {}",
                        self.schema_file.display()
                    )));
                }
            }
        }

        if self.package_name.trim().is_empty() {
            return Err(CodegenError::ValidationError(
                "package_name must not be empty".into(),
            ));
        }

        if self
            .package_name
            .split('.')
            .any(|segment| segment.is_empty() || segment.contains(char::is_whitespace))
        {
            return Err(CodegenError::ValidationError(format!(
                "Invalid package name: {}",
                self.package_name
            )));
        }

        if self.indent_size == 0 {
            return Err(CodegenError::ValidationError(
                "indent_size must be at least 1".into(),
            ));
        }

        if self.prefix_mode == PrefixMode::Strip && self.table_prefixes.is_empty() {
            tracing::warn!("prefix_mode is `strip` but no table_prefixes are configured");
        }

        Ok(())
    }
}
