//! batis-codegen: Generate MyBatis entities, mapper interfaces and mapper XML from MySQL schema metadata
//!
//! This crate provides both a CLI tool and a library. It reads table metadata
//! from a MySQL DDL script (parsed with `sqlparser-rs`) or a JSON metadata
//! snapshot and renders, per table, from Handlebars templates:
//!
//! - An entity class (`entity/<Class>.java`)
//! - A mapper interface (`mapper/<Class>Mapper.java`)
//! - A MyBatis mapping document (`resources/mapper/<Class>Mapper.xml`)
//!
//! Table and column names are normalized once into a render model, so the
//! field names bound in the mapping document always match the entity.
//!
//! It also ships the editor helpers that work on existing mapper pairs:
//! cross-reference resolution ([`xref`]), statement scaffolding, and
//! rebuilding executable SQL from MyBatis logs ([`sql_log`]).
//!
//! # Usage in build.rs
//!
//! Configure in your `Cargo.toml`:
//!
//! ```toml
//! [package.metadata.batis-codegen]
//! schema_file = "schema.sql"
//! output_dir = "generated"
//! package_name = "com.example.shop"
//! table_prefixes = ["t_"]
//! ```
//!
//! Then use a minimal `build.rs`:
//!
//! ```rust,ignore
//! fn main() {
//!     batis_codegen::generate_from_cargo_metadata()
//!         .expect("Failed to generate mapper code");
//! }
//! ```
//!
//! # Alternative: Programmatic Configuration
//!
//! ```rust,ignore
//! fn main() {
//!     batis_codegen::CodegenBuilder::new("schema.sql")
//!         .output_dir("generated")
//!         .package_name("com.example.shop")
//!         .strip_prefixes(&["t_"])
//!         .generate()
//!         .expect("Failed to generate mapper code");
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! batis-codegen --schema schema.sql --output ./demo --package com.example.shop generate
//! batis-codegen jump ./demo src/main/java/com/example/shop/mapper/UserMapper.java --line 12
//! batis-codegen format-sql < mybatis.log
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod parser;
pub mod sql_log;
pub mod watchdog;
pub mod xref;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::info;

pub use codegen::{CancellationFlag, GenerationReport, GenerationSession};
pub use config::{CodegenConfig, NamingStrategy, PrefixMode};
pub use error::{CodegenError, Result};

use parser::{DdlSchemaProvider, SchemaProvider, SnapshotSchemaProvider};
use watchdog::MemoryWatchdog;

/// Open the schema provider selected by the configuration
///
/// A snapshot file takes precedence over the DDL schema file.
pub fn open_provider(config: &CodegenConfig) -> Result<Box<dyn SchemaProvider>> {
    match &config.snapshot_file {
        Some(snapshot) => {
            info!("Reading metadata snapshot: {:?}", snapshot);
            Ok(Box::new(SnapshotSchemaProvider::from_file(snapshot)?))
        }
        None => {
            info!("Parsing schema: {:?}", config.schema_file);
            Ok(Box::new(DdlSchemaProvider::from_file(&config.schema_file)?))
        }
    }
}

/// Main entry point for code generation
pub fn generate(config: &CodegenConfig) -> Result<GenerationReport> {
    let provider = open_provider(config)?;
    let mut session = GenerationSession::new(config.clone())
        .with_watchdog(MemoryWatchdog::with_default_threshold());
    let report = session.run(provider.as_ref(), &CancellationFlag::new())?;
    session.dispose();

    info!("Code generation complete");
    Ok(report)
}

/// Filter table names based on include/exclude patterns
pub(crate) fn filter_tables(names: Vec<String>, include: &str, exclude: &str) -> Vec<String> {
    let include_all = include.trim() == "*" || include.trim().is_empty();
    let include_set: HashSet<&str> = if include_all {
        HashSet::new()
    } else {
        include.split(',').map(str::trim).collect()
    };
    let exclude_set: HashSet<&str> = exclude
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    names
        .into_iter()
        .filter(|name| {
            let included = include_all || include_set.contains(name.as_str());
            let excluded = exclude_set.contains(name.as_str());
            included && !excluded
        })
        .collect()
}

/// Builder pattern for easy configuration in build.rs
pub struct CodegenBuilder {
    config: CodegenConfig,
}

impl CodegenBuilder {
    /// Create a new builder with the given DDL schema file
    pub fn new(schema_file: impl AsRef<Path>) -> Self {
        Self {
            config: CodegenConfig::default_with_schema(schema_file.as_ref().to_path_buf()),
        }
    }

    /// Create a new builder reading a JSON metadata snapshot
    pub fn from_snapshot(snapshot_file: impl AsRef<Path>) -> Self {
        Self {
            config: CodegenConfig {
                snapshot_file: Some(snapshot_file.as_ref().to_path_buf()),
                ..Default::default()
            },
        }
    }

    /// Set the output root
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the base Java package
    pub fn package_name(mut self, package: &str) -> Self {
        self.config.package_name = package.to_string();
        self
    }

    /// Set tables to include
    pub fn include_tables(mut self, tables: &[&str]) -> Self {
        self.config.include_tables = tables.join(",");
        self
    }

    /// Set tables to exclude
    pub fn exclude_tables(mut self, tables: &[&str]) -> Self {
        self.config.exclude_tables = tables.join(",");
        self
    }

    /// Strip these table prefixes from class names (first match wins)
    pub fn strip_prefixes(mut self, prefixes: &[&str]) -> Self {
        self.config.table_prefixes = prefixes.iter().map(|p| p.to_string()).collect();
        self.config.prefix_mode = PrefixMode::Strip;
        self
    }

    /// Use custom templates from this directory
    pub fn template_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.template_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn naming_strategy(mut self, strategy: NamingStrategy) -> Self {
        self.config.naming_strategy = strategy;
        self
    }

    pub fn indent_size(mut self, width: usize) -> Self {
        self.config.indent_size = width;
        self
    }

    /// Enable dry run mode (preview without writing files)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    /// Generate the code
    pub fn generate(self) -> Result<GenerationReport> {
        self.config.validate()?;
        generate(&self.config)
    }
}

/// Configuration for `[package.metadata.batis-codegen]` in Cargo.toml
#[derive(Debug, Clone, Default, serde::Deserialize)]
struct CargoMetadataConfig {
    /// Path to the SQL schema file
    schema_file: Option<String>,

    /// Path to a JSON metadata snapshot (alternative to `schema_file`)
    snapshot_file: Option<String>,

    /// Tables to include (optional, defaults to all)
    #[serde(default)]
    include_tables: Vec<String>,

    /// Tables to exclude (optional)
    #[serde(default)]
    exclude_tables: Vec<String>,

    /// Output root, relative to the manifest (default: OUT_DIR)
    output_dir: Option<String>,

    /// Base Java package
    package_name: Option<String>,

    /// Table prefixes stripped from class names
    #[serde(default)]
    table_prefixes: Vec<String>,

    /// Custom template directory, relative to the manifest
    template_dir: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoToml {
    package: Option<CargoPackage>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoPackage {
    metadata: Option<CargoPackageMetadata>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoPackageMetadata {
    #[serde(rename = "batis-codegen")]
    batis_codegen: Option<CargoMetadataConfig>,
}

/// Generate code from `[package.metadata.batis-codegen]` in Cargo.toml
///
/// Fails if any table could not be generated.
pub fn generate_from_cargo_metadata() -> Result<GenerationReport> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").map_err(|_| {
        CodegenError::ConfigError(
            "CARGO_MANIFEST_DIR not set - are you running from build.rs?".into(),
        )
    })?;
    let manifest_dir = PathBuf::from(manifest_dir);

    let cargo_toml_path = manifest_dir.join("Cargo.toml");
    let cargo_toml_content = std::fs::read_to_string(&cargo_toml_path)?;

    let cargo_toml: CargoToml = toml::from_str(&cargo_toml_content).map_err(|e| {
        CodegenError::ConfigError(format!(
            "Failed to parse {}: {}",
            cargo_toml_path.display(),
            e
        ))
    })?;

    let metadata_config = cargo_toml
        .package
        .and_then(|p| p.metadata)
        .and_then(|m| m.batis_codegen)
        .ok_or_else(|| {
            CodegenError::ConfigError(
                "Missing [package.metadata.batis-codegen] section in Cargo.toml".into(),
            )
        })?;

    let (mut builder, input_path) = match (&metadata_config.snapshot_file, &metadata_config.schema_file) {
        (Some(snapshot), _) => {
            let path = manifest_dir.join(snapshot);
            (CodegenBuilder::from_snapshot(&path), path)
        }
        (None, Some(schema)) => {
            let path = manifest_dir.join(schema);
            (CodegenBuilder::new(&path), path)
        }
        (None, None) => {
            return Err(CodegenError::ConfigError(
                "schema_file or snapshot_file is required in [package.metadata.batis-codegen]"
                    .into(),
            ))
        }
    };

    // Determine output directory (default to OUT_DIR)
    builder = match metadata_config.output_dir {
        Some(dir) => builder.output_dir(manifest_dir.join(dir)),
        None => {
            let out_dir = std::env::var("OUT_DIR").map_err(|_| {
                CodegenError::ConfigError("OUT_DIR not set - are you running from build.rs?".into())
            })?;
            builder.output_dir(out_dir)
        }
    };

    if let Some(package) = &metadata_config.package_name {
        builder = builder.package_name(package);
    }
    if !metadata_config.table_prefixes.is_empty() {
        let prefixes: Vec<&str> = metadata_config
            .table_prefixes
            .iter()
            .map(String::as_str)
            .collect();
        builder = builder.strip_prefixes(&prefixes);
    }
    if let Some(dir) = &metadata_config.template_dir {
        let dir = manifest_dir.join(dir);
        println!("cargo:rerun-if-changed={}", dir.display());
        builder = builder.template_dir(dir);
    }

    // Apply table filters
    if !metadata_config.include_tables.is_empty() {
        let tables: Vec<&str> = metadata_config
            .include_tables
            .iter()
            .map(String::as_str)
            .collect();
        builder = builder.include_tables(&tables);
    }
    if !metadata_config.exclude_tables.is_empty() {
        let tables: Vec<&str> = metadata_config
            .exclude_tables
            .iter()
            .map(String::as_str)
            .collect();
        builder = builder.exclude_tables(&tables);
    }

    // Emit rerun-if-changed
    println!("cargo:rerun-if-changed={}", input_path.display());
    println!("cargo:rerun-if-changed={}", cargo_toml_path.display());

    let report = builder.generate()?;
    if let Some(failure) = report.failures.first() {
        return Err(CodegenError::SchemaRead {
            table: failure.table.clone(),
            message: failure.message.clone(),
        });
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_tables() {
        let all = names(&["sys_user", "sys_role", "audit_log"]);
        assert_eq!(filter_tables(all.clone(), "*", ""), all);
        assert_eq!(
            filter_tables(all.clone(), "sys_user, audit_log", ""),
            names(&["sys_user", "audit_log"])
        );
        assert_eq!(
            filter_tables(all.clone(), "*", "audit_log"),
            names(&["sys_user", "sys_role"])
        );
        assert_eq!(filter_tables(all, "sys_user", "sys_user"), Vec::<String>::new());
    }

    #[test]
    fn test_builder_sets_config() {
        let builder = CodegenBuilder::new("schema.sql")
            .output_dir("out")
            .package_name("com.acme")
            .strip_prefixes(&["t_"])
            .naming_strategy(NamingStrategy::SnakeCase)
            .indent_size(2)
            .dry_run();
        let config = builder.config();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.package_name, "com.acme");
        assert_eq!(config.strip_prefixes(), Some(&["t_".to_string()][..]));
        assert_eq!(config.naming_strategy, NamingStrategy::SnakeCase);
        assert_eq!(config.indent_size, 2);
        assert!(config.dry_run);
    }

    #[test]
    fn test_builder_generates_from_ddl() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.sql");
        std::fs::write(
            &schema,
            "CREATE TABLE t_order (order_id BIGINT PRIMARY KEY, amount DECIMAL(10,2));",
        )
        .unwrap();

        let report = CodegenBuilder::new(&schema)
            .output_dir(dir.path().join("out"))
            .package_name("com.acme")
            .strip_prefixes(&["t_"])
            .generate()
            .unwrap();
        assert!(report.is_success());
        assert!(dir
            .path()
            .join("out/src/main/resources/mapper/OrderMapper.xml")
            .exists());
    }

    #[test]
    fn test_builder_generates_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("schema.json");
        std::fs::write(
            &snapshot,
            r#"[{"tableName": "user", "columns": [
                {"columnName": "id", "dataType": "bigint", "isPrimaryKey": true}
            ]}]"#,
        )
        .unwrap();

        let report = CodegenBuilder::from_snapshot(&snapshot)
            .output_dir(dir.path())
            .dry_run()
            .generate()
            .unwrap();
        assert_eq!(report.tables, vec!["user"]);
        assert!(report.artifacts.iter().all(|p| !p.exists()));
    }
}
