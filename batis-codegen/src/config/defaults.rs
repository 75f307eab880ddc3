//! Default configuration values - single source of truth

/// Default include tables pattern (all tables)
pub const INCLUDE_TABLES: &str = "*";

/// Default exclude tables pattern (none)
pub const EXCLUDE_TABLES: &str = "";

/// Default output root; artifacts land under `src/main/...` below it
pub const OUTPUT_DIR: &str = ".";

/// Default Java package for generated artifacts
pub const PACKAGE_NAME: &str = "com.example";

/// Default indentation width of rendered artifacts
pub const INDENT_SIZE: usize = 4;

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;
