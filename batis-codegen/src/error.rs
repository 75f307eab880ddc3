//! Error types for batis-codegen

use thiserror::Error;

/// Result type alias for batis-codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during code generation and artifact cross-referencing
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to read schema for table `{table}`: {message}")]
    SchemaRead { table: String, message: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Malformed artifact: {0}")]
    MalformedArtifact(String),

    #[error("Identifier must not be empty")]
    EmptyIdentifier,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<sqlparser::parser::ParserError> for CodegenError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        CodegenError::ParseError(err.to_string())
    }
}

impl From<config::ConfigError> for CodegenError {
    fn from(err: config::ConfigError) -> Self {
        CodegenError::ConfigError(err.to_string())
    }
}

impl From<handlebars::RenderError> for CodegenError {
    fn from(err: handlebars::RenderError) -> Self {
        CodegenError::Template(err.to_string())
    }
}

impl From<handlebars::TemplateError> for CodegenError {
    fn from(err: handlebars::TemplateError) -> Self {
        CodegenError::Template(err.to_string())
    }
}

impl From<regex::Error> for CodegenError {
    fn from(err: regex::Error) -> Self {
        CodegenError::ParseError(err.to_string())
    }
}
