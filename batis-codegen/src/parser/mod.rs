//! Schema metadata: descriptors, DDL parsing and providers

mod metadata;
mod provider;
mod schema_parser;

pub use metadata::*;
pub use provider::*;
pub use schema_parser::*;
