//! Schema descriptor providers

use std::path::Path;

use serde::Deserialize;

use super::metadata::TableDescriptor;
use super::schema_parser::{base_type_name, parse_schema};
use crate::error::{CodegenError, Result};

/// Source of table and column metadata
///
/// A live database connection is out of scope for this crate; implement this
/// trait over whatever metadata endpoint is available.
pub trait SchemaProvider {
    /// Names of all tables, in the provider's order
    fn table_names(&self) -> Result<Vec<String>>;

    /// Describe one table with its columns in ordinal order
    fn describe_table(&self, name: &str) -> Result<TableDescriptor>;
}

fn find_table(tables: &[TableDescriptor], name: &str) -> Result<TableDescriptor> {
    tables
        .iter()
        .find(|t| t.name == name)
        .cloned()
        .ok_or_else(|| CodegenError::SchemaRead {
            table: name.to_string(),
            message: "table not found in schema".into(),
        })
}

/// Provider backed by a MySQL DDL script
#[derive(Debug, Clone)]
pub struct DdlSchemaProvider {
    tables: Vec<TableDescriptor>,
}

impl DdlSchemaProvider {
    pub fn from_sql(sql: &str) -> Result<Self> {
        Ok(Self {
            tables: parse_schema(sql)?,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let sql = std::fs::read_to_string(path)?;
        Self::from_sql(&sql)
    }

    pub fn tables(&self) -> &[TableDescriptor] {
        &self.tables
    }
}

impl SchemaProvider for DdlSchemaProvider {
    fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    fn describe_table(&self, name: &str) -> Result<TableDescriptor> {
        find_table(&self.tables, name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Wrapped { tables: Vec<TableDescriptor> },
    Bare(Vec<TableDescriptor>),
}

/// Provider backed by a JSON dump of `INFORMATION_SCHEMA` metadata
///
/// Accepts either `{"tables": [...]}` or a bare array of tables.
#[derive(Debug, Clone)]
pub struct SnapshotSchemaProvider {
    tables: Vec<TableDescriptor>,
}

impl SnapshotSchemaProvider {
    pub fn from_json(json: &str) -> Result<Self> {
        let mut tables = match serde_json::from_str(json)? {
            SnapshotFile::Wrapped { tables } => tables,
            SnapshotFile::Bare(tables) => tables,
        };
        for column in tables.iter_mut().flat_map(|t| t.columns.iter_mut()) {
            column.source_type = base_type_name(&column.source_type);
        }
        Ok(Self { tables })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl SchemaProvider for SnapshotSchemaProvider {
    fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    fn describe_table(&self, name: &str) -> Result<TableDescriptor> {
        find_table(&self.tables, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ddl_provider() {
        let provider = DdlSchemaProvider::from_sql(
            "CREATE TABLE a (id INT PRIMARY KEY); CREATE TABLE b (id INT PRIMARY KEY);",
        )
        .unwrap();
        assert_eq!(provider.table_names().unwrap(), vec!["a", "b"]);
        assert_eq!(provider.describe_table("b").unwrap().name, "b");
    }

    #[test]
    fn test_missing_table_is_schema_read_error() {
        let provider = DdlSchemaProvider::from_sql("CREATE TABLE a (id INT);").unwrap();
        let err = provider.describe_table("missing").unwrap_err();
        assert!(matches!(err, CodegenError::SchemaRead { ref table, .. } if table == "missing"));
    }

    #[test]
    fn test_snapshot_provider_shapes() {
        let wrapped = r#"{"tables": [{"name": "t_order", "columns": [
            {"name": "id", "source_type": "BIGINT(20)", "is_primary_key": true}
        ]}]}"#;
        let provider = SnapshotSchemaProvider::from_json(wrapped).unwrap();
        let table = provider.describe_table("t_order").unwrap();
        assert_eq!(table.columns[0].source_type, "bigint");

        let bare = r#"[{"tableName": "t_item", "columns": [
            {"columnName": "sku", "dataType": "varchar"}
        ]}]"#;
        let provider = SnapshotSchemaProvider::from_json(bare).unwrap();
        assert_eq!(provider.table_names().unwrap(), vec!["t_item"]);
    }

    #[test]
    fn test_snapshot_provider_rejects_garbage() {
        assert!(SnapshotSchemaProvider::from_json("{not json").is_err());
    }
}
