//! Table and column descriptors consumed by the generator

use serde::{Deserialize, Serialize};

/// Descriptor of a database table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name
    #[serde(alias = "tableName")]
    pub name: String,

    /// Table comment (empty if none)
    #[serde(default, alias = "tableComment")]
    pub comment: String,

    /// Columns in ordinal order
    pub columns: Vec<ColumnDescriptor>,
}

/// Descriptor of a single column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    #[serde(alias = "columnName")]
    pub name: String,

    /// Source type name as reported by MySQL (e.g. "varchar", "BIGINT")
    #[serde(alias = "dataType")]
    pub source_type: String,

    /// Column comment (empty if none)
    #[serde(default, alias = "columnComment")]
    pub comment: String,

    /// Whether this column is flagged as primary key
    #[serde(default, alias = "isPrimaryKey")]
    pub is_primary_key: bool,
}

impl TableDescriptor {
    /// Get a column by name
    pub fn get_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether any column carries the primary-key flag
    pub fn has_declared_key(&self) -> bool {
        self.columns.iter().any(|c| c.is_primary_key)
    }

    /// The column used as key: the first flagged column, else the first column
    pub fn key_column(&self) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|c| c.is_primary_key)
            .or_else(|| self.columns.first())
    }
}

impl ColumnDescriptor {
    pub fn new(name: &str, source_type: &str) -> Self {
        Self {
            name: name.to_string(),
            source_type: source_type.to_string(),
            comment: String::new(),
            is_primary_key: false,
        }
    }

    /// Mark this column as primary key
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Attach a comment
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self
    }
}
