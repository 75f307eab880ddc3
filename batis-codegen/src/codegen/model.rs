//! Render model - the template-ready view of one table

use serde::Serialize;
use tracing::warn;

use crate::config::{CodegenConfig, NamingStrategy};
use crate::error::{CodegenError, Result};
use crate::parser::{ColumnDescriptor, TableDescriptor};

use super::naming::{field_name_for, is_java_keyword, to_mapper_name, to_type_name};
use super::type_mapper::TypeMapper;

/// Naming inputs shared by every table of a generation run
#[derive(Debug, Clone, Default)]
pub struct ModelOptions {
    pub package_name: String,
    pub naming_strategy: NamingStrategy,
    pub strip_prefixes: Option<Vec<String>>,
}

impl ModelOptions {
    pub fn from_config(config: &CodegenConfig) -> Self {
        Self {
            package_name: config.package_name.clone(),
            naming_strategy: config.naming_strategy,
            strip_prefixes: config.strip_prefixes().map(<[String]>::to_vec),
        }
    }

    /// Class name for a table under these options
    pub fn class_name(&self, table_name: &str) -> String {
        to_type_name(table_name, self.strip_prefixes.as_deref())
    }
}

/// One column as seen by templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnModel {
    pub column_name: String,
    pub column_comment: Option<String>,
    pub field_name: String,
    pub java_type: String,
    pub jdbc_type: String,
    pub is_primary_key: bool,
    /// MyBatis parameter reference, e.g. `#{userName,jdbcType=VARCHAR}`
    pub param: String,
}

/// Template data for one table
///
/// Built fresh for every render and never mutated afterwards. Both the
/// declaration and the mapping document are rendered from the same instance,
/// so every identifier they share comes from one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    pub package_name: String,
    pub entity_package: String,
    pub mapper_package: String,
    pub class_name: String,
    pub mapper_name: String,
    pub table_name: String,
    pub table_comment: Option<String>,
    pub has_date: bool,
    pub has_big_decimal: bool,
    pub imports: Vec<String>,
    pub columns: Vec<ColumnModel>,
    pub update_columns: Vec<ColumnModel>,
    pub primary_key: ColumnModel,
    pub column_list: String,
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn build_column(column: &ColumnDescriptor, is_key: bool, options: &ModelOptions) -> Result<ColumnModel> {
    if column.name.trim().is_empty() {
        return Err(CodegenError::EmptyIdentifier);
    }

    let field_name = field_name_for(&column.name, options.naming_strategy);
    if is_java_keyword(&field_name) {
        warn!(
            "Column `{}` maps to Java keyword `{}`; generated code will not compile",
            column.name, field_name
        );
    }

    let java_type = TypeMapper::to_target_type(&column.source_type);
    let jdbc_type = TypeMapper::to_binding_type(&column.source_type);
    if !TypeMapper::is_known(&column.source_type) {
        warn!(
            "Unrecognized type `{}` for column `{}`, using {} / {}",
            column.source_type, column.name, java_type, jdbc_type
        );
    }

    Ok(ColumnModel {
        column_name: column.name.clone(),
        column_comment: non_empty(&column.comment),
        param: format!("#{{{},jdbcType={}}}", field_name, jdbc_type),
        field_name,
        java_type: java_type.to_string(),
        jdbc_type: jdbc_type.to_string(),
        is_primary_key: is_key,
    })
}

impl RenderModel {
    /// Build the render model for a table
    pub fn build(table: &TableDescriptor, options: &ModelOptions) -> Result<Self> {
        if table.name.trim().is_empty() {
            return Err(CodegenError::EmptyIdentifier);
        }
        if table.columns.is_empty() {
            return Err(CodegenError::ValidationError(format!(
                "Table `{}` has no columns",
                table.name
            )));
        }

        let flagged = table.columns.iter().filter(|c| c.is_primary_key).count();
        if flagged == 0 {
            warn!(
                "Table `{}` has no primary key, using first column `{}` as key",
                table.name, table.columns[0].name
            );
        } else if flagged > 1 {
            warn!(
                "Table `{}` has a composite primary key, using first key column only",
                table.name
            );
        }
        // key_column() is Some because columns is non-empty
        let key_name = table
            .key_column()
            .map(|c| c.name.as_str())
            .unwrap_or_default();

        let columns = table
            .columns
            .iter()
            .map(|c| build_column(c, c.name == key_name, options))
            .collect::<Result<Vec<_>>>()?;

        let primary_key = columns
            .iter()
            .find(|c| c.is_primary_key)
            .cloned()
            .ok_or_else(|| CodegenError::ValidationError(format!(
                "Table `{}` has no usable key column",
                table.name
            )))?;

        let update_columns: Vec<ColumnModel> = columns
            .iter()
            .filter(|c| !c.is_primary_key)
            .cloned()
            .collect();

        let java_types: Vec<_> = table
            .columns
            .iter()
            .map(|c| TypeMapper::to_target_type(&c.source_type))
            .collect();
        let mut imports: Vec<String> = java_types
            .iter()
            .filter_map(|t| t.import())
            .map(str::to_string)
            .collect();
        imports.sort();
        imports.dedup();

        let column_list = columns
            .iter()
            .map(|c| c.column_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let class_name = options.class_name(&table.name);
        if class_name.is_empty() {
            return Err(CodegenError::EmptyIdentifier);
        }

        Ok(Self {
            entity_package: format!("{}.entity", options.package_name),
            mapper_package: format!("{}.mapper", options.package_name),
            package_name: options.package_name.clone(),
            mapper_name: to_mapper_name(&class_name),
            class_name,
            table_name: table.name.clone(),
            table_comment: non_empty(&table.comment),
            has_date: java_types.iter().any(|t| t.is_date()),
            has_big_decimal: java_types.iter().any(|t| t.is_decimal()),
            imports,
            columns,
            update_columns,
            primary_key,
            column_list,
        })
    }
}
