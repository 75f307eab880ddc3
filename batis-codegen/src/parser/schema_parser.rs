//! MySQL DDL parser using sqlparser-rs

use sqlparser::ast::{
    ColumnOption, CommentDef, CreateTableOptions, Expr, Ident, IndexColumn, ObjectName,
    PrimaryKeyConstraint, SqlOption, Statement, TableConstraint,
};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

use super::metadata::*;
use crate::error::Result;

/// Parse a SQL schema string into table descriptors
pub fn parse_schema(sql: &str) -> Result<Vec<TableDescriptor>> {
    let dialect = MySqlDialect {};
    let statements = Parser::parse_sql(&dialect, sql)?;

    let mut tables = Vec::new();

    for stmt in statements {
        if let Statement::CreateTable(create_table) = stmt {
            tables.push(extract_table_descriptor(&create_table));
        }
    }

    Ok(tables)
}

/// Reduce a rendered SQL type to the lower-cased base name MySQL reports as `DATA_TYPE`
///
/// `VARCHAR(255)` -> `varchar`, `INT UNSIGNED` -> `int`, `DECIMAL(10,2)` -> `decimal`
pub fn base_type_name(data_type: &str) -> String {
    data_type
        .trim()
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Extract a table descriptor from a CREATE TABLE statement
fn extract_table_descriptor(create: &sqlparser::ast::CreateTable) -> TableDescriptor {
    let name = extract_table_name(&create.name);

    let mut columns: Vec<ColumnDescriptor> = create
        .columns
        .iter()
        .map(extract_column_descriptor)
        .collect();

    // Table-level PRIMARY KEY (col, ...)
    for constraint in &create.constraints {
        if let TableConstraint::PrimaryKey(PrimaryKeyConstraint {
            columns: pk_cols, ..
        }) = constraint
        {
            for pk_col in pk_cols {
                let col_name = extract_ident_from_index_column(pk_col);
                if let Some(col) = columns.iter_mut().find(|c| c.name == col_name) {
                    col.is_primary_key = true;
                }
            }
        }
    }

    TableDescriptor {
        name,
        comment: extract_table_comment(create),
        columns,
    }
}

/// Table-level `COMMENT` (MySQL puts it among the table options)
fn extract_table_comment(create: &sqlparser::ast::CreateTable) -> String {
    let options: &[SqlOption] = match &create.table_options {
        CreateTableOptions::Plain(options)
        | CreateTableOptions::With(options)
        | CreateTableOptions::Options(options)
        | CreateTableOptions::TableProperties(options) => options.as_slice(),
        CreateTableOptions::None => &[],
    };

    create
        .comment
        .iter()
        .chain(options.iter().filter_map(|option| match option {
            SqlOption::Comment(comment) => Some(comment),
            _ => None,
        }))
        .map(|comment| match comment {
            CommentDef::WithEq(text) | CommentDef::WithoutEq(text) => text.clone(),
        })
        .next()
        .unwrap_or_default()
}

/// Extract a column descriptor from a column definition
fn extract_column_descriptor(col_def: &sqlparser::ast::ColumnDef) -> ColumnDescriptor {
    let mut column = ColumnDescriptor::new(
        &extract_ident(&col_def.name),
        &base_type_name(&col_def.data_type.to_string()),
    );

    for option in &col_def.options {
        match &option.option {
            ColumnOption::PrimaryKey(_) => {
                column.is_primary_key = true;
            }
            ColumnOption::Comment(c) => {
                column.comment = c.clone();
            }
            _ => {}
        }
    }

    column
}

/// Extract a simple string from an ObjectName
fn extract_table_name(name: &ObjectName) -> String {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .unwrap_or_default()
}

/// Extract a string from an Ident, removing backticks if present
fn extract_ident(ident: &Ident) -> String {
    ident.value.clone()
}

/// Extract a column name string from an IndexColumn
fn extract_ident_from_index_column(ic: &IndexColumn) -> String {
    match &ic.column.expr {
        Expr::Identifier(ident) => ident.value.clone(),
        other => format!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let sql = r#"
            CREATE TABLE users (
                id BIGINT AUTO_INCREMENT PRIMARY KEY,
                username VARCHAR(255) NOT NULL COMMENT 'login name',
                balance DECIMAL(10,2)
            );
        "#;

        let tables = parse_schema(sql).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "users");
        assert_eq!(tables[0].columns.len(), 3);

        let id = &tables[0].columns[0];
        assert!(id.is_primary_key);
        assert_eq!(id.source_type, "bigint");

        let username = tables[0].get_column("username").unwrap();
        assert_eq!(username.source_type, "varchar");
        assert_eq!(username.comment, "login name");
        assert!(!username.is_primary_key);

        assert_eq!(tables[0].get_column("balance").unwrap().source_type, "decimal");
    }

    #[test]
    fn test_parse_table_comment() {
        let sql = r#"
            CREATE TABLE t_user (
                user_id BIGINT PRIMARY KEY
            ) ENGINE=InnoDB COMMENT='Registered users';
            CREATE TABLE t_tag (id INT PRIMARY KEY);
        "#;

        let tables = parse_schema(sql).unwrap();
        assert_eq!(tables[0].comment, "Registered users");
        assert_eq!(tables[1].comment, "");
    }

    #[test]
    fn test_parse_table_level_primary_key() {
        let sql = r#"
            CREATE TABLE sys_role (
                role_code VARCHAR(32) NOT NULL,
                role_name VARCHAR(64) NOT NULL,
                PRIMARY KEY (role_code)
            );
        "#;

        let tables = parse_schema(sql).unwrap();
        let key = tables[0].key_column().unwrap();
        assert_eq!(key.name, "role_code");
        assert!(tables[0].has_declared_key());
    }

    #[test]
    fn test_parse_table_without_key() {
        let sql = "CREATE TABLE event_log (event_time DATETIME, message TEXT);";
        let tables = parse_schema(sql).unwrap();
        assert!(!tables[0].has_declared_key());
        assert_eq!(tables[0].columns[0].source_type, "datetime");
    }

    #[test]
    fn test_parse_ignores_non_create_statements() {
        let sql = r#"
            DROP TABLE IF EXISTS a;
            CREATE TABLE a (id INT PRIMARY KEY);
            INSERT INTO a VALUES (1);
        "#;
        let tables = parse_schema(sql).unwrap();
        assert_eq!(tables.len(), 1);
    }

    #[test]
    fn test_parse_error() {
        assert!(parse_schema("CREATE TABLE (").is_err());
    }

    #[test]
    fn test_base_type_name() {
        assert_eq!(base_type_name("VARCHAR(255)"), "varchar");
        assert_eq!(base_type_name("INT UNSIGNED"), "int");
        assert_eq!(base_type_name("DECIMAL(10,2)"), "decimal");
        assert_eq!(base_type_name("datetime"), "datetime");
    }
}
