//! Naming utilities for code generation

use heck::ToSnakeCase;

use crate::config::NamingStrategy;

/// Suffix appended to the class name for declaration and mapping artifacts
pub const MAPPER_SUFFIX: &str = "Mapper";

fn capitalize(segment: &str) -> String {
    let lower = segment.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn segments(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('_').filter(|s| !s.is_empty())
}

/// Remove the first configured prefix the table name starts with
///
/// First match wins, not longest match. If stripping leaves nothing but
/// underscores, the raw name is returned unchanged.
pub fn strip_table_prefix<'a>(table_name: &'a str, prefixes: &[String]) -> &'a str {
    let stripped = prefixes
        .iter()
        .filter(|p| !p.is_empty())
        .find_map(|p| table_name.strip_prefix(p.as_str()))
        .unwrap_or(table_name);

    if segments(stripped).next().is_none() {
        table_name
    } else {
        stripped
    }
}

/// Convert a table name to a class name (PascalCase)
///
/// e.g. "sys_user" -> "SysUser", or "User" with prefixes `["sys_"]`
pub fn to_type_name(raw_name: &str, strip_prefixes: Option<&[String]>) -> String {
    let name = match strip_prefixes {
        Some(prefixes) => strip_table_prefix(raw_name, prefixes),
        None => raw_name,
    };
    segments(name).map(capitalize).collect()
}

/// Convert a column name to a field name (camelCase)
///
/// e.g. "create_time" -> "createTime", "ID" -> "id"
pub fn to_field_name(raw_name: &str) -> String {
    let mut parts = segments(raw_name);
    let mut field = parts.next().map(str::to_lowercase).unwrap_or_default();
    for part in parts {
        field.push_str(&capitalize(part));
    }
    field
}

/// Field name for a column under the configured naming strategy
pub fn field_name_for(raw_name: &str, strategy: NamingStrategy) -> String {
    match strategy {
        NamingStrategy::CamelCase => to_field_name(raw_name),
        NamingStrategy::SnakeCase => raw_name.to_snake_case(),
    }
}

/// Declaration/mapping artifact name for a class, e.g. "User" -> "UserMapper"
pub fn to_mapper_name(class_name: &str) -> String {
    format!("{}{}", class_name, MAPPER_SUFFIX)
}

/// Convert a dotted package to a relative directory path, e.g. "com.example" -> "com/example"
pub fn package_to_path(package_name: &str) -> String {
    package_name.replace('.', "/")
}

/// Check if a name is a Java reserved word
pub fn is_java_keyword(name: &str) -> bool {
    matches!(
        name,
        "abstract"
            | "assert"
            | "boolean"
            | "break"
            | "byte"
            | "case"
            | "catch"
            | "char"
            | "class"
            | "const"
            | "continue"
            | "default"
            | "do"
            | "double"
            | "else"
            | "enum"
            | "extends"
            | "final"
            | "finally"
            | "float"
            | "for"
            | "goto"
            | "if"
            | "implements"
            | "import"
            | "instanceof"
            | "int"
            | "interface"
            | "long"
            | "native"
            | "new"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "return"
            | "short"
            | "static"
            | "strictfp"
            | "super"
            | "switch"
            | "synchronized"
            | "this"
            | "throw"
            | "throws"
            | "transient"
            | "try"
            | "void"
            | "volatile"
            | "while"
            | "true"
            | "false"
            | "null"
    )
}
