//! MySQL to Java / JDBC type mapping

use std::fmt;

/// Java type of an entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JavaType {
    String,
    Integer,
    Long,
    Boolean,
    Float,
    Double,
    BigDecimal,
    Date,
    /// Fallback for unrecognized source types
    Object,
}

impl JavaType {
    /// Simple type name as written in generated code
    pub fn as_str(&self) -> &'static str {
        match self {
            JavaType::String => "String",
            JavaType::Integer => "Integer",
            JavaType::Long => "Long",
            JavaType::Boolean => "Boolean",
            JavaType::Float => "Float",
            JavaType::Double => "Double",
            JavaType::BigDecimal => "BigDecimal",
            JavaType::Date => "Date",
            JavaType::Object => "Object",
        }
    }

    /// Import statement target needed to use this type, if any
    pub fn import(&self) -> Option<&'static str> {
        match self {
            JavaType::BigDecimal => Some("java.math.BigDecimal"),
            JavaType::Date => Some("java.util.Date"),
            _ => None,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, JavaType::Date)
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self, JavaType::BigDecimal)
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MyBatis `jdbcType` tag used in mapping documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JdbcType {
    Varchar,
    Char,
    LongVarchar,
    Integer,
    TinyInt,
    SmallInt,
    BigInt,
    Timestamp,
    Date,
    Time,
    Decimal,
    Boolean,
    Bit,
    Float,
    Double,
    /// Fallback for unrecognized source types
    Other,
}

impl JdbcType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JdbcType::Varchar => "VARCHAR",
            JdbcType::Char => "CHAR",
            JdbcType::LongVarchar => "LONGVARCHAR",
            JdbcType::Integer => "INTEGER",
            JdbcType::TinyInt => "TINYINT",
            JdbcType::SmallInt => "SMALLINT",
            JdbcType::BigInt => "BIGINT",
            JdbcType::Timestamp => "TIMESTAMP",
            JdbcType::Date => "DATE",
            JdbcType::Time => "TIME",
            JdbcType::Decimal => "DECIMAL",
            JdbcType::Boolean => "BOOLEAN",
            JdbcType::Bit => "BIT",
            JdbcType::Float => "FLOAT",
            JdbcType::Double => "DOUBLE",
            JdbcType::Other => "OTHER",
        }
    }
}

impl fmt::Display for JdbcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed mapping table keyed by lower-cased MySQL base type name
const TYPE_TABLE: &[(&str, JavaType, JdbcType)] = &[
    ("varchar", JavaType::String, JdbcType::Varchar),
    ("char", JavaType::String, JdbcType::Char),
    ("text", JavaType::String, JdbcType::LongVarchar),
    ("tinytext", JavaType::String, JdbcType::Varchar),
    ("mediumtext", JavaType::String, JdbcType::LongVarchar),
    ("longtext", JavaType::String, JdbcType::LongVarchar),
    ("int", JavaType::Integer, JdbcType::Integer),
    ("integer", JavaType::Integer, JdbcType::Integer),
    ("mediumint", JavaType::Integer, JdbcType::Integer),
    ("tinyint", JavaType::Integer, JdbcType::TinyInt),
    ("smallint", JavaType::Integer, JdbcType::SmallInt),
    ("bigint", JavaType::Long, JdbcType::BigInt),
    ("datetime", JavaType::Date, JdbcType::Timestamp),
    ("timestamp", JavaType::Date, JdbcType::Timestamp),
    ("date", JavaType::Date, JdbcType::Date),
    ("time", JavaType::Date, JdbcType::Time),
    ("decimal", JavaType::BigDecimal, JdbcType::Decimal),
    ("numeric", JavaType::BigDecimal, JdbcType::Decimal),
    ("boolean", JavaType::Boolean, JdbcType::Boolean),
    ("bool", JavaType::Boolean, JdbcType::Boolean),
    ("bit", JavaType::Boolean, JdbcType::Bit),
    ("float", JavaType::Float, JdbcType::Float),
    ("double", JavaType::Double, JdbcType::Double),
    ("real", JavaType::Double, JdbcType::Double),
];

/// Resolve MySQL column types to Java field types and JDBC binding tags
pub struct TypeMapper;

impl TypeMapper {
    fn lookup(source_type: &str) -> Option<(JavaType, JdbcType)> {
        let key = crate::parser::base_type_name(source_type);
        TYPE_TABLE
            .iter()
            .find(|(name, _, _)| *name == key)
            .map(|(_, java, jdbc)| (*java, *jdbc))
    }

    /// Java field type; unknown source types resolve to `Object`
    pub fn to_target_type(source_type: &str) -> JavaType {
        Self::lookup(source_type)
            .map(|(java, _)| java)
            .unwrap_or(JavaType::Object)
    }

    /// JDBC binding tag; unknown source types resolve to `OTHER`
    pub fn to_binding_type(source_type: &str) -> JdbcType {
        Self::lookup(source_type)
            .map(|(_, jdbc)| jdbc)
            .unwrap_or(JdbcType::Other)
    }

    /// Whether the source type is covered by the mapping table
    pub fn is_known(source_type: &str) -> bool {
        Self::lookup(source_type).is_some()
    }
}
