//! Rebuild executable SQL from a MyBatis statement log
//!
//! MyBatis logs a statement as two lines:
//!
//! ```text
//! ==>  Preparing: select * from user where id = ? and name = ?
//! ==> Parameters: 42(Long), tom(String)
//! ```
//!
//! [`format_sql_log`] substitutes the parameters into the placeholders.
//! [`extract_sql_statements`] does the same for every statement in a longer
//! log excerpt.

use tracing::debug;

use crate::error::{CodegenError, Result};

const PREPARING: &str = "Preparing:";
const PARAMETERS: &str = "Parameters:";

/// Parameter types rendered as quoted literals (compared lower-cased)
const QUOTED_TYPES: &[&str] = &[
    "string",
    "varchar",
    "char",
    "date",
    "time",
    "timestamp",
    "localdate",
    "localtime",
    "localdatetime",
];

/// Text following `marker` up to the end of its line
fn line_after<'a>(log: &'a str, marker: &str) -> Option<&'a str> {
    let start = log.find(marker)? + marker.len();
    let rest = &log[start..];
    let end = rest.find('\n').unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Split a `Parameters:` list on commas outside quotes and parentheses
fn split_parameters(text: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut depth = 0usize;
    let mut prev = None;

    for c in text.chars() {
        match c {
            '\'' if prev != Some('\\') => {
                in_quote = !in_quote;
                current.push(c);
            }
            '(' if !in_quote => {
                depth += 1;
                current.push(c);
            }
            ')' if !in_quote => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if !in_quote && depth == 0 => {
                params.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
        prev = Some(c);
    }
    if !current.trim().is_empty() {
        params.push(current.trim().to_string());
    }
    params
}

/// Render one `value(Type)` entry as a SQL literal
fn format_parameter(param: &str) -> String {
    let (value, type_name) = match param.strip_suffix(')').and_then(|p| p.rsplit_once('(')) {
        Some((value, type_name)) => (value.trim(), Some(type_name.trim().to_ascii_lowercase())),
        None => (param.trim(), None),
    };

    if (value == "null" && type_name.is_none()) || type_name.as_deref() == Some("null") {
        return "NULL".to_string();
    }

    match type_name {
        Some(t) if QUOTED_TYPES.contains(&t.as_str()) => {
            if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
                value.to_string()
            } else {
                format!("'{}'", value.replace('\'', "''"))
            }
        }
        _ => value.to_string(),
    }
}

/// Substitute `params` into the `?` placeholders of `sql`, in order
///
/// Placeholders inside string literals are left alone, as are any beyond the
/// number of parameters.
fn substitute(sql: &str, params: &[String]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut next = params.iter();
    let mut in_literal = false;

    for c in sql.chars() {
        match c {
            '\'' => {
                in_literal = !in_literal;
                out.push(c);
            }
            '?' if !in_literal => match next.next() {
                Some(param) => out.push_str(param),
                None => out.push('?'),
            },
            _ => out.push(c),
        }
    }
    out
}

/// Build an executable statement from a `Preparing:`/`Parameters:` log excerpt
pub fn format_sql_log(log: &str) -> Result<String> {
    let sql = line_after(log, PREPARING).ok_or_else(|| {
        CodegenError::ParseError(format!("log does not contain a `{}` line", PREPARING))
    })?;

    let params = match line_after(log, PARAMETERS) {
        Some(text) if !text.is_empty() => split_parameters(text)
            .iter()
            .map(|p| format_parameter(p))
            .collect(),
        _ => Vec::new(),
    };
    debug!("Substituting {} parameters", params.len());

    Ok(substitute(sql, &params))
}

/// Split a log into one excerpt per `Preparing:` line
///
/// An excerpt runs up to and including the next `Parameters:` line. A
/// statement logged without parameters ends where the next one starts.
pub fn split_sql_log(log: &str) -> Vec<String> {
    let mut excerpts = Vec::new();
    let mut current: Option<String> = None;

    for line in log.lines() {
        if line.contains(PREPARING) {
            excerpts.extend(current.replace(line.to_string()));
        } else if let Some(excerpt) = current.as_mut() {
            excerpt.push('\n');
            excerpt.push_str(line);
            if line.contains(PARAMETERS) {
                excerpts.extend(current.take());
            }
        }
    }
    excerpts.extend(current);
    excerpts
}

/// Rebuild every statement found in a log, in log order
pub fn extract_sql_statements(log: &str) -> Result<Vec<String>> {
    let excerpts = split_sql_log(log);
    if excerpts.is_empty() {
        return Err(CodegenError::ParseError(format!(
            "log does not contain a `{}` line",
            PREPARING
        )));
    }
    excerpts.iter().map(|excerpt| format_sql_log(excerpt)).collect()
}
