//! Stub statements for declared methods missing from a mapping document

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{CodegenError, Result};

use super::syntax::{ArtifactRole, ArtifactSyntax, InsertionPoint, SourcePosition, MAPPER_CLOSE};

const STUB_INDENT: &str = "    ";

/// Statement element a scaffolded stub uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    /// Guess the statement kind from a method name prefix
    ///
    /// Best effort: `addressList` is classified as an insert.
    pub fn infer(method: &str) -> Self {
        let lower = method.to_ascii_lowercase();
        let has_prefix = |prefixes: &[&str]| prefixes.iter().any(|p| lower.starts_with(p));
        if has_prefix(&["insert", "add", "save"]) {
            StatementKind::Insert
        } else if has_prefix(&["update", "modify"]) {
            StatementKind::Update
        } else if has_prefix(&["delete", "remove"]) {
            StatementKind::Delete
        } else {
            StatementKind::Select
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            StatementKind::Select => "select",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
        }
    }

    /// Indented stub element, no trailing newline
    fn stub(&self, method: &str) -> String {
        let attrs = match self {
            StatementKind::Select => format!("id=\"{}\" resultMap=\"BaseResultMap\"", method),
            _ => format!("id=\"{}\"", method),
        };
        format!(
            "{indent}<{tag} {attrs}>\n{indent}{indent}<!-- SQL for {method} -->\n{indent}</{tag}>",
            indent = STUB_INDENT,
            tag = self.tag(),
            attrs = attrs,
            method = method,
        )
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Result of scaffolding a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scaffold {
    /// The stub was inserted; `text` is the full updated document
    Inserted {
        text: String,
        kind: StatementKind,
        position: SourcePosition,
    },
    /// A member with that id already exists; nothing was changed
    AlreadyPresent { position: SourcePosition },
}

fn validate_method(method: &str) -> Result<()> {
    if method.is_empty() {
        return Err(CodegenError::EmptyIdentifier);
    }
    if !method.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(CodegenError::ValidationError(format!(
            "`{}` is not a valid method name",
            method
        )));
    }
    Ok(())
}

/// Insert a stub statement for `method` into mapping document `text`
///
/// Existing content is never modified: the stub goes after the last statement
/// block, or right before the closing `</mapper>` when there is none.
pub fn scaffold_statement(syntax: &dyn ArtifactSyntax, text: &str, method: &str) -> Result<Scaffold> {
    validate_method(method)?;
    if syntax.role() != ArtifactRole::Mapping {
        return Err(CodegenError::ValidationError(
            "statements can only be scaffolded into a mapping document".into(),
        ));
    }

    if let Some(position) = syntax.find_member(text, method) {
        debug!("`{}` already present at line {}", method, position.line);
        return Ok(Scaffold::AlreadyPresent { position });
    }

    let point = syntax.insertion_point(text).ok_or_else(|| {
        CodegenError::MalformedArtifact(format!("mapping document has no closing {}", MAPPER_CLOSE))
    })?;

    let kind = StatementKind::infer(method);
    let stub = kind.stub(method);
    let (offset, snippet) = match point {
        InsertionPoint::AfterBlock(end) => (end, format!("\n\n{}", stub)),
        InsertionPoint::BeforeClose(close) => {
            let line_start = text[..close].rfind('\n').map(|i| i + 1).unwrap_or(0);
            if text[line_start..close].trim().is_empty() {
                (line_start, format!("{}\n", stub))
            } else {
                (close, format!("\n{}\n", stub))
            }
        }
    };

    let stub_start = offset + snippet.find('<').unwrap_or(0);
    let mut updated = String::with_capacity(text.len() + snippet.len());
    updated.push_str(&text[..offset]);
    updated.push_str(&snippet);
    updated.push_str(&text[offset..]);

    Ok(Scaffold::Inserted {
        position: SourcePosition::at(&updated, stub_start),
        text: updated,
        kind,
    })
}

/// Scaffold into a mapping document on disk, writing only when a stub was inserted
pub fn scaffold_file(syntax: &dyn ArtifactSyntax, path: &Path, method: &str) -> Result<Scaffold> {
    let text = fs::read_to_string(path)?;
    let scaffold = scaffold_statement(syntax, &text, method).map_err(|e| match e {
        CodegenError::MalformedArtifact(message) => {
            CodegenError::MalformedArtifact(format!("{}: {}", path.display(), message))
        }
        other => other,
    })?;

    if let Scaffold::Inserted { text, kind, position } = &scaffold {
        fs::write(path, text)?;
        info!(
            "Scaffolded <{}> `{}` in {} at line {}",
            kind,
            method,
            path.display(),
            position.line
        );
    }
    Ok(scaffold)
}
