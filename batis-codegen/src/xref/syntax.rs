//! Pattern-based views of declaration and mapping artifacts
//!
//! Everything that looks inside artifact text goes through [`ArtifactSyntax`],
//! so the regex implementations here can be replaced by structural parsers
//! without touching the resolver or the scaffolder.

use std::path::Path;

use regex::Regex;

use crate::error::Result;

/// Location of a member inside artifact text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    /// Byte offset into the text
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl SourcePosition {
    /// Position of a byte offset within `text`
    pub fn at(text: &str, offset: usize) -> Self {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &text[..offset];
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        Self {
            offset,
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

/// A named member: a declared method, or an element carrying an `id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    /// `method` for declarations, the element name for mapping documents
    pub tag: String,
    pub position: SourcePosition,
}

/// Which half of a declaration/mapping pair an artifact is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactRole {
    Declaration,
    Mapping,
}

impl ArtifactRole {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactRole::Declaration => "java",
            ArtifactRole::Mapping => "xml",
        }
    }

    pub fn paired(&self) -> ArtifactRole {
        match self {
            ArtifactRole::Declaration => ArtifactRole::Mapping,
            ArtifactRole::Mapping => ArtifactRole::Declaration,
        }
    }

    /// Role implied by a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "java" => Some(ArtifactRole::Declaration),
            "xml" => Some(ArtifactRole::Mapping),
            _ => None,
        }
    }
}

/// Where a new statement can be inserted without touching existing content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionPoint {
    /// Right after the end of the last recognized statement block
    AfterBlock(usize),
    /// Right before the closing container tag
    BeforeClose(usize),
}

/// Narrow read-only interface over artifact text
pub trait ArtifactSyntax {
    fn role(&self) -> ArtifactRole;

    /// Base name the paired artifact is expected to have, derived from the text
    fn artifact_name(&self, text: &str) -> Option<String>;

    /// All members in document order
    fn members(&self, text: &str) -> Vec<Member>;

    /// Name of the member declared on a 1-based line, if any
    fn member_at_line(&self, text: &str, line: usize) -> Option<String>;

    /// Position of the first member whose identifier equals `name` exactly
    fn find_member(&self, text: &str, name: &str) -> Option<SourcePosition> {
        self.members(text)
            .into_iter()
            .find(|m| m.name == name)
            .map(|m| m.position)
    }

    /// Safe offset for inserting a new member; `None` if the text is malformed
    fn insertion_point(&self, _text: &str) -> Option<InsertionPoint> {
        None
    }
}

/// Iterate lines with their starting byte offset, line terminators stripped
fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    text.split_inclusive('\n').map(move |line| {
        let start = offset;
        offset += line.len();
        (start, line.trim_end_matches(['\n', '\r']))
    })
}

fn nth_line(text: &str, line: usize) -> Option<&str> {
    line.checked_sub(1)
        .and_then(|index| lines_with_offsets(text).nth(index))
        .map(|(_, l)| l)
}

/// Java mapper interfaces
#[derive(Debug, Clone)]
pub struct DeclarationSyntax {
    interface: Regex,
    declaration: Regex,
    signature: Regex,
}

impl DeclarationSyntax {
    pub fn new() -> Result<Self> {
        Ok(Self {
            interface: Regex::new(r"public\s+interface\s+(\w+)")?,
            // Abstract method: modifiers, return type, name, parameters, `;`
            declaration: Regex::new(
                r"^\s*(?:public|private|protected)?\s*[\w\s<>,.?\[\]]+\s+(\w+)\s*\(.*\)\s*;",
            )?,
            signature: Regex::new(r"^\s*(?:public|private|protected)?\s*[\w\s<>,.?\[\]]+\s+(\w+)\s*\(")?,
        })
    }
}

impl ArtifactSyntax for DeclarationSyntax {
    fn role(&self) -> ArtifactRole {
        ArtifactRole::Declaration
    }

    fn artifact_name(&self, text: &str) -> Option<String> {
        self.interface
            .captures(text)
            .map(|caps| caps[1].to_string())
    }

    fn members(&self, text: &str) -> Vec<Member> {
        let mut members = Vec::new();
        let mut consumed = 0;

        for (start, line) in lines_with_offsets(text) {
            if start < consumed || !self.signature.is_match(line) {
                continue;
            }
            // A signature may continue over several lines up to its `;`
            let rest = &text[start..];
            let Some(end) = rest.find([';', '{', '}']) else {
                break;
            };
            if !rest[end..].starts_with(';') {
                continue;
            }
            // Same byte length, so offsets still line up with `text`
            let statement = rest[..=end].replace(['\r', '\n'], " ");
            if let Some(name) = self.declaration.captures(&statement).and_then(|c| c.get(1)) {
                members.push(Member {
                    name: name.as_str().to_string(),
                    tag: "method".to_string(),
                    position: SourcePosition::at(text, start + name.start()),
                });
                consumed = start + end + 1;
            }
        }
        members
    }

    fn member_at_line(&self, text: &str, line: usize) -> Option<String> {
        let line = nth_line(text, line)?;
        self.signature
            .captures(line)
            .map(|caps| caps[1].to_string())
    }
}

/// MyBatis mapper XML documents
#[derive(Debug, Clone)]
pub struct MappingSyntax {
    namespace: Regex,
    element_id: Regex,
    id_attr: Regex,
    statement_close: Regex,
}

/// Closing tag of the mapping document container
pub const MAPPER_CLOSE: &str = "</mapper>";

impl MappingSyntax {
    pub fn new() -> Result<Self> {
        Ok(Self {
            namespace: Regex::new(r#"namespace="([^"]+)""#)?,
            element_id: Regex::new(r#"<([\w:-]+)\b[^>]*?\bid="([^"]+)""#)?,
            id_attr: Regex::new(r#"\bid="([^"]+)""#)?,
            statement_close: Regex::new(r"</(?:select|insert|update|delete)\s*>")?,
        })
    }

    /// Full `namespace` attribute value
    pub fn namespace<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.namespace
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

impl ArtifactSyntax for MappingSyntax {
    fn role(&self) -> ArtifactRole {
        ArtifactRole::Mapping
    }

    fn artifact_name(&self, text: &str) -> Option<String> {
        self.namespace(text)?
            .rsplit('.')
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn members(&self, text: &str) -> Vec<Member> {
        self.element_id
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(Member {
                    name: caps[2].to_string(),
                    tag: caps[1].to_string(),
                    position: SourcePosition::at(text, whole.start()),
                })
            })
            .collect()
    }

    fn member_at_line(&self, text: &str, line: usize) -> Option<String> {
        let line = nth_line(text, line)?;
        self.id_attr
            .captures(line)
            .map(|caps| caps[1].to_string())
    }

    fn insertion_point(&self, text: &str) -> Option<InsertionPoint> {
        let close = text.rfind(MAPPER_CLOSE)?;
        let last_block = self
            .statement_close
            .find_iter(&text[..close])
            .last()
            .map(|m| m.end());
        Some(match last_block {
            Some(end) => InsertionPoint::AfterBlock(end),
            None => InsertionPoint::BeforeClose(close),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECLARATION: &str = "package com.example.mapper;

import java.util.List;

@Mapper
public interface UserMapper {
    /**
     * Insert a record (all columns);
     */
    int insert(User record);

    User selectByPrimaryKey(Long userId);

    List<User> selectAll();

    int updateStatus(@Param(\"id\") Long id, @Param(\"status\") String status);
}
";

    const MAPPING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mapper namespace="com.example.mapper.UserMapper">
    <resultMap id="BaseResultMap" type="com.example.entity.User">
        <id column="user_id" property="userId" jdbcType="BIGINT"/>
    </resultMap>

    <select id="selectAll" resultMap="BaseResultMap">
        select * from sys_user
    </select>
</mapper>
"#;

    #[test]
    fn test_source_position() {
        let text = "ab\ncdé\nf";
        assert_eq!(
            SourcePosition::at(text, 0),
            SourcePosition { offset: 0, line: 1, column: 1 }
        );
        let pos = SourcePosition::at(text, text.find('f').unwrap());
        assert_eq!((pos.line, pos.column), (3, 1));
        let pos = SourcePosition::at(text, 5);
        assert_eq!((pos.line, pos.column), (2, 3));
        // Inside a multi-byte character snaps back to its start
        assert_eq!(SourcePosition::at(text, 6).offset, 5);
    }

    #[test]
    fn test_declaration_members() {
        let syntax = DeclarationSyntax::new().unwrap();
        assert_eq!(syntax.artifact_name(DECLARATION).as_deref(), Some("UserMapper"));

        let names: Vec<_> = syntax
            .members(DECLARATION)
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(
            names,
            vec!["insert", "selectByPrimaryKey", "selectAll", "updateStatus"]
        );

        let pos = syntax.find_member(DECLARATION, "selectAll").unwrap();
        assert_eq!(pos.line, 14);
        assert_eq!(&DECLARATION[pos.offset..pos.offset + 9], "selectAll");
        assert!(syntax.find_member(DECLARATION, "select").is_none());
    }

    #[test]
    fn test_declaration_spanning_lines() {
        let text = "public interface OrderMapper {
    int updateStatus(@Param(\"id\") Long id,
                     @Param(\"status\") String status);

    List<Order> selectByRange(
        @Param(\"from\") Date from,
        @Param(\"to\") Date to
    );

    default int countAll() {
        return 0;
    }
}
";
        let syntax = DeclarationSyntax::new().unwrap();
        let members = syntax.members(text);
        let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["updateStatus", "selectByRange"]);
        assert_eq!(members[0].position.line, 2);
        assert_eq!(members[1].position.line, 5);
        assert_eq!(&text[members[1].position.offset..][..13], "selectByRange");
    }

    #[test]
    fn test_declaration_member_at_line() {
        let syntax = DeclarationSyntax::new().unwrap();
        assert_eq!(
            syntax.member_at_line(DECLARATION, 12).as_deref(),
            Some("selectByPrimaryKey")
        );
        assert_eq!(syntax.member_at_line(DECLARATION, 1), None);
        assert_eq!(syntax.member_at_line(DECLARATION, 999), None);
    }

    #[test]
    fn test_mapping_members() {
        let syntax = MappingSyntax::new().unwrap();
        assert_eq!(syntax.artifact_name(MAPPING).as_deref(), Some("UserMapper"));
        assert_eq!(syntax.namespace(MAPPING), Some("com.example.mapper.UserMapper"));

        let members = syntax.members(MAPPING);
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].tag, "resultMap");
        assert_eq!(members[1].name, "selectAll");
        assert_eq!(members[1].tag, "select");
        assert_eq!(members[1].position.line, 7);

        assert!(syntax.find_member(MAPPING, "selectById").is_none());
        assert_eq!(syntax.member_at_line(MAPPING, 7).as_deref(), Some("selectAll"));
    }

    #[test]
    fn test_mapping_insertion_point() {
        let syntax = MappingSyntax::new().unwrap();
        match syntax.insertion_point(MAPPING) {
            Some(InsertionPoint::AfterBlock(end)) => {
                assert!(MAPPING[..end].ends_with("</select>"));
            }
            other => panic!("unexpected insertion point {:?}", other),
        }

        let empty = "<mapper namespace=\"a.B\">\n</mapper>\n";
        assert_eq!(
            syntax.insertion_point(empty),
            Some(InsertionPoint::BeforeClose(empty.find("</mapper>").unwrap()))
        );
        assert_eq!(syntax.insertion_point("<mapper namespace=\"a.B\">"), None);
    }

    #[test]
    fn test_role_from_path() {
        assert_eq!(
            ArtifactRole::from_path(Path::new("a/UserMapper.java")),
            Some(ArtifactRole::Declaration)
        );
        assert_eq!(
            ArtifactRole::from_path(Path::new("UserMapper.xml")),
            Some(ArtifactRole::Mapping)
        );
        assert_eq!(ArtifactRole::from_path(Path::new("README.md")), None);
        assert_eq!(ArtifactRole::Mapping.paired(), ArtifactRole::Declaration);
    }
}
