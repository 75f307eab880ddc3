//! Declaration <-> mapping document cross-reference resolution

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CodegenError, Result};

use super::syntax::{ArtifactRole, ArtifactSyntax, DeclarationSyntax, MappingSyntax, SourcePosition};
use super::workspace::find_file;

/// Outcome of resolving a member in the paired artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No file with the expected paired name exists in the workspace
    ArtifactMissing { expected: String },
    /// The paired artifact exists but has no member with that name
    MemberMissing { artifact: PathBuf },
    Found {
        artifact: PathBuf,
        position: SourcePosition,
    },
}

/// Whether one declared method has a mapping entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberAudit {
    pub name: String,
    /// Position of the declaration
    pub position: SourcePosition,
    pub implemented: bool,
}

/// Finds paired artifacts and their members below a workspace root
pub struct CrossReferenceResolver {
    root: PathBuf,
    declaration: Box<dyn ArtifactSyntax>,
    mapping: Box<dyn ArtifactSyntax>,
}

impl CrossReferenceResolver {
    /// Resolver over `root` with the built-in pattern syntaxes
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::with_syntax(
            root,
            Box::new(DeclarationSyntax::new()?),
            Box::new(MappingSyntax::new()?),
        ))
    }

    pub fn with_syntax(
        root: impl Into<PathBuf>,
        declaration: Box<dyn ArtifactSyntax>,
        mapping: Box<dyn ArtifactSyntax>,
    ) -> Self {
        Self {
            root: root.into(),
            declaration,
            mapping,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn syntax(&self, role: ArtifactRole) -> &dyn ArtifactSyntax {
        match role {
            ArtifactRole::Declaration => self.declaration.as_ref(),
            ArtifactRole::Mapping => self.mapping.as_ref(),
        }
    }

    fn role_of(path: &Path) -> Result<ArtifactRole> {
        ArtifactRole::from_path(path).ok_or_else(|| {
            CodegenError::ValidationError(format!(
                "{} is neither a .java declaration nor a .xml mapping document",
                path.display()
            ))
        })
    }

    /// File name the paired artifact must have
    ///
    /// Taken from the interface name or the namespace's last segment, falling
    /// back to the file's own stem when the text names nothing.
    pub fn paired_file_name(&self, path: &Path, text: &str) -> Result<String> {
        let role = Self::role_of(path)?;
        let base = self
            .syntax(role)
            .artifact_name(text)
            .or_else(|| {
                path.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .ok_or_else(|| {
                CodegenError::ValidationError(format!("{} has no file name", path.display()))
            })?;
        Ok(format!("{}.{}", base, role.paired().extension()))
    }

    /// Locate the paired artifact of `path` in the workspace
    pub fn find_paired_artifact(&self, path: &Path) -> Result<Option<PathBuf>> {
        let text = fs::read_to_string(path)?;
        let name = self.paired_file_name(path, &text)?;
        Ok(find_file(&self.root, &name))
    }

    /// Position of `name` within text of the given role
    pub fn find_member(&self, role: ArtifactRole, text: &str, name: &str) -> Option<SourcePosition> {
        self.syntax(role).find_member(text, name)
    }

    /// Resolve `member` of `path` to its counterpart in the paired artifact
    pub fn resolve(&self, path: &Path, member: &str) -> Result<Resolution> {
        let role = Self::role_of(path)?;
        let text = fs::read_to_string(path)?;
        let expected = self.paired_file_name(path, &text)?;

        let Some(artifact) = find_file(&self.root, &expected) else {
            debug!("No {} under {}", expected, self.root.display());
            return Ok(Resolution::ArtifactMissing { expected });
        };

        let paired_text = fs::read_to_string(&artifact)?;
        Ok(match self.find_member(role.paired(), &paired_text, member) {
            Some(position) => Resolution::Found { artifact, position },
            None => Resolution::MemberMissing { artifact },
        })
    }

    /// Resolve whatever member is declared on `line` (1-based) of `path`
    ///
    /// Returns `None` when the line declares nothing.
    pub fn resolve_at_line(&self, path: &Path, line: usize) -> Result<Option<(String, Resolution)>> {
        let role = Self::role_of(path)?;
        let text = fs::read_to_string(path)?;
        let Some(member) = self.syntax(role).member_at_line(&text, line) else {
            return Ok(None);
        };
        let resolution = self.resolve(path, &member)?;
        Ok(Some((member, resolution)))
    }

    /// Each declared method, and whether the mapping document implements it
    pub fn audit(&self, declaration_text: &str, mapping_text: &str) -> Vec<MemberAudit> {
        self.declaration
            .members(declaration_text)
            .into_iter()
            .map(|m| MemberAudit {
                implemented: self.mapping.find_member(mapping_text, &m.name).is_some(),
                name: m.name,
                position: m.position,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECLARATION: &str = "package com.example.mapper;

public interface UserMapper {
    int insert(User record);

    User selectById(Long id);
}
";

    const MAPPING: &str = r#"<mapper namespace="com.example.mapper.UserMapper">
    <insert id="insert">
        insert into user (id) values (#{id})
    </insert>
</mapper>
"#;

    fn workspace() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let java = dir.path().join("src/main/java/com/example/mapper/UserMapper.java");
        let xml = dir.path().join("src/main/resources/mapper/UserMapper.xml");
        fs::create_dir_all(java.parent().unwrap()).unwrap();
        fs::create_dir_all(xml.parent().unwrap()).unwrap();
        fs::write(&java, DECLARATION).unwrap();
        fs::write(&xml, MAPPING).unwrap();
        (dir, java, xml)
    }

    #[test]
    fn test_find_paired_artifact_both_directions() {
        let (dir, java, xml) = workspace();
        let resolver = CrossReferenceResolver::new(dir.path()).unwrap();
        assert_eq!(resolver.find_paired_artifact(&java).unwrap(), Some(xml.clone()));
        assert_eq!(resolver.find_paired_artifact(&xml).unwrap(), Some(java));
    }

    #[test]
    fn test_member_missing_is_not_artifact_missing() {
        let (dir, java, xml) = workspace();
        let resolver = CrossReferenceResolver::new(dir.path()).unwrap();

        assert_eq!(
            resolver.resolve(&java, "selectById").unwrap(),
            Resolution::MemberMissing { artifact: xml.clone() }
        );

        match resolver.resolve(&java, "insert").unwrap() {
            Resolution::Found { artifact, position } => {
                assert_eq!(artifact, xml);
                assert_eq!(position.line, 2);
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_artifact_missing() {
        let (dir, java, xml) = workspace();
        fs::remove_file(&xml).unwrap();
        let resolver = CrossReferenceResolver::new(dir.path()).unwrap();
        assert_eq!(
            resolver.resolve(&java, "insert").unwrap(),
            Resolution::ArtifactMissing {
                expected: "UserMapper.xml".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_from_mapping_line() {
        let (dir, java, xml) = workspace();
        let resolver = CrossReferenceResolver::new(dir.path()).unwrap();
        let (member, resolution) = resolver.resolve_at_line(&xml, 2).unwrap().unwrap();
        assert_eq!(member, "insert");
        match resolution {
            Resolution::Found { artifact, position } => {
                assert_eq!(artifact, java);
                assert_eq!(position.line, 4);
            }
            other => panic!("expected Found, got {:?}", other),
        }
        assert!(resolver.resolve_at_line(&xml, 3).unwrap().is_none());
    }

    #[test]
    fn test_audit() {
        let resolver = CrossReferenceResolver::new(".").unwrap();
        let audit = resolver.audit(DECLARATION, MAPPING);
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[0].name, "insert");
        assert!(audit[0].implemented);
        assert_eq!(audit[1].name, "selectById");
        assert!(!audit[1].implemented);
    }

    #[test]
    fn test_multi_line_declaration_resolves() {
        let (dir, java, xml) = workspace();
        let declaration = "public interface UserMapper {
    int updateStatus(@Param(\"id\") Long id,
                     @Param(\"status\") String status);
}
";
        let mapping = r#"<mapper namespace="com.example.mapper.UserMapper">
    <update id="updateStatus">
        update user set status = #{status} where id = #{id}
    </update>
</mapper>
"#;
        fs::write(&java, declaration).unwrap();
        fs::write(&xml, mapping).unwrap();
        let resolver = CrossReferenceResolver::new(dir.path()).unwrap();

        match resolver.resolve(&xml, "updateStatus").unwrap() {
            Resolution::Found { artifact, position } => {
                assert_eq!(artifact, java);
                assert_eq!(position.line, 2);
            }
            other => panic!("expected Found, got {:?}", other),
        }

        let audit = resolver.audit(declaration, mapping);
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].name, "updateStatus");
        assert!(audit[0].implemented);
    }

    #[test]
    fn test_paired_name_falls_back_to_stem() {
        let resolver = CrossReferenceResolver::new(".").unwrap();
        assert_eq!(
            resolver
                .paired_file_name(Path::new("RoleMapper.java"), "class Nothing {}")
                .unwrap(),
            "RoleMapper.xml"
        );
        assert!(resolver
            .paired_file_name(Path::new("notes.txt"), "")
            .is_err());
    }
}
