//! Generated artifact kinds and where they land under the output root

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

use super::naming::{package_to_path, to_mapper_name};
use super::renderer::TemplateKind;

const JAVA_SOURCE_ROOT: &str = "src/main/java";
const MAPPER_RESOURCE_DIR: &str = "src/main/resources/mapper";

/// The three coupled artifacts produced for each table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// `<Class>.java`
    Entity,
    /// `<Class>Mapper.java`, the declaration artifact
    Declaration,
    /// `<Class>Mapper.xml`, the mapping document
    Mapping,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Entity,
        ArtifactKind::Declaration,
        ArtifactKind::Mapping,
    ];

    pub fn template(&self) -> TemplateKind {
        match self {
            ArtifactKind::Entity => TemplateKind::Entity,
            ArtifactKind::Declaration => TemplateKind::Mapper,
            ArtifactKind::Mapping => TemplateKind::Xml,
        }
    }

    /// Path of the artifact relative to the output root
    pub fn relative_path(&self, package_name: &str, class_name: &str) -> PathBuf {
        let java_dir = Path::new(JAVA_SOURCE_ROOT).join(package_to_path(package_name));
        match self {
            ArtifactKind::Entity => java_dir.join("entity").join(format!("{}.java", class_name)),
            ArtifactKind::Declaration => java_dir
                .join("mapper")
                .join(format!("{}.java", to_mapper_name(class_name))),
            ArtifactKind::Mapping => {
                Path::new(MAPPER_RESOURCE_DIR).join(format!("{}.xml", to_mapper_name(class_name)))
            }
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArtifactKind::Entity => "entity",
            ArtifactKind::Declaration => "declaration",
            ArtifactKind::Mapping => "mapping",
        })
    }
}

/// One rendered artifact, not yet written
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    pub table_name: String,
    /// Absolute (output-root joined) destination
    pub path: PathBuf,
    pub content: String,
}

impl GeneratedArtifact {
    /// Write the artifact, creating parent directories as needed
    pub fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, &self.content)?;
        debug!("Wrote {} artifact {}", self.kind, self.path.display());
        Ok(())
    }
}
