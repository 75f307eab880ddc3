//! Cross-references between mapper declarations and mapping documents
//!
//! A declaration `UserMapper.java` pairs with the mapping document
//! `UserMapper.xml`: same base name, different extension. The resolver finds
//! the paired file in a workspace and the member (method or statement `id`)
//! inside it. [`scaffold_statement`] adds a stub for a declared method that
//! has no statement yet.

mod resolver;
mod scaffold;
mod syntax;
mod workspace;

pub use resolver::*;
pub use scaffold::*;
pub use syntax::*;
pub use workspace::*;
