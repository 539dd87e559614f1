//! Provides input functionality for the structure files a recipe refers to.
//!
//! Structures are resolved through the [`StructureSource`] trait. The
//! [`StructureDirectory`] implementation reads PDB files (atoms plus
//! REMARK 350 biological-assembly transforms) and falls back to packed sphere
//! files for structures that only ship a coarse representation.

pub mod directory;
pub mod pdb;
pub mod radii;
pub mod source;
pub mod spheres;
pub mod traits;

pub use directory::StructureDirectory;
pub use source::{InMemoryStructures, StructureLoadError, StructureSource};
pub use traits::StructureFile;
