use super::pdb::PdbError;
use super::spheres::SphereFileError;
use crate::core::models::atom::AtomSet;
use nalgebra::Matrix4;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructureLoadError {
    #[error("No structure data found for '{id}'")]
    NotFound { id: String },
    #[error("Failed to read PDB file '{path}': {source}")]
    Pdb {
        path: PathBuf,
        #[source]
        source: PdbError,
    },
    #[error("Failed to read sphere file '{path}': {source}")]
    Spheres {
        path: PathBuf,
        #[source]
        source: SphereFileError,
    },
}

/// Resolves structure ids to atomic geometry and biological symmetry.
///
/// Atoms are returned in the engine convention (X already negated). Symmetry
/// matrices stay in the editor convention; the resolver converts them.
pub trait StructureSource {
    fn load_atoms(&self, id: &str) -> Result<AtomSet, StructureLoadError>;

    /// Biological-assembly transforms for `id`. An empty list means the
    /// structure declares none.
    fn load_symmetry_transforms(&self, id: &str) -> Result<Vec<Matrix4<f64>>, StructureLoadError>;
}

impl<S: StructureSource + ?Sized> StructureSource for &S {
    fn load_atoms(&self, id: &str) -> Result<AtomSet, StructureLoadError> {
        (**self).load_atoms(id)
    }

    fn load_symmetry_transforms(&self, id: &str) -> Result<Vec<Matrix4<f64>>, StructureLoadError> {
        (**self).load_symmetry_transforms(id)
    }
}

#[derive(Debug, Clone, Default)]
struct StoredStructure {
    atoms: AtomSet,
    transforms: Vec<Matrix4<f64>>,
}

/// Structure source backed by a map, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStructures {
    structures: HashMap<String, StoredStructure>,
}

impl InMemoryStructures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, atoms: AtomSet) -> &mut Self {
        self.structures.entry(id.to_string()).or_default().atoms = atoms;
        self
    }

    pub fn insert_with_symmetry(
        &mut self,
        id: &str,
        atoms: AtomSet,
        transforms: Vec<Matrix4<f64>>,
    ) -> &mut Self {
        self.structures
            .insert(id.to_string(), StoredStructure { atoms, transforms });
        self
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    fn get(&self, id: &str) -> Result<&StoredStructure, StructureLoadError> {
        self.structures
            .get(id)
            .ok_or_else(|| StructureLoadError::NotFound { id: id.to_string() })
    }
}

impl StructureSource for InMemoryStructures {
    fn load_atoms(&self, id: &str) -> Result<AtomSet, StructureLoadError> {
        Ok(self.get(id)?.atoms.clone())
    }

    fn load_symmetry_transforms(&self, id: &str) -> Result<Vec<Matrix4<f64>>, StructureLoadError> {
        Ok(self.get(id)?.transforms.clone())
    }
}
