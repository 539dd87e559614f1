use super::pdb::{PdbFile, PdbStructure};
use super::source::{StructureLoadError, StructureSource};
use super::spheres::SphereFile;
use super::traits::StructureFile;
use crate::core::models::atom::AtomSet;
use nalgebra::Matrix4;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads structures from a directory of `<id>.pdb` files, falling back to
/// pre-decimated `<id>.bin` sphere files.
///
/// The BIOMT transforms read alongside the atoms of a PDB file are held until
/// the next symmetry request for the same id, so a symmetric ingredient reads
/// its file once.
#[derive(Debug, Clone)]
pub struct StructureDirectory {
    root: PathBuf,
    pending_transforms: RefCell<Option<(String, Vec<Matrix4<f64>>)>>,
}

enum Located {
    Pdb(PathBuf),
    Spheres(PathBuf),
}

impl StructureDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pending_transforms: RefCell::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, id: &str) -> Result<Located, StructureLoadError> {
        let lower = id.to_ascii_lowercase();
        for stem in [id, lower.as_str()] {
            let pdb = self.root.join(format!("{stem}.pdb"));
            if pdb.is_file() {
                return Ok(Located::Pdb(pdb));
            }
        }
        for stem in [id, lower.as_str()] {
            let bin = self.root.join(format!("{stem}.bin"));
            if bin.is_file() {
                return Ok(Located::Spheres(bin));
            }
        }
        Err(StructureLoadError::NotFound { id: id.to_string() })
    }

    fn read_pdb(path: PathBuf) -> Result<PdbStructure, StructureLoadError> {
        debug!(path = %path.display(), "Reading PDB file");
        PdbFile::read_from_path(&path).map_err(|source| StructureLoadError::Pdb { path, source })
    }
}

impl StructureSource for StructureDirectory {
    fn load_atoms(&self, id: &str) -> Result<AtomSet, StructureLoadError> {
        match self.locate(id)? {
            Located::Pdb(path) => {
                let structure = Self::read_pdb(path)?;
                self.pending_transforms
                    .replace(Some((id.to_string(), structure.biomt)));
                Ok(AtomSet::new(structure.atoms))
            }
            Located::Spheres(path) => {
                debug!(path = %path.display(), "Reading sphere file");
                SphereFile::read_from_path(&path)
                    .map_err(|source| StructureLoadError::Spheres { path, source })
            }
        }
    }

    fn load_symmetry_transforms(&self, id: &str) -> Result<Vec<Matrix4<f64>>, StructureLoadError> {
        if let Some((pending_id, transforms)) = self.pending_transforms.take() {
            if pending_id == id {
                return Ok(transforms);
            }
        }
        match self.locate(id)? {
            Located::Pdb(path) => Ok(Self::read_pdb(path)?.biomt),
            Located::Spheres(_) => Ok(Vec::new()),
        }
    }
}
