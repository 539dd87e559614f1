use super::traits::StructureFile;
use crate::core::models::atom::{ALPHA_CARBON_NAME, AtomSet, LoadedAtom};
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;

/// Bytes per packed record: four little-endian `f32` values `(x, y, z, r)`.
pub const RECORD_SIZE: usize = 16;

#[derive(Debug, Error)]
pub enum SphereFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Sphere file length {len} is not a multiple of 16 bytes")]
    TruncatedRecord { len: usize },
}

/// Pre-decimated sphere file.
///
/// Such files carry a single coarse representation of the structure, so the
/// resulting set is flagged single-resolution and every sphere is named as an
/// alpha carbon. Coordinates are stored in the engine convention already.
pub struct SphereFile;

impl StructureFile for SphereFile {
    type Output = AtomSet;
    type Error = SphereFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<AtomSet, SphereFileError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        if bytes.len() % RECORD_SIZE != 0 {
            return Err(SphereFileError::TruncatedRecord { len: bytes.len() });
        }

        let atoms = bytes
            .chunks_exact(RECORD_SIZE)
            .map(|record| {
                let mut values = [0.0f32; 4];
                for (value, raw) in values.iter_mut().zip(record.chunks_exact(4)) {
                    *value = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
                }
                let [x, y, z, r] = values.map(f64::from);
                LoadedAtom::new(ALPHA_CARBON_NAME, Point3::new(x, y, z), r)
            })
            .collect();

        Ok(AtomSet::new(atoms).with_single_resolution(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(spheres: &[[f32; 4]]) -> Vec<u8> {
        spheres
            .iter()
            .flat_map(|s| s.iter().flat_map(|v| v.to_le_bytes()))
            .collect()
    }

    #[test]
    fn decodes_packed_spheres_as_single_resolution_alpha_carbons() {
        let bytes = encode(&[[1.0, 2.0, 3.0, 4.5], [-1.0, 0.0, 0.5, 2.0]]);
        let set = SphereFile::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.single_resolution);
        assert!(set.is_alpha_carbon_only());
        assert_eq!(set.atoms[0].position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(set.atoms[0].radius, 4.5);
        assert_eq!(set.atoms[1].position, Point3::new(-1.0, 0.0, 0.5));
    }

    #[test]
    fn empty_file_yields_empty_set() {
        let set = SphereFile::read_from(&mut Cursor::new(Vec::new())).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn truncated_file_is_rejected() {
        let mut bytes = encode(&[[1.0, 2.0, 3.0, 4.0]]);
        bytes.pop();
        assert!(matches!(
            SphereFile::read_from(&mut Cursor::new(bytes)),
            Err(SphereFileError::TruncatedRecord { len: 15 })
        ));
    }
}
