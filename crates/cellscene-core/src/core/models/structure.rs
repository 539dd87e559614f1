use super::atom::AtomSphere;
use crate::core::color::Rgb;
use nalgebra::Point3;

/// A sphere enclosing every atom sphere of a structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3<f64>,
    pub radius: f64,
}

/// Fractions of atoms retained at the three level-of-detail tiers.
///
/// Every level lies in `(0, 1]`; the tiers are conventionally decreasing but
/// nothing downstream depends on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecimationLevels(pub [f64; 3]);

impl DecimationLevels {
    /// Coarse tiers for structures sampled at one point per residue.
    pub const ALPHA_CARBON: Self = Self([0.85, 0.25, 0.10]);
    /// Fine tiers for all-atom structures.
    pub const ALL_ATOM: Self = Self([0.15, 0.10, 0.05]);
    /// No decimation at all.
    pub const SINGLE_RESOLUTION: Self = Self([1.0, 1.0, 1.0]);

    /// Selects the tier set for a structure. Single-resolution sources win over
    /// the alpha-carbon classification.
    pub fn for_structure(alpha_carbon_only: bool, single_resolution: bool) -> Self {
        if single_resolution {
            Self::SINGLE_RESOLUTION
        } else if alpha_carbon_only {
            Self::ALPHA_CARBON
        } else {
            Self::ALL_ATOM
        }
    }

    pub fn levels(&self) -> &[f64; 3] {
        &self.0
    }
}

/// The shared, immutable description of one ingredient's geometry.
///
/// Created once per distinct ingredient path and referenced by every
/// [`PlacedInstance`](super::instance::PlacedInstance) of that path.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureDefinition {
    /// Dotted ingredient path, e.g. `root.HIV1_envelope.surface.gp120`.
    pub path: String,
    /// Bounds of the recentered atoms.
    pub bounds: BoundingSphere,
    /// Atom spheres recentered around the raw bounding-sphere center.
    pub atom_spheres: Vec<AtomSphere>,
    /// Display color with channels in `[0, 1]`.
    pub color: Rgb,
    pub decimation_levels: DecimationLevels,
    pub single_resolution: bool,
}

impl StructureDefinition {
    pub fn atom_count(&self) -> usize {
        self.atom_spheres.len()
    }
}
