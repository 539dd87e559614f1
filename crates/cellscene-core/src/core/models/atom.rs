use nalgebra::Point3;

/// Atom name that marks a residue-level (alpha-carbon) sample.
pub const ALPHA_CARBON_NAME: &str = "CA";

/// A single atom reduced to the sphere used for rendering and bounds.
///
/// The radius is never negative; constructors clamp it to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomSphere {
    /// The sphere center in Angstroms.
    pub center: Point3<f64>,
    /// The sphere radius in Angstroms.
    pub radius: f64,
}

impl AtomSphere {
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }
}

/// An atom as delivered by a structure source, before it is reduced to a sphere.
///
/// Positions are already expressed in the engine convention (X mirrored).
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAtom {
    /// The atom name (e.g., "CA", "N", "OG1").
    pub name: String,
    /// The atom center in Angstroms.
    pub position: Point3<f64>,
    /// The van der Waals radius in Angstroms.
    pub radius: f64,
}

impl LoadedAtom {
    pub fn new(name: &str, position: Point3<f64>, radius: f64) -> Self {
        Self {
            name: name.to_string(),
            position,
            radius,
        }
    }
}

/// The full atom list of one structure together with its resolution metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomSet {
    pub atoms: Vec<LoadedAtom>,
    /// Set when the source carries only one level of detail, which disables decimation.
    pub single_resolution: bool,
}

impl AtomSet {
    pub fn new(atoms: Vec<LoadedAtom>) -> Self {
        Self {
            atoms,
            single_resolution: false,
        }
    }

    pub fn with_single_resolution(mut self, single_resolution: bool) -> Self {
        self.single_resolution = single_resolution;
        self
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Returns `true` when every atom is an alpha carbon, i.e. the structure is
    /// sampled at one point per residue. An empty set is not alpha-carbon-only.
    pub fn is_alpha_carbon_only(&self) -> bool {
        !self.atoms.is_empty()
            && self
                .atoms
                .iter()
                .all(|atom| atom.name.trim() == ALPHA_CARBON_NAME)
    }

    pub fn spheres(&self) -> Vec<AtomSphere> {
        self.atoms
            .iter()
            .map(|atom| AtomSphere::new(atom.position, atom.radius))
            .collect()
    }
}
