/// Prefix of structure ids that denote density maps rather than atomic models.
pub const DENSITY_MAP_PREFIX: &str = "EMDB";

/// A fully validated scene recipe. Immutable once parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recipe {
    pub cytoplasm: Option<IngredientBlock>,
    /// Compartments in document order.
    pub compartments: Vec<Compartment>,
}

impl Recipe {
    /// Total number of ingredient entries across every block.
    pub fn ingredient_count(&self) -> usize {
        let cytoplasm = self.cytoplasm.as_ref().map_or(0, IngredientBlock::len);
        let compartments: usize = self
            .compartments
            .iter()
            .map(|c| c.interior.len() + c.surface.len())
            .sum();
        cytoplasm + compartments
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compartment {
    pub name: String,
    pub interior: IngredientBlock,
    pub surface: IngredientBlock,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientBlock {
    pub ingredients: Vec<IngredientEntry>,
}

impl IngredientBlock {
    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngredientEntry {
    Particle(ParticleIngredient),
    Curve(CurveIngredient),
}

impl IngredientEntry {
    pub fn name(&self) -> &str {
        match self {
            IngredientEntry::Particle(p) => &p.name,
            IngredientEntry::Curve(c) => &c.name,
        }
    }

    pub fn source(&self) -> &IngredientSource {
        match self {
            IngredientEntry::Particle(p) => &p.source,
            IngredientEntry::Curve(c) => &c.source,
        }
    }
}

/// What a structure id refers to once normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureRef<'a> {
    /// Empty id or a `None`/`null` sentinel.
    Missing,
    /// A density map, which has no atomic geometry.
    DensityMap(&'a str),
    /// An atomic model that a structure source can resolve.
    Atomic(&'a str),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientSource {
    /// Structure id with any `.pdb` suffix removed.
    pub structure_id: String,
    /// Expand every placement by the structure's biological symmetry transforms.
    pub use_symmetry: bool,
    /// Placements already refer to the structure's own center.
    pub center_on_load: bool,
}

impl IngredientSource {
    pub fn structure_ref(&self) -> StructureRef<'_> {
        let id = self.structure_id.as_str();
        if id.is_empty() || id.eq_ignore_ascii_case("none") || id.eq_ignore_ascii_case("null") {
            StructureRef::Missing
        } else if id.starts_with(DENSITY_MAP_PREFIX) {
            StructureRef::DensityMap(id)
        } else {
            StructureRef::Atomic(id)
        }
    }
}

/// One placement row in the editor convention: `position` is `[x, y, z]`,
/// `rotation` is a quaternion stored as `[x, y, z, w]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: [f64; 3],
    pub rotation: [f64; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleIngredient {
    pub name: String,
    pub source: IngredientSource,
    pub results: Vec<Placement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurveIngredient {
    pub name: String,
    pub source: IngredientSource,
    /// Declared number of curves (`nbCurve`).
    pub curve_count: usize,
    /// Control points per curve index; a curve missing from the document is empty.
    pub curves: Vec<Vec<[f64; 3]>>,
}
