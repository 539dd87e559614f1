use super::bucket::{BucketDescriptor, BucketKind};
use super::context::{LoadContext, ResolvedStructure};
use super::error::{EngineError, IngredientIssue};
use super::sink::SceneSink;
use crate::core::io::StructureSource;
use crate::core::models::instance::PlacedInstance;
use crate::core::models::structure::{DecimationLevels, StructureDefinition};
use crate::core::recipe::{ParticleIngredient, StructureRef};
use crate::core::utils::geometry::{
    SymmetryExpansion, compute_bounding_sphere, convert_editor_position_to_engine,
    convert_editor_quaternion_to_engine, offset_atoms, transform_point,
};
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngredientStatus {
    /// Geometry was resolved and registered by this entry.
    Resolved,
    /// The path was already registered; only instances were added.
    Reused,
    /// Nothing was emitted.
    Skipped,
}

/// Outcome of resolving one ingredient entry.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientReport {
    pub path: String,
    pub status: IngredientStatus,
    /// Atoms in one copy of the structure.
    pub atom_count: usize,
    /// Instances (or curves) emitted by this entry.
    pub instance_count: usize,
    pub issues: Vec<IngredientIssue>,
}

impl IngredientReport {
    pub(crate) fn skipped(path: &str, issue: Option<IngredientIssue>) -> Self {
        Self {
            path: path.to_string(),
            status: IngredientStatus::Skipped,
            atom_count: 0,
            instance_count: 0,
            issues: issue.into_iter().collect(),
        }
    }
}

/// Resolves ingredient entries against a structure source and pushes the
/// results into a sink.
///
/// Owns the [`LoadContext`] of the load it serves.
pub struct IngredientResolver<'a, S: StructureSource + ?Sized, K: SceneSink + ?Sized> {
    pub(crate) source: &'a S,
    pub(crate) sink: &'a mut K,
    pub(crate) context: LoadContext,
}

impl<'a, S: StructureSource + ?Sized, K: SceneSink + ?Sized> IngredientResolver<'a, S, K> {
    pub fn new(source: &'a S, sink: &'a mut K, context: LoadContext) -> Self {
        Self {
            source,
            sink,
            context,
        }
    }

    pub fn context(&self) -> &LoadContext {
        &self.context
    }

    pub fn into_context(self) -> LoadContext {
        self.context
    }

    /// Opens a new color bucket and announces it to the sink.
    pub fn begin_bucket(&mut self, kind: BucketKind, label: &str) -> BucketDescriptor {
        let descriptor = self.context.open_bucket(kind, label).clone();
        self.sink.begin_bucket(&descriptor);
        descriptor
    }

    /// Resolves one particle ingredient registered under `path`.
    ///
    /// Unusable sources are reported as skips. Only internal failures are
    /// returned as errors.
    pub fn resolve_particle(
        &mut self,
        path: &str,
        ingredient: &ParticleIngredient,
    ) -> Result<IngredientReport, EngineError> {
        if let Some(cached) = self.context.structure(path) {
            debug!(path, "Path already resolved; reusing its structure.");
            let atom_count = cached.atom_count;
            let placed = emit_instances(&mut *self.sink, path, cached, ingredient);
            let total = self.context.add_instances(path, placed);
            self.sink.finalize_counts(path, atom_count, total);
            return Ok(IngredientReport {
                path: path.to_string(),
                status: IngredientStatus::Reused,
                atom_count,
                instance_count: placed,
                issues: Vec::new(),
            });
        }

        let source = &ingredient.source;
        let id = match source.structure_ref() {
            StructureRef::Missing => {
                debug!(path, "Ingredient has no structure; skipping.");
                return Ok(IngredientReport::skipped(path, None));
            }
            StructureRef::DensityMap(id) => {
                info!(path, id, "Density-map ingredients carry no atoms; skipping.");
                return Ok(IngredientReport::skipped(path, None));
            }
            StructureRef::Atomic(id) => id,
        };

        let atoms = match self.source.load_atoms(id) {
            Ok(atoms) => atoms,
            Err(err) => return Ok(self.unresolvable(path, id, err.to_string())),
        };
        if atoms.is_empty() {
            let issue = IngredientIssue::EmptyGeometry {
                path: path.to_string(),
                structure_id: id.to_string(),
            };
            warn!("{issue}");
            return Ok(IngredientReport::skipped(path, Some(issue)));
        }

        let geometry_error = |source| EngineError::Geometry {
            path: path.to_string(),
            source,
        };
        let spheres = atoms.spheres();
        let raw_bounds = compute_bounding_sphere(&spheres).map_err(geometry_error)?;
        let centered = offset_atoms(&spheres, &raw_bounds.center.coords);
        let bounds = compute_bounding_sphere(&centered).map_err(geometry_error)?;
        trace!(path, center = ?raw_bounds.center, radius = bounds.radius, "Structure recentered.");

        let symmetry = if source.use_symmetry {
            let transforms = match self.source.load_symmetry_transforms(id) {
                Ok(transforms) => transforms,
                Err(err) => return Ok(self.unresolvable(path, id, err.to_string())),
            };
            if transforms.is_empty() {
                warn!(path, id, "Symmetry requested but the structure declares no transforms; no instances will be placed.");
            }
            Some(SymmetryExpansion::new(&transforms, &raw_bounds.center.coords))
        } else {
            None
        };

        let mut issues = Vec::new();
        let (color, draw, bucket) = self.context.draw_color()?;
        if draw.reused {
            let issue = IngredientIssue::ExhaustedPalette {
                path: path.to_string(),
                bucket,
                reused_index: draw.index,
            };
            warn!("{issue}");
            issues.push(issue);
        }

        let atom_count = centered.len();
        self.sink.register_structure(StructureDefinition {
            path: path.to_string(),
            bounds,
            atom_spheres: centered,
            color,
            decimation_levels: DecimationLevels::for_structure(
                atoms.is_alpha_carbon_only(),
                atoms.single_resolution,
            ),
            single_resolution: atoms.single_resolution,
        });

        let resolved = ResolvedStructure {
            raw_bounds,
            symmetry,
            atom_count,
            instance_count: 0,
        };
        let placed = emit_instances(&mut *self.sink, path, &resolved, ingredient);
        self.context.record_structure(path, resolved);
        let total = self.context.add_instances(path, placed);
        self.sink.finalize_counts(path, atom_count, total);

        info!(path, atoms = atom_count, instances = placed, "Ingredient resolved.");
        Ok(IngredientReport {
            path: path.to_string(),
            status: IngredientStatus::Resolved,
            atom_count,
            instance_count: placed,
            issues,
        })
    }

    fn unresolvable(&self, path: &str, id: &str, reason: String) -> IngredientReport {
        let issue = IngredientIssue::UnresolvableStructure {
            path: path.to_string(),
            structure_id: id.to_string(),
            reason,
        };
        warn!("{issue}");
        IngredientReport::skipped(path, Some(issue))
    }
}

/// Places every result row of `ingredient` and returns the number of instances.
fn emit_instances<K: SceneSink + ?Sized>(
    sink: &mut K,
    path: &str,
    resolved: &ResolvedStructure,
    ingredient: &ParticleIngredient,
) -> usize {
    let raw_center = resolved.raw_bounds.center.coords;
    let mut placed = 0;
    for placement in &ingredient.results {
        let position = convert_editor_position_to_engine(placement.position);
        let rotation = convert_editor_quaternion_to_engine(placement.rotation);

        match &resolved.symmetry {
            None => {
                let position = if ingredient.source.center_on_load {
                    position
                } else {
                    position + transform_point(&rotation, &raw_center)
                };
                sink.add_instance(PlacedInstance::new(path, position, rotation));
                placed += 1;
            }
            Some(expansion) => {
                for (position, rotation) in expansion.expand(&position, &rotation) {
                    sink.add_instance(PlacedInstance::new(path, position, rotation));
                    placed += 1;
                }
            }
        }
    }
    placed
}
