//! JSON rendering of a loaded scene.

use cellscene::engine::store::SceneStore;
use cellscene::workflows::load::LoadSummary;
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct SceneDocument {
    pub summary: SummaryRecord,
    pub buckets: Vec<BucketRecord>,
    /// Accent hues of the scene, channels in `[0, 1]`.
    pub hue_series: Vec<[f64; 3]>,
    pub structures: Vec<StructureRecord>,
    pub curves: Vec<CurveRecord>,
}

#[derive(Serialize, Debug)]
pub struct SummaryRecord {
    pub structures: usize,
    pub instances: usize,
    pub curve_structures: usize,
    pub curve_instances: usize,
    pub total_atoms: usize,
    pub skipped_ingredients: usize,
    pub issues: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct BucketRecord {
    pub id: usize,
    pub kind: String,
    pub label: String,
    pub base_color: [f64; 3],
}

#[derive(Serialize, Debug)]
pub struct StructureRecord {
    pub path: String,
    pub color: [f64; 3],
    pub bounds_center: [f64; 3],
    pub bounds_radius: f64,
    pub decimation_levels: [f64; 3],
    pub single_resolution: bool,
    pub atom_count: usize,
    /// `[x, y, z, radius]` per atom, relative to the structure center.
    pub atoms: Vec<[f64; 4]>,
    pub instances: Vec<InstanceRecord>,
}

#[derive(Serialize, Debug)]
pub struct InstanceRecord {
    pub position: [f64; 3],
    /// Unit quaternion as `[x, y, z, w]`.
    pub rotation: [f64; 4],
}

#[derive(Serialize, Debug)]
pub struct CurveRecord {
    pub path: String,
    pub label: String,
    pub curves: Vec<Vec<[f64; 4]>>,
}

impl SceneDocument {
    pub fn new(store: &SceneStore, summary: &LoadSummary) -> Self {
        let structures = store
            .structures_iter()
            .map(|(id, def)| StructureRecord {
                path: def.path.clone(),
                color: def.color.to_array(),
                bounds_center: def.bounds.center.coords.into(),
                bounds_radius: def.bounds.radius,
                decimation_levels: *def.decimation_levels.levels(),
                single_resolution: def.single_resolution,
                atom_count: def.atom_count(),
                atoms: def
                    .atom_spheres
                    .iter()
                    .map(|a| [a.center.x, a.center.y, a.center.z, a.radius])
                    .collect(),
                instances: store
                    .instances(id)
                    .iter()
                    .map(|i| {
                        let q = i.rotation.coords;
                        InstanceRecord {
                            position: i.position.coords.into(),
                            rotation: [q.x, q.y, q.z, q.w],
                        }
                    })
                    .collect(),
            })
            .collect();

        let curves = store
            .curve_structures_iter()
            .map(|c| CurveRecord {
                path: c.path.clone(),
                label: c.label.clone(),
                curves: c
                    .curves
                    .iter()
                    .map(|points| points.iter().map(|p| (*p).into()).collect())
                    .collect(),
            })
            .collect();

        Self {
            summary: SummaryRecord {
                structures: summary.structures,
                instances: summary.instances,
                curve_structures: summary.curve_structures,
                curve_instances: summary.curve_instances,
                total_atoms: summary.total_atoms,
                skipped_ingredients: summary.ingredients_skipped,
                issues: summary.issues.iter().map(ToString::to_string).collect(),
            },
            buckets: summary
                .buckets
                .iter()
                .map(|b| BucketRecord {
                    id: b.id,
                    kind: b.kind.to_string(),
                    label: b.label.clone(),
                    base_color: b.base_color.to_array(),
                })
                .collect(),
            hue_series: summary.hue_series.iter().map(|c| c.to_array()).collect(),
            structures,
            curves,
        }
    }
}
