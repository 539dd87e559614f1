use super::error::IngredientIssue;
use super::resolver::{IngredientReport, IngredientResolver, IngredientStatus};
use super::sink::SceneSink;
use crate::core::io::StructureSource;
use crate::core::models::instance::CurveInstance;
use crate::core::recipe::CurveIngredient;
use crate::core::utils::geometry::convert_editor_position_to_engine;
use nalgebra::Vector4;
use tracing::{debug, warn};

/// Fewest control points a curve needs for the downstream spline.
pub const MIN_CURVE_POINTS: usize = 4;

/// Homogeneous engine-convention control points for one editor-convention curve.
pub fn control_points(points: &[[f64; 3]]) -> Vec<Vector4<f64>> {
    points
        .iter()
        .map(|p| {
            let e = convert_editor_position_to_engine(*p);
            Vector4::new(e.x, e.y, e.z, 1.0)
        })
        .collect()
}

impl<S: StructureSource + ?Sized, K: SceneSink + ?Sized> IngredientResolver<'_, S, K> {
    /// Emits the curves of a curve ingredient. The structure id is only used
    /// as a label; no geometry is loaded.
    pub fn resolve_curve(&mut self, path: &str, ingredient: &CurveIngredient) -> IngredientReport {
        let first_reference = self.context.register_curve_path(path);
        if first_reference {
            self.sink
                .register_curve_structure(path, &ingredient.source.structure_id);
        }

        let mut issues = Vec::new();
        let mut emitted = 0;
        for index in 0..ingredient.curve_count {
            let points = ingredient.curves.get(index).map_or(&[][..], Vec::as_slice);
            if points.len() < MIN_CURVE_POINTS {
                let issue = IngredientIssue::InsufficientCurveData {
                    path: path.to_string(),
                    curve_index: index,
                    points: points.len(),
                    required: MIN_CURVE_POINTS,
                };
                warn!("{issue}");
                issues.push(issue);
                continue;
            }
            self.sink.add_curve_instance(CurveInstance {
                structure_path: path.to_string(),
                control_points: control_points(points),
            });
            emitted += 1;
        }
        debug!(path, curves = emitted, "Curve ingredient processed.");

        IngredientReport {
            path: path.to_string(),
            status: if first_reference {
                IngredientStatus::Resolved
            } else {
                IngredientStatus::Reused
            },
            atom_count: 0,
            instance_count: emitted,
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::InMemoryStructures;
    use crate::core::recipe::IngredientSource;
    use crate::engine::bucket::BucketKind;
    use crate::engine::config::LoadConfigBuilder;
    use crate::engine::context::LoadContext;
    use crate::engine::store::SceneStore;

    const PATH: &str = "root.cytoplasme.RNA";

    fn curve(points: usize) -> Vec<[f64; 3]> {
        (0..points).map(|i| [i as f64, 2.0 * i as f64, 1.0]).collect()
    }

    fn ingredient(curves: Vec<Vec<[f64; 3]>>, curve_count: usize) -> CurveIngredient {
        CurveIngredient {
            name: "RNA".into(),
            source: IngredientSource {
                structure_id: "RNA_strand".into(),
                ..Default::default()
            },
            curve_count,
            curves,
        }
    }

    fn run(store: &mut SceneStore, entries: &[CurveIngredient]) -> Vec<IngredientReport> {
        let source = InMemoryStructures::new();
        let context = LoadContext::new(&LoadConfigBuilder::new().seed(1).build().unwrap()).unwrap();
        let mut resolver = IngredientResolver::new(&source, store, context);
        resolver.begin_bucket(BucketKind::Cytoplasm, "root.cytoplasme");
        entries
            .iter()
            .map(|entry| resolver.resolve_curve(PATH, entry))
            .collect()
    }

    #[test]
    fn five_point_curve_yields_one_instance() {
        let mut store = SceneStore::new();
        let reports = run(&mut store, &[ingredient(vec![curve(5)], 1)]);

        assert_eq!(reports[0].instance_count, 1);
        assert!(reports[0].issues.is_empty());
        let stored = store.curve_structure(PATH).unwrap();
        assert_eq!(stored.label, "RNA_strand");
        assert_eq!(stored.curves.len(), 1);
        assert_eq!(stored.curves[0].len(), 5);
        assert_eq!(stored.curves[0][2], Vector4::new(-2.0, 4.0, 1.0, 1.0));
    }

    #[test]
    fn three_point_curve_is_skipped() {
        let mut store = SceneStore::new();
        let reports = run(&mut store, &[ingredient(vec![curve(3)], 1)]);

        assert_eq!(reports[0].instance_count, 0);
        assert!(matches!(
            &reports[0].issues[..],
            [IngredientIssue::InsufficientCurveData { points: 3, curve_index: 0, .. }]
        ));
        assert_eq!(store.curve_instance_count(), 0);
    }

    #[test]
    fn missing_curves_are_skipped_and_others_kept() {
        let mut store = SceneStore::new();
        let reports = run(&mut store, &[ingredient(vec![curve(4), Vec::new(), curve(6)], 3)]);
        assert_eq!(reports[0].instance_count, 2);
        assert_eq!(reports[0].issues.len(), 1);
    }

    #[test]
    fn repeated_curve_paths_register_once() {
        let mut store = SceneStore::new();
        let entry = ingredient(vec![curve(4)], 1);
        let reports = run(&mut store, &[entry.clone(), entry]);
        assert_eq!(reports[0].status, IngredientStatus::Resolved);
        assert_eq!(reports[1].status, IngredientStatus::Reused);
        assert_eq!(store.curve_structure_count(), 1);
        assert_eq!(store.curve_instance_count(), 2);
    }

    #[test]
    fn control_points_are_mirrored_and_homogeneous() {
        let points = control_points(&[[1.0, 2.0, 3.0]]);
        assert_eq!(points, vec![Vector4::new(-1.0, 2.0, 3.0, 1.0)]);
    }
}
