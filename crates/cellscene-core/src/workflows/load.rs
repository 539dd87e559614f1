use crate::core::color::Rgb;
use crate::core::io::StructureSource;
use crate::core::recipe::{IngredientBlock, IngredientEntry, Recipe};
use crate::engine::bucket::{BucketDescriptor, BucketKind};
use crate::engine::config::LoadConfig;
use crate::engine::context::LoadContext;
use crate::engine::error::{EngineError, IngredientIssue};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::resolver::{IngredientReport, IngredientResolver, IngredientStatus};
use crate::engine::sink::SceneSink;
use tracing::{info, instrument};

/// Root segment of every ingredient path.
pub const ROOT_SEGMENT: &str = "root";

/// Totals of one recipe load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub ingredients_seen: usize,
    pub ingredients_skipped: usize,
    pub structures: usize,
    pub instances: usize,
    pub curve_structures: usize,
    pub curve_instances: usize,
    /// Atoms summed over every placed instance.
    pub total_atoms: usize,
    pub buckets: Vec<BucketDescriptor>,
    /// Accent hues of the load, channels in `[0, 1]`.
    pub hue_series: Vec<Rgb>,
    pub issues: Vec<IngredientIssue>,
}

impl LoadSummary {
    fn record(&mut self, report: IngredientReport, is_curve: bool) {
        self.ingredients_seen += 1;
        match (report.status, is_curve) {
            (IngredientStatus::Skipped, _) => self.ingredients_skipped += 1,
            (IngredientStatus::Resolved, false) => self.structures += 1,
            (IngredientStatus::Resolved, true) => self.curve_structures += 1,
            (IngredientStatus::Reused, _) => {}
        }
        if is_curve {
            self.curve_instances += report.instance_count;
        } else {
            self.instances += report.instance_count;
            self.total_atoms += report.atom_count * report.instance_count;
        }
        self.issues.extend(report.issues);
    }
}

/// Path of an ingredient in the cytoplasm block.
pub fn cytoplasm_path(name: &str) -> String {
    format!("{ROOT_SEGMENT}.{}.{name}", BucketKind::Cytoplasm.path_segment())
}

/// Path of an ingredient in a compartment's interior or surface block.
pub fn compartment_path(compartment: &str, kind: BucketKind, name: &str) -> String {
    format!("{ROOT_SEGMENT}.{compartment}.{}.{name}", kind.path_segment())
}

/// Walks `recipe` in document order and pushes every resolved structure,
/// instance and curve into `sink`.
///
/// The cytoplasm (if present) is walked first, then each compartment's
/// interior followed by its surface. Each of these blocks is one color bucket.
/// Problems with individual ingredients are collected in the returned summary;
/// only configuration and internal failures abort the load.
#[instrument(skip_all, name = "load_workflow")]
pub fn run<S, K>(
    recipe: &Recipe,
    source: &S,
    sink: &mut K,
    config: &LoadConfig,
    reporter: &ProgressReporter,
) -> Result<LoadSummary, EngineError>
where
    S: StructureSource + ?Sized,
    K: SceneSink + ?Sized,
{
    // === Phase 0: Preparation ===
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    let context = LoadContext::new(config)?;
    let total = recipe.ingredient_count();
    info!(
        ingredients = total,
        compartments = recipe.compartments.len(),
        "Starting recipe load."
    );
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Resolve ingredients ===
    reporter.report(Progress::PhaseStart {
        name: "Resolving Ingredients",
    });
    reporter.report(Progress::TaskStart {
        total_steps: total as u64,
    });

    let mut resolver = IngredientResolver::new(source, sink, context);
    let mut summary = LoadSummary::default();

    if let Some(cytoplasm) = &recipe.cytoplasm {
        let label = format!("{ROOT_SEGMENT}.{}", BucketKind::Cytoplasm.path_segment());
        walk_block(
            &mut resolver,
            &mut summary,
            reporter,
            BucketKind::Cytoplasm,
            &label,
            cytoplasm,
            cytoplasm_path,
        )?;
    }

    for compartment in &recipe.compartments {
        for (kind, block) in [
            (BucketKind::Interior, &compartment.interior),
            (BucketKind::Surface, &compartment.surface),
        ] {
            let label = format!("{ROOT_SEGMENT}.{}.{}", compartment.name, kind.path_segment());
            walk_block(
                &mut resolver,
                &mut summary,
                reporter,
                kind,
                &label,
                block,
                |name| compartment_path(&compartment.name, kind, name),
            )?;
        }
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let context = resolver.into_context();
    summary.buckets = context.bucket_descriptors();
    summary.hue_series = context.hue_series().to_vec();

    info!(
        structures = summary.structures,
        instances = summary.instances,
        curves = summary.curve_instances,
        atoms = summary.total_atoms,
        issues = summary.issues.len(),
        "Recipe load complete."
    );
    Ok(summary)
}

fn walk_block<S, K>(
    resolver: &mut IngredientResolver<'_, S, K>,
    summary: &mut LoadSummary,
    reporter: &ProgressReporter,
    kind: BucketKind,
    label: &str,
    block: &IngredientBlock,
    path_of: impl Fn(&str) -> String,
) -> Result<(), EngineError>
where
    S: StructureSource + ?Sized,
    K: SceneSink + ?Sized,
{
    let bucket = resolver.begin_bucket(kind, label);
    reporter.report(Progress::BucketStart {
        id: bucket.id,
        label: bucket.label.clone(),
    });
    info!(bucket = bucket.id, label, ingredients = block.len(), "Walking bucket.");

    for entry in &block.ingredients {
        let path = path_of(entry.name());
        let report = match entry {
            IngredientEntry::Particle(particle) => resolver.resolve_particle(&path, particle)?,
            IngredientEntry::Curve(curve) => resolver.resolve_curve(&path, curve),
        };
        summary.record(report, matches!(entry, IngredientEntry::Curve(_)));
        reporter.report(Progress::TaskIncrement);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::InMemoryStructures;
    use crate::core::models::atom::{AtomSet, LoadedAtom};
    use crate::engine::config::LoadConfigBuilder;
    use crate::engine::store::SceneStore;
    use nalgebra::{Matrix4, Point3, UnitQuaternion};
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    const EPS: f64 = 1e-9;

    fn config() -> LoadConfig {
        LoadConfigBuilder::new().seed(42).build().unwrap()
    }

    fn two_atoms() -> AtomSet {
        AtomSet::new(vec![
            LoadedAtom::new("N", Point3::new(0.0, 0.0, 0.0), 1.0),
            LoadedAtom::new("C", Point3::new(2.0, 0.0, 0.0), 1.0),
        ])
    }

    fn load(recipe: &str, source: &InMemoryStructures) -> (LoadSummary, SceneStore) {
        let recipe: Recipe = recipe.parse().unwrap();
        let mut store = SceneStore::new();
        let summary = run(&recipe, source, &mut store, &config(), &ProgressReporter::new()).unwrap();
        (summary, store)
    }

    #[test]
    fn single_surface_ingredient_end_to_end() {
        let mut source = InMemoryStructures::new();
        source.insert("1ABC", two_atoms());
        let recipe = r#"{
            "compartments": {
                "c1": {
                    "interior": { "ingredients": [] },
                    "surface": { "ingredients": [
                        { "name": "A",
                          "source": { "pdb": "1ABC", "biomt": false, "transform": { "center": true } },
                          "results": [[[0, 0, 0], [0, 0, 0, 1]]] }
                    ] }
                }
            }
        }"#;
        let (summary, store) = load(recipe, &source);

        assert_eq!(summary.structures, 1);
        assert_eq!(summary.instances, 1);
        assert_eq!(summary.total_atoms, 2);
        assert!(summary.issues.is_empty());

        let definition = store.structure_by_path("root.c1.surface.A").unwrap();
        assert!((definition.bounds.radius - 2.0).abs() < EPS);
        let id = store.structure_id("root.c1.surface.A").unwrap();
        let instance = store.instances(id)[0];
        assert!(instance.position.coords.norm() < EPS);
        assert!(instance.rotation.angle_to(&UnitQuaternion::identity()) < EPS);
    }

    #[test]
    fn none_structure_is_skipped_without_aborting_the_block() {
        let mut source = InMemoryStructures::new();
        source.insert("1ABC", two_atoms());
        let recipe = r#"{
            "cytoplasme": { "ingredients": [
                { "name": "ghost", "source": { "pdb": "None" }, "results": [[[0, 0, 0], [0, 0, 0, 1]]] },
                { "name": "A", "source": { "pdb": "1ABC.pdb" }, "results": [[[0, 0, 0], [0, 0, 0, 1]]] }
            ] }
        }"#;
        let (summary, store) = load(recipe, &source);

        assert_eq!(summary.ingredients_seen, 2);
        assert_eq!(summary.ingredients_skipped, 1);
        assert!(store.structure_by_path("root.cytoplasme.ghost").is_none());
        assert!(store.structure_by_path("root.cytoplasme.A").is_some());
        assert_eq!(store.instance_count(), 1);
    }

    #[test]
    fn curve_ingredients_respect_the_point_minimum() {
        let recipe = r#"{
            "cytoplasme": { "ingredients": [
                { "name": "long", "source": { "pdb": "None" }, "nbCurve": 1,
                  "curve0": [[0,0,0],[1,0,0],[2,0,0],[3,0,0],[4,0,0]] },
                { "name": "short", "source": { "pdb": "None" }, "nbCurve": 1,
                  "curve0": [[0,0,0],[1,0,0],[2,0,0]] }
            ] }
        }"#;
        let (summary, store) = load(recipe, &InMemoryStructures::new());

        assert_eq!(summary.curve_structures, 2);
        assert_eq!(summary.curve_instances, 1);
        assert_eq!(summary.issues.len(), 1);
        assert_eq!(
            store.curve_structure("root.cytoplasme.long").unwrap().curves[0].len(),
            5
        );
        assert!(store.curve_structure("root.cytoplasme.short").unwrap().curves.is_empty());
    }

    #[test]
    fn buckets_follow_document_order() {
        let recipe = r#"{
            "cytoplasme": { "ingredients": [] },
            "compartments": {
                "zeta": { "interior": { "ingredients": [] }, "surface": { "ingredients": [] } },
                "alpha": { "interior": { "ingredients": [] }, "surface": { "ingredients": [] } }
            }
        }"#;
        let (summary, store) = load(recipe, &InMemoryStructures::new());

        let labels: Vec<_> = summary.buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "root.cytoplasme",
                "root.zeta.interior",
                "root.zeta.surface",
                "root.alpha.interior",
                "root.alpha.surface"
            ]
        );
        let ids: Vec<_> = summary.buckets.iter().map(|b| b.id).collect();
        assert_eq!(ids, [0, 1, 2, 3, 4]);
        assert_eq!(store.buckets(), summary.buckets.as_slice());

        for bucket in &summary.buckets {
            assert_eq!(bucket.base_color, bucket.kind.base_color());
        }
        assert_eq!(summary.hue_series.len(), config().palette.hue_series_size);
    }

    #[test]
    fn colors_are_unique_within_a_bucket() {
        let mut source = InMemoryStructures::new();
        let names = ["A", "B", "C", "D", "E", "F"];
        let mut entries = Vec::new();
        for name in names {
            source.insert(name, two_atoms());
            entries.push(format!(
                r#"{{ "name": "{name}", "source": {{ "pdb": "{name}" }}, "results": [] }}"#
            ));
        }
        let recipe = format!(
            r#"{{ "cytoplasme": {{ "ingredients": [{}] }} }}"#,
            entries.join(",")
        );
        let (summary, store) = load(&recipe, &source);

        assert!(summary.issues.is_empty());
        let colors: HashSet<_> = store
            .structures_iter()
            .map(|(_, def)| def.color.to_array().map(f64::to_bits))
            .collect();
        assert_eq!(colors.len(), names.len());
    }

    #[test]
    fn symmetric_ingredients_fan_out() {
        let mut shifted = Matrix4::identity();
        shifted[(1, 3)] = 4.0;
        let mut source = InMemoryStructures::new();
        source.insert_with_symmetry(
            "3CAP",
            two_atoms(),
            vec![Matrix4::identity(), shifted, Matrix4::identity()],
        );
        let recipe = r#"{
            "cytoplasme": { "ingredients": [
                { "name": "capsid", "source": { "pdb": "3CAP", "biomt": true },
                  "results": [[[0, 0, 0], [0, 0, 0, 1]], [[10, 0, 0], [0, 0, 0, 1]]] }
            ] }
        }"#;
        let (summary, store) = load(recipe, &source);

        assert_eq!(summary.instances, 6);
        assert_eq!(summary.total_atoms, 12);
        let id = store.structure_id("root.cytoplasme.capsid").unwrap();
        assert_eq!(store.counts(id).instance_count, 6);
    }

    #[test]
    fn repeated_paths_add_instances_to_one_structure() {
        let mut source = InMemoryStructures::new();
        source.insert("1ABC", two_atoms());
        let recipe = r#"{
            "cytoplasme": { "ingredients": [
                { "name": "A", "source": { "pdb": "1ABC" }, "results": [[[0, 0, 0], [0, 0, 0, 1]]] },
                { "name": "A", "source": { "pdb": "1ABC" }, "results": [[[1, 0, 0], [0, 0, 0, 1]]] }
            ] }
        }"#;
        let (summary, store) = load(recipe, &source);

        assert_eq!(summary.structures, 1);
        assert_eq!(summary.instances, 2);
        assert_eq!(store.structure_count(), 1);
        assert_eq!(store.instance_count(), 2);
    }

    #[test]
    fn unresolvable_structures_are_collected_as_issues() {
        let recipe = r#"{
            "compartments": { "c1": {
                "interior": { "ingredients": [
                    { "name": "lost", "source": { "pdb": "0XXX" }, "results": [] }
                ] }
            } }
        }"#;
        let (summary, _) = load(recipe, &InMemoryStructures::new());
        assert_eq!(summary.ingredients_skipped, 1);
        assert!(matches!(
            &summary.issues[..],
            [IngredientIssue::UnresolvableStructure { path, .. }] if path == "root.c1.interior.lost"
        ));
    }

    #[test]
    fn invalid_config_aborts_before_walking() {
        let recipe: Recipe = r#"{ "cytoplasme": { "ingredients": [] } }"#.parse().unwrap();
        let mut config = config();
        config.palette.size = 0;
        let mut store = SceneStore::new();
        let result = run(
            &recipe,
            &InMemoryStructures::new(),
            &mut store,
            &config,
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(EngineError::Config { .. })));
        assert!(store.buckets().is_empty());
    }

    #[test]
    fn progress_counts_every_ingredient() {
        let recipe: Recipe = r#"{
            "cytoplasme": { "ingredients": [
                { "name": "a", "source": { "pdb": "None" }, "results": [] },
                { "name": "b", "source": { "pdb": "None" }, "results": [] }
            ] },
            "compartments": { "c": { "surface": { "ingredients": [
                { "name": "c", "source": { "pdb": "None" }, "results": [] }
            ] } } }
        }"#
        .parse()
        .unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&events);
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            recorded.lock().unwrap().push(event);
        }));
        let mut store = SceneStore::new();
        run(&recipe, &InMemoryStructures::new(), &mut store, &config(), &reporter).unwrap();

        let events = events.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, Progress::TaskStart { total_steps: 3 })));
        let increments = events
            .iter()
            .filter(|e| matches!(e, Progress::TaskIncrement))
            .count();
        assert_eq!(increments, 3);
    }

    #[test]
    fn path_helpers_match_recipe_layout() {
        assert_eq!(cytoplasm_path("A"), "root.cytoplasme.A");
        assert_eq!(
            compartment_path("HIV", BucketKind::Surface, "gp120"),
            "root.HIV.surface.gp120"
        );
    }
}
