use super::model::{
    Compartment, CurveIngredient, IngredientBlock, IngredientEntry, IngredientSource,
    ParticleIngredient, Placement, Recipe,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

const DOCUMENT: &str = "<document>";

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Malformed recipe at '{location}': {reason}")]
    Malformed { location: String, reason: String },
}

fn malformed(location: impl Into<String>, reason: impl Into<String>) -> RecipeError {
    RecipeError::Malformed {
        location: location.into(),
        reason: reason.into(),
    }
}

#[derive(Debug, Deserialize)]
struct RawIngredient {
    name: String,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    results: Option<Vec<([f64; 3], [f64; 4])>>,
    #[serde(rename = "nbCurve", default)]
    nb_curve: Option<usize>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSource {
    #[serde(default)]
    pdb: Option<String>,
    #[serde(default)]
    biomt: Option<bool>,
    #[serde(default)]
    transform: Option<RawTransform>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTransform {
    #[serde(default)]
    center: Option<bool>,
}

impl From<RawSource> for IngredientSource {
    fn from(raw: RawSource) -> Self {
        Self {
            structure_id: raw.pdb.unwrap_or_default().trim().replace(".pdb", ""),
            use_symmetry: raw.biomt.unwrap_or(false),
            center_on_load: raw.transform.and_then(|t| t.center).unwrap_or(false),
        }
    }
}

impl Recipe {
    /// Reads and validates a recipe document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::Io`] if the file cannot be read and
    /// [`RecipeError::Malformed`] if its content is not a valid recipe.
    pub fn from_path(path: &Path) -> Result<Self, RecipeError> {
        debug!("Reading recipe from {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| RecipeError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        content.parse()
    }

    /// Validates an already-parsed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::Malformed`] naming the first offending location.
    pub fn from_value(root: Value) -> Result<Self, RecipeError> {
        let Value::Object(mut root) = root else {
            return Err(malformed(DOCUMENT, "expected a JSON object at the top level"));
        };

        let cytoplasm = match root.remove("cytoplasme") {
            None | Some(Value::Null) => None,
            Some(block) => Some(parse_block(block, "cytoplasme")?),
        };

        let compartments = match root.remove("compartments") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(map)) => map
                .into_iter()
                .map(|(name, value)| parse_compartment(name, value))
                .collect::<Result<_, _>>()?,
            Some(_) => {
                return Err(malformed(
                    "compartments",
                    "expected an object keyed by compartment name",
                ));
            }
        };

        Ok(Recipe {
            cytoplasm,
            compartments,
        })
    }
}

impl FromStr for Recipe {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let root: Value = serde_json::from_str(s).map_err(|e| malformed(DOCUMENT, e.to_string()))?;
        Recipe::from_value(root)
    }
}

fn parse_compartment(name: String, value: Value) -> Result<Compartment, RecipeError> {
    let location = format!("compartments.{name}");
    let Value::Object(mut map) = value else {
        return Err(malformed(location, "expected an object"));
    };

    let mut block = |key: &str| -> Result<IngredientBlock, RecipeError> {
        match map.remove(key) {
            None | Some(Value::Null) => Ok(IngredientBlock::default()),
            Some(value) => parse_block(value, &format!("{location}.{key}")),
        }
    };
    let interior = block("interior")?;
    let surface = block("surface")?;

    Ok(Compartment {
        name,
        interior,
        surface,
    })
}

fn parse_block(value: Value, location: &str) -> Result<IngredientBlock, RecipeError> {
    let Value::Object(mut map) = value else {
        return Err(malformed(location, "expected an object"));
    };

    // Ingredients may be a list or an object keyed by ingredient name; both keep
    // document order.
    let entries: Vec<Value> = match map.remove("ingredients") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(Value::Object(items)) => items.into_iter().map(|(_, v)| v).collect(),
        Some(_) => {
            return Err(malformed(
                format!("{location}.ingredients"),
                "expected a list or an object of ingredients",
            ));
        }
    };

    let ingredients = entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| parse_ingredient(entry, &format!("{location}.ingredients[{i}]")))
        .collect::<Result<_, _>>()?;

    Ok(IngredientBlock { ingredients })
}

fn parse_ingredient(value: Value, location: &str) -> Result<IngredientEntry, RecipeError> {
    let raw: RawIngredient =
        serde_json::from_value(value).map_err(|e| malformed(location, e.to_string()))?;
    let source = IngredientSource::from(raw.source.unwrap_or_default());

    if let Some(curve_count) = raw.nb_curve {
        let curves = (0..curve_count)
            .map(|i| parse_curve(&raw.extra, i, location))
            .collect::<Result<_, _>>()?;
        return Ok(IngredientEntry::Curve(CurveIngredient {
            name: raw.name,
            source,
            curve_count,
            curves,
        }));
    }

    let results = raw
        .results
        .unwrap_or_default()
        .into_iter()
        .map(|(position, rotation)| Placement { position, rotation })
        .collect();

    Ok(IngredientEntry::Particle(ParticleIngredient {
        name: raw.name,
        source,
        results,
    }))
}

fn parse_curve(
    extra: &Map<String, Value>,
    index: usize,
    location: &str,
) -> Result<Vec<[f64; 3]>, RecipeError> {
    let key = format!("curve{index}");
    let Some(value) = extra.get(&key) else {
        return Ok(Vec::new());
    };
    let points: Vec<Vec<f64>> = serde_json::from_value(value.clone())
        .map_err(|e| malformed(format!("{location}.{key}"), e.to_string()))?;

    points
        .into_iter()
        .enumerate()
        .map(|(k, p)| match p.as_slice() {
            [x, y, z, ..] => Ok([*x, *y, *z]),
            _ => Err(malformed(
                format!("{location}.{key}[{k}]"),
                format!("expected at least 3 coordinates, found {}", p.len()),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recipe::model::StructureRef;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "cytoplasme": {
            "ingredients": [
                {
                    "name": "ribosome",
                    "source": { "pdb": "4V6X.pdb", "biomt": false, "transform": { "center": true } },
                    "results": [[[1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]]]
                }
            ]
        },
        "compartments": {
            "zeta": {
                "interior": { "ingredients": [] },
                "surface": {
                    "ingredients": {
                        "gp120": {
                            "name": "gp120",
                            "source": { "pdb": "1GC1", "biomt": true },
                            "results": []
                        }
                    }
                }
            },
            "alpha": {
                "interior": {
                    "ingredients": [
                        {
                            "name": "rna",
                            "source": { "pdb": "None" },
                            "nbCurve": 2,
                            "curve0": [[0, 0, 0], [1, 0, 0], [2, 0, 0], [3, 0, 0]],
                            "curve1": [[0, 0, 0]]
                        }
                    ]
                }
            }
        }
    }"#;

    #[test]
    fn parses_blocks_in_document_order() {
        let recipe: Recipe = SAMPLE.parse().unwrap();
        assert!(recipe.cytoplasm.is_some());
        let names: Vec<_> = recipe.compartments.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
        assert_eq!(recipe.ingredient_count(), 3);
    }

    #[test]
    fn particle_source_fields_are_normalized() {
        let recipe: Recipe = SAMPLE.parse().unwrap();
        let IngredientEntry::Particle(ribosome) = &recipe.cytoplasm.unwrap().ingredients[0] else {
            panic!("expected a particle ingredient");
        };
        assert_eq!(ribosome.source.structure_id, "4V6X");
        assert!(ribosome.source.center_on_load);
        assert!(!ribosome.source.use_symmetry);
        assert_eq!(ribosome.results[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(ribosome.results[0].rotation, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn ingredient_objects_are_accepted_and_missing_blocks_are_empty() {
        let recipe: Recipe = SAMPLE.parse().unwrap();
        let zeta = &recipe.compartments[0];
        assert!(zeta.interior.is_empty());
        assert_eq!(zeta.surface.ingredients[0].name(), "gp120");
        assert!(zeta.surface.ingredients[0].source().use_symmetry);

        let alpha = &recipe.compartments[1];
        assert!(alpha.surface.is_empty());
    }

    #[test]
    fn curve_ingredients_collect_indexed_curves() {
        let recipe: Recipe = SAMPLE.parse().unwrap();
        let IngredientEntry::Curve(rna) = &recipe.compartments[1].interior.ingredients[0] else {
            panic!("expected a curve ingredient");
        };
        assert_eq!(rna.curve_count, 2);
        assert_eq!(rna.curves[0].len(), 4);
        assert_eq!(rna.curves[1].len(), 1);
        assert_eq!(rna.source.structure_ref(), StructureRef::Missing);
    }

    #[test]
    fn missing_curve_keys_yield_empty_curves() {
        let recipe: Recipe = r#"{ "cytoplasme": { "ingredients": [
            { "name": "dna", "nbCurve": 3, "curve1": [[0,0,0],[1,1,1],[2,2,2],[3,3,3]] }
        ] } }"#
            .parse()
            .unwrap();
        let IngredientEntry::Curve(dna) = &recipe.cytoplasm.unwrap().ingredients[0] else {
            panic!("expected a curve ingredient");
        };
        assert_eq!(dna.curves.len(), 3);
        assert!(dna.curves[0].is_empty());
        assert_eq!(dna.curves[1].len(), 4);
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = "{ not json".parse::<Recipe>().unwrap_err();
        assert!(matches!(err, RecipeError::Malformed { ref location, .. } if location == DOCUMENT));
    }

    #[test]
    fn non_object_root_is_malformed() {
        assert!(matches!(
            "[1, 2, 3]".parse::<Recipe>(),
            Err(RecipeError::Malformed { .. })
        ));
    }

    #[test]
    fn missing_ingredient_name_reports_its_location() {
        let err = r#"{ "compartments": { "c1": { "surface": { "ingredients": [ { "source": {} } ] } } } }"#
            .parse::<Recipe>()
            .unwrap_err();
        match err {
            RecipeError::Malformed { location, .. } => {
                assert_eq!(location, "compartments.c1.surface.ingredients[0]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrongly_shaped_results_are_malformed() {
        let err = r#"{ "cytoplasme": { "ingredients": [
            { "name": "a", "source": { "pdb": "1ABC" }, "results": [[[0, 0], [0, 0, 0, 1]]] }
        ] } }"#
            .parse::<Recipe>()
            .unwrap_err();
        assert!(matches!(err, RecipeError::Malformed { .. }));
    }

    #[test]
    fn short_curve_points_are_malformed() {
        let err = r#"{ "cytoplasme": { "ingredients": [
            { "name": "a", "nbCurve": 1, "curve0": [[0, 0]] }
        ] } }"#
            .parse::<Recipe>()
            .unwrap_err();
        match err {
            RecipeError::Malformed { location, .. } => {
                assert_eq!(location, "cytoplasme.ingredients[0].curve0[0]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn compartments_must_be_an_object() {
        let err = r#"{ "compartments": [] }"#.parse::<Recipe>().unwrap_err();
        assert!(matches!(err, RecipeError::Malformed { ref location, .. } if location == "compartments"));
    }

    #[test]
    fn from_path_reads_a_file_and_reports_missing_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let recipe = Recipe::from_path(file.path()).unwrap();
        assert_eq!(recipe.compartments.len(), 2);

        let missing = Recipe::from_path(Path::new("/definitely/not/here.json"));
        assert!(matches!(missing, Err(RecipeError::Io { .. })));
    }
}
