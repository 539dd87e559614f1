use crate::cli::InspectArgs;
use crate::error::Result;
use cellscene::core::recipe::{IngredientBlock, IngredientEntry, Recipe, StructureRef};
use cellscene::engine::bucket::BucketKind;
use cellscene::workflows::load::ROOT_SEGMENT;
use tracing::info;

/// Ingredient tallies of one recipe block.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BlockOverview {
    pub label: String,
    pub particles: usize,
    pub curves: usize,
    pub placements: usize,
    /// Ingredients whose structure id will be skipped at load time.
    pub unresolvable: usize,
}

impl BlockOverview {
    fn new(label: String, block: &IngredientBlock) -> Self {
        let mut overview = Self {
            label,
            ..Self::default()
        };
        for entry in &block.ingredients {
            match entry {
                IngredientEntry::Particle(p) => {
                    overview.particles += 1;
                    overview.placements += p.results.len();
                    if !matches!(p.source.structure_ref(), StructureRef::Atomic(_)) {
                        overview.unresolvable += 1;
                    }
                }
                IngredientEntry::Curve(c) => {
                    overview.curves += 1;
                    overview.placements += c.curve_count;
                }
            }
        }
        overview
    }
}

pub fn overview(recipe: &Recipe) -> Vec<BlockOverview> {
    let mut blocks = Vec::new();
    if let Some(cytoplasm) = &recipe.cytoplasm {
        blocks.push(BlockOverview::new(
            format!("{ROOT_SEGMENT}.{}", BucketKind::Cytoplasm.path_segment()),
            cytoplasm,
        ));
    }
    for compartment in &recipe.compartments {
        for (kind, block) in [
            (BucketKind::Interior, &compartment.interior),
            (BucketKind::Surface, &compartment.surface),
        ] {
            blocks.push(BlockOverview::new(
                format!("{ROOT_SEGMENT}.{}.{}", compartment.name, kind.path_segment()),
                block,
            ));
        }
    }
    blocks
}

pub fn run(args: InspectArgs) -> Result<()> {
    info!("Inspecting recipe {:?}", &args.recipe);
    let recipe = Recipe::from_path(&args.recipe)?;
    let blocks = overview(&recipe);

    println!("{}", args.recipe.display());
    println!(
        "{:<40} {:>9} {:>7} {:>11} {:>8}",
        "block", "particles", "curves", "placements", "skipped"
    );
    for block in &blocks {
        println!(
            "{:<40} {:>9} {:>7} {:>11} {:>8}",
            block.label, block.particles, block.curves, block.placements, block.unresolvable
        );
    }
    println!(
        "✓ {} ingredient(s) in {} block(s)",
        recipe.ingredient_count(),
        blocks.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_lists_blocks_in_document_order() {
        let recipe: Recipe = r#"{
            "cytoplasme": { "ingredients": [
                { "name": "A", "source": { "pdb": "1ABC" }, "results": [[[0,0,0],[0,0,0,1]], [[1,0,0],[0,0,0,1]]] },
                { "name": "Map", "source": { "pdb": "EMDB-1234" }, "results": [] }
            ] },
            "compartments": {
                "vesicle": {
                    "interior": { "ingredients": [
                        { "name": "RNA", "source": { "pdb": "None" }, "nbCurve": 2, "curve0": [], "curve1": [] }
                    ] }
                }
            }
        }"#
        .parse()
        .unwrap();

        let blocks = overview(&recipe);
        let labels: Vec<_> = blocks.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            ["root.cytoplasme", "root.vesicle.interior", "root.vesicle.surface"]
        );

        assert_eq!(blocks[0].particles, 2);
        assert_eq!(blocks[0].placements, 2);
        assert_eq!(blocks[0].unresolvable, 1);
        assert_eq!(blocks[1].curves, 1);
        assert_eq!(blocks[1].placements, 2);
        assert_eq!(blocks[2], BlockOverview {
            label: "root.vesicle.surface".into(),
            ..BlockOverview::default()
        });
    }
}
