use crate::cli::LoadArgs;
use crate::config::PartialLoadConfig;
use crate::error::{CliError, Result};
use crate::export::SceneDocument;
use crate::utils::progress::CliProgressHandler;
use cellscene::{
    core::{io::StructureDirectory, recipe::Recipe},
    engine::{progress::ProgressReporter, store::SceneStore},
    workflows::{self, load::LoadSummary},
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{info, warn};

pub fn run(args: LoadArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialLoadConfig::from_file(path)?,
        None => PartialLoadConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let final_config = partial_config.merge_with_cli(&args)?;

    if !args.structures.is_dir() {
        return Err(CliError::Argument(format!(
            "Structure directory '{}' does not exist or is not a directory",
            args.structures.display()
        )));
    }

    info!("Reading recipe from {:?}", &args.recipe);
    let recipe = Recipe::from_path(&args.recipe)?;
    let source = StructureDirectory::new(&args.structures);
    let mut store = SceneStore::new();

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Loading {} ingredient(s) from {}...",
        recipe.ingredient_count(),
        args.recipe.display()
    );
    let summary = workflows::load::run(&recipe, &source, &mut store, &final_config, &reporter)?;
    info!(
        structures = summary.structures,
        instances = summary.instances,
        "Recipe load finished."
    );

    print_summary(&summary);

    if let Some(output) = &args.output {
        write_scene(output, &SceneDocument::new(&store, &summary))?;
        println!("✓ Scene written to: {}", output.display());
    }

    Ok(())
}

fn print_summary(summary: &LoadSummary) {
    println!(
        "✓ {} structure(s), {} instance(s), {} atom(s) placed",
        summary.structures, summary.instances, summary.total_atoms
    );
    if summary.curve_structures > 0 {
        println!(
            "✓ {} curve structure(s), {} curve(s)",
            summary.curve_structures, summary.curve_instances
        );
    }
    if summary.ingredients_skipped > 0 {
        warn!(
            skipped = summary.ingredients_skipped,
            "Some ingredients were skipped."
        );
        println!(
            "  {} of {} ingredient(s) skipped",
            summary.ingredients_skipped, summary.ingredients_seen
        );
    }
    for issue in &summary.issues {
        println!("  ! {}", issue);
    }
}

fn write_scene(path: &Path, document: &SceneDocument) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, document).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}
