use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "CellScene Developers",
    version,
    about = "CellScene CLI - Resolves mesoscale cell-scene recipes into structures, instances and curves ready for rendering.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a recipe, resolve every ingredient and report the resulting scene.
    Load(LoadArgs),
    /// Validate a recipe and list its blocks without loading any structure.
    Inspect(InspectArgs),
}

/// Arguments for the `load` subcommand.
#[derive(Args, Debug)]
pub struct LoadArgs {
    // --- Core Arguments ---
    /// Path to the recipe JSON document.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub recipe: PathBuf,

    /// Directory containing `<id>.pdb` or `<id>.bin` structure files.
    #[arg(short = 'd', long, required = true, value_name = "DIR")]
    pub structures: PathBuf,

    /// Write the resolved scene as JSON to this path.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Palette Overrides ---
    /// Seed for palette generation and color sampling.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Number of perceptual colors available to each bucket.
    #[arg(long, value_name = "INT")]
    pub palette_size: Option<usize>,

    /// Number of relaxation iterations spent spreading the palette.
    #[arg(long, value_name = "INT")]
    pub palette_steps: Option<usize>,

    /// Relax the palette with force-vector repulsion instead of k-means.
    #[arg(long)]
    pub force_vector: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S palette.size=12
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the recipe JSON document.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub recipe: PathBuf,
}
