use crate::cli::LoadArgs;
use crate::error::{CliError, Result};
use cellscene::core::color::PaletteStrategy;
use cellscene::engine::config::{LoadConfig, LoadConfigBuilder};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum PartialPaletteStrategy {
    KMeans,
    ForceVector,
}

impl From<PartialPaletteStrategy> for PaletteStrategy {
    fn from(p: PartialPaletteStrategy) -> Self {
        match p {
            PartialPaletteStrategy::KMeans => PaletteStrategy::KMeans,
            PartialPaletteStrategy::ForceVector => PaletteStrategy::ForceVector,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialPaletteConfig {
    size: Option<usize>,
    steps: Option<usize>,
    strategy: Option<PartialPaletteStrategy>,
    hue_series_size: Option<usize>,
}

/// Load configuration as written in a TOML file; every field is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialLoadConfig {
    seed: Option<u64>,
    palette: Option<PartialPaletteConfig>,
}

impl PartialLoadConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Layers `-S` overrides and then explicit flags on top of the file values.
    pub fn merge_with_cli(mut self, args: &LoadArgs) -> Result<LoadConfig> {
        self.apply_set_values(&args.set_values)?;

        let palette = self.palette.take().unwrap_or_default();
        let mut builder = LoadConfigBuilder::new();

        if let Some(size) = args.palette_size.or(palette.size) {
            builder = builder.palette_size(size);
        }
        if let Some(steps) = args.palette_steps.or(palette.steps) {
            builder = builder.palette_steps(steps);
        }
        let strategy = if args.force_vector {
            Some(PaletteStrategy::ForceVector)
        } else {
            palette.strategy.map(PaletteStrategy::from)
        };
        if let Some(strategy) = strategy {
            builder = builder.palette_strategy(strategy);
        }
        if let Some(size) = palette.hue_series_size {
            builder = builder.hue_series_size(size);
        }
        if let Some(seed) = args.seed.or(self.seed) {
            builder = builder.seed(seed);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value_str = value_str.trim();

            let integer = || -> Result<usize> {
                value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid integer value for {}: {}", key, value_str))
                })
            };

            match key {
                "seed" => {
                    self.seed = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!("Invalid seed value for {}: {}", key, value_str))
                    })?);
                }
                "palette.size" => {
                    self.palette.get_or_insert_with(Default::default).size = Some(integer()?);
                }
                "palette.steps" => {
                    self.palette.get_or_insert_with(Default::default).steps = Some(integer()?);
                }
                "palette.hue-series-size" => {
                    self.palette
                        .get_or_insert_with(Default::default)
                        .hue_series_size = Some(integer()?);
                }
                "palette.strategy" => {
                    let strategy = match value_str {
                        "k-means" => PartialPaletteStrategy::KMeans,
                        "force-vector" => PartialPaletteStrategy::ForceVector,
                        _ => {
                            return Err(CliError::Config(format!(
                                "Invalid strategy for {}: '{}' (expected 'k-means' or 'force-vector')",
                                key, value_str
                            )));
                        }
                    };
                    self.palette.get_or_insert_with(Default::default).strategy = Some(strategy);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
