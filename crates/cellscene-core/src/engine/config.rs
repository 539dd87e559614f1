use crate::core::color::PaletteStrategy;
use thiserror::Error;

pub const DEFAULT_PALETTE_SIZE: usize = 6;
pub const DEFAULT_PALETTE_STEPS: usize = 50;
pub const DEFAULT_HUE_SERIES_SIZE: usize = 6;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaletteConfig {
    /// Number of perceptual colors available to each bucket.
    pub size: usize,
    /// Relaxation iterations spent spreading the colors apart.
    pub steps: usize,
    pub strategy: PaletteStrategy,
    /// Number of hues bucket base colors cycle through.
    pub hue_series_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadConfig {
    pub palette: PaletteConfig,
    /// Seed for palette generation and color sampling; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            palette: PaletteConfig {
                size: DEFAULT_PALETTE_SIZE,
                steps: DEFAULT_PALETTE_STEPS,
                strategy: PaletteStrategy::default(),
                hue_series_size: DEFAULT_HUE_SERIES_SIZE,
            },
            seed: None,
        }
    }
}

#[derive(Default)]
pub struct LoadConfigBuilder {
    palette_size: Option<usize>,
    palette_steps: Option<usize>,
    palette_strategy: Option<PaletteStrategy>,
    hue_series_size: Option<usize>,
    seed: Option<u64>,
}

impl LoadConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn palette_size(mut self, size: usize) -> Self {
        self.palette_size = Some(size);
        self
    }
    pub fn palette_steps(mut self, steps: usize) -> Self {
        self.palette_steps = Some(steps);
        self
    }
    pub fn palette_strategy(mut self, strategy: PaletteStrategy) -> Self {
        self.palette_strategy = Some(strategy);
        self
    }
    pub fn hue_series_size(mut self, size: usize) -> Self {
        self.hue_series_size = Some(size);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fills unset parameters with defaults and validates the result.
    pub fn build(self) -> Result<LoadConfig, ConfigError> {
        let defaults = LoadConfig::default();
        let config = LoadConfig {
            palette: PaletteConfig {
                size: self.palette_size.unwrap_or(defaults.palette.size),
                steps: self.palette_steps.unwrap_or(defaults.palette.steps),
                strategy: self.palette_strategy.unwrap_or(defaults.palette.strategy),
                hue_series_size: self
                    .hue_series_size
                    .unwrap_or(defaults.palette.hue_series_size),
            },
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

impl LoadConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "palette_size",
                reason: "at least one color is required".into(),
            });
        }
        if self.palette.hue_series_size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "hue_series_size",
                reason: "at least one hue is required".into(),
            });
        }
        Ok(())
    }
}
