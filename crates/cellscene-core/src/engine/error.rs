use thiserror::Error;

use super::config::ConfigError;
use crate::core::color::PaletteError;
use crate::core::utils::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid load configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Geometry computation failed for '{path}': {source}")]
    Geometry {
        path: String,
        #[source]
        source: GeometryError,
    },

    #[error("Color allocation failed in bucket {bucket}: {source}")]
    Palette {
        bucket: usize,
        #[source]
        source: PaletteError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

/// A problem with one ingredient that is reported but does not stop the load.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IngredientIssue {
    #[error("Structure '{structure_id}' for '{path}' could not be resolved: {reason}")]
    UnresolvableStructure {
        path: String,
        structure_id: String,
        reason: String,
    },

    #[error("Structure '{structure_id}' for '{path}' has no atoms")]
    EmptyGeometry { path: String, structure_id: String },

    #[error(
        "Bucket {bucket} ran out of unique colors for '{path}'; reusing palette index {reused_index}"
    )]
    ExhaustedPalette {
        path: String,
        bucket: usize,
        reused_index: usize,
    },

    #[error("Curve {curve_index} of '{path}' has {points} control point(s); at least {required} are needed")]
    InsufficientCurveData {
        path: String,
        curve_index: usize,
        points: usize,
        required: usize,
    },
}

impl IngredientIssue {
    /// Ingredient path the issue belongs to.
    pub fn path(&self) -> &str {
        match self {
            IngredientIssue::UnresolvableStructure { path, .. }
            | IngredientIssue::EmptyGeometry { path, .. }
            | IngredientIssue::ExhaustedPalette { path, .. }
            | IngredientIssue::InsufficientCurveData { path, .. } => path,
        }
    }

    /// Whether the ingredient (or curve) was dropped because of this issue.
    pub fn is_skip(&self) -> bool {
        !matches!(self, IngredientIssue::ExhaustedPalette { .. })
    }
}
