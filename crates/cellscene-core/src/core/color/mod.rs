//! Color generation for ingredient and bucket coloring.
//!
//! Two palette families are provided: a deterministic hue series used for
//! per-bucket base colors, and a perceptual Lab palette whose samples are
//! drawn without repetition within a bucket.

pub mod lab;
pub mod palette;

pub use lab::{Lab, Rgb, lab_to_rgb};
pub use palette::{
    PaletteError, PaletteStrategy, generate_hue_series, generate_perceptual_palette,
    sample_unique,
};
