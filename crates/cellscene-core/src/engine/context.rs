use super::bucket::{BucketDescriptor, BucketKind, ColorBucket, ColorDraw};
use super::config::LoadConfig;
use super::error::EngineError;
use crate::core::color::{Rgb, generate_hue_series, generate_perceptual_palette, lab_to_rgb};
use crate::core::models::structure::BoundingSphere;
use crate::core::utils::geometry::SymmetryExpansion;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Leading hues dropped from the series; they sit too close to the
/// cytoplasm base color.
const HUE_SERIES_SKIP: usize = 2;

/// Geometry derived once per ingredient path and reused by later references.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStructure {
    /// Bounds of the atoms before recentering.
    pub raw_bounds: BoundingSphere,
    /// Present when the first reference requested symmetry expansion.
    pub symmetry: Option<SymmetryExpansion>,
    pub atom_count: usize,
    /// Instances placed so far across every reference to the path.
    pub instance_count: usize,
}

/// All mutable state of one recipe load.
///
/// Created at the start of a load and dropped when it returns, so nothing
/// leaks between loads.
pub struct LoadContext {
    rng: StdRng,
    /// Perceptual palette shared by every bucket, channels in `[0, 1]`.
    palette: Vec<Rgb>,
    /// Accent hues reported with the scene, channels in `[0, 1]`.
    hue_series: Vec<Rgb>,
    buckets: Vec<ColorBucket>,
    structures: HashMap<String, ResolvedStructure>,
    curve_paths: HashSet<String>,
}

impl LoadContext {
    pub fn new(config: &LoadConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let palette = generate_perceptual_palette(
            config.palette.size,
            config.palette.steps,
            config.palette.strategy,
            &mut rng,
        )
        .iter()
        .map(|lab| lab_to_rgb(lab).to_unit())
        .collect();
        let hue_series = generate_hue_series(config.palette.hue_series_size + HUE_SERIES_SKIP)
            .into_iter()
            .skip(HUE_SERIES_SKIP)
            .map(Rgb::to_unit)
            .collect();

        Ok(Self {
            rng,
            palette,
            hue_series,
            buckets: Vec::new(),
            structures: HashMap::new(),
            curve_paths: HashSet::new(),
        })
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    pub fn hue_series(&self) -> &[Rgb] {
        &self.hue_series
    }

    /// Opens the next bucket; it becomes the target of subsequent color draws.
    pub fn open_bucket(&mut self, kind: BucketKind, label: &str) -> &BucketDescriptor {
        let id = self.buckets.len();
        let base_color = kind.base_color();
        debug!(id, %kind, label, "Opening color bucket.");
        self.buckets.push(ColorBucket::new(BucketDescriptor {
            id,
            kind,
            label: label.to_string(),
            base_color,
        }));
        self.buckets[id].descriptor()
    }

    pub fn current_bucket(&self) -> Option<&ColorBucket> {
        self.buckets.last()
    }

    pub fn bucket_descriptors(&self) -> Vec<BucketDescriptor> {
        self.buckets.iter().map(|b| b.descriptor().clone()).collect()
    }

    /// Draws a structure color from the current bucket.
    pub fn draw_color(&mut self) -> Result<(Rgb, ColorDraw, usize), EngineError> {
        let bucket = self
            .buckets
            .last_mut()
            .ok_or_else(|| EngineError::Internal("color requested before any bucket was opened".into()))?;
        let draw = bucket
            .draw(self.palette.len(), &mut self.rng)
            .map_err(|source| EngineError::Palette {
                bucket: bucket.id(),
                source,
            })?;
        let color = self.palette[draw.index];
        Ok((color, draw, bucket.id()))
    }

    pub fn structure(&self, path: &str) -> Option<&ResolvedStructure> {
        self.structures.get(path)
    }

    pub fn record_structure(&mut self, path: &str, resolved: ResolvedStructure) {
        self.structures.insert(path.to_string(), resolved);
    }

    /// Adds to the running instance total of `path` and returns the new total.
    pub fn add_instances(&mut self, path: &str, count: usize) -> usize {
        match self.structures.get_mut(path) {
            Some(resolved) => {
                resolved.instance_count += count;
                resolved.instance_count
            }
            None => count,
        }
    }

    /// Marks a curve path as registered; `false` if it already was.
    pub fn register_curve_path(&mut self, path: &str) -> bool {
        self.curve_paths.insert(path.to_string())
    }
}
