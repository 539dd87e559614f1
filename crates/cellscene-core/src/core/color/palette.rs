use super::lab::{Lab, Rgb};
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{debug, instrument};

const HUE_SATURATION: f64 = 0.65;
const HUE_VALUE: f64 = 0.95;

const FORCE_REPULSION: f64 = 100.0;
const FORCE_SPEED: f64 = 100.0;
const FORCE_MAX_STEP: f64 = 0.1;

const GRID_L_STEP: usize = 5;
const GRID_AB_STEP: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaletteError {
    #[error("All {size} palette colors have already been issued in this bucket")]
    Exhausted { size: usize },
}

/// Relaxation method used to spread perceptual palette samples apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaletteStrategy {
    /// Pairwise inverse-square repulsion between samples.
    ForceVector,
    /// Lloyd iterations over a quantized grid of in-gamut Lab colors.
    #[default]
    KMeans,
}

/// Generates `count` colors with evenly spaced hues at fixed saturation and value.
///
/// Channels are on the 0–255 scale. The result depends only on `count`.
pub fn generate_hue_series(count: usize) -> Vec<Rgb> {
    (0..count)
        .map(|i| hsv_to_rgb(360.0 * i as f64 / count as f64, HUE_SATURATION, HUE_VALUE))
        .collect()
}

fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Rgb {
    let c = value * saturation;
    let sector = (hue / 60.0).rem_euclid(6.0);
    let x = c * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;
    Rgb::new((r + m) * 255.0, (g + m) * 255.0, (b + m) * 255.0)
}

/// Every in-gamut color of a coarse Lab lattice.
///
/// Serves both as the k-means sample population and as the seed pool for the
/// force-vector method.
pub fn in_gamut_lab_grid() -> Vec<Lab> {
    let mut samples = Vec::new();
    for l in (0..=100).step_by(GRID_L_STEP) {
        for a in (0..=200).step_by(GRID_AB_STEP) {
            for b in (0..=200).step_by(GRID_AB_STEP) {
                let lab = Lab::new(l as f64, a as f64 - 100.0, b as f64 - 100.0);
                if lab.is_in_gamut() {
                    samples.push(lab);
                }
            }
        }
    }
    samples
}

/// Generates `count` mutually distant Lab colors.
///
/// The result is fully determined by the state of `rng`, so a seeded RNG gives
/// reproducible palettes.
#[instrument(level = "debug", skip(rng))]
pub fn generate_perceptual_palette(
    count: usize,
    steps: usize,
    strategy: PaletteStrategy,
    rng: &mut impl Rng,
) -> Vec<Lab> {
    if count == 0 {
        return Vec::new();
    }
    let grid = in_gamut_lab_grid();
    let mut colors: Vec<Lab> = (0..count)
        .map(|_| *grid.choose(rng).unwrap_or(&Lab::new(50.0, 0.0, 0.0)))
        .collect();

    match strategy {
        PaletteStrategy::ForceVector => relax_by_force(&mut colors, steps, rng),
        PaletteStrategy::KMeans => relax_by_kmeans(&mut colors, &grid, steps),
    }

    debug!(count, steps, ?strategy, "Perceptual palette generated.");
    colors
}

fn relax_by_force(colors: &mut [Lab], steps: usize, rng: &mut impl Rng) {
    // Work in Lab / 100 so that L spans [0, 1] and a, b span [-1, 1].
    let mut points: Vec<[f64; 3]> = colors
        .iter()
        .map(|c| [c.l / 100.0, c.a / 100.0, c.b / 100.0])
        .collect();

    for _ in 0..steps {
        let mut vectors = vec![[0.0f64; 3]; points.len()];
        for i in 0..points.len() {
            for j in 0..i {
                let delta = [
                    points[i][0] - points[j][0],
                    points[i][1] - points[j][1],
                    points[i][2] - points[j][2],
                ];
                let d = (delta[0] * delta[0] + delta[1] * delta[1] + delta[2] * delta[2]).sqrt();
                if d > 0.0 {
                    let force = FORCE_REPULSION / (d * d);
                    for k in 0..3 {
                        vectors[i][k] += delta[k] * force / d;
                        vectors[j][k] -= delta[k] * force / d;
                    }
                } else {
                    // Coincident samples get a random push apart.
                    for k in 0..3 {
                        let nudge = rng.gen_range(-1.0..1.0);
                        vectors[j][k] += nudge;
                        vectors[i][k] -= nudge;
                    }
                }
            }
        }

        for (point, vector) in points.iter_mut().zip(&vectors) {
            let magnitude =
                (vector[0] * vector[0] + vector[1] * vector[1] + vector[2] * vector[2]).sqrt();
            let displacement = FORCE_SPEED * magnitude;
            if displacement > 0.0 {
                let ratio = FORCE_SPEED * displacement.min(FORCE_MAX_STEP) / displacement;
                let candidate = Lab::new(
                    (point[0] + vector[0] * ratio) * 100.0,
                    (point[1] + vector[1] * ratio) * 100.0,
                    (point[2] + vector[2] * ratio) * 100.0,
                );
                if candidate.is_in_gamut() {
                    *point = [candidate.l / 100.0, candidate.a / 100.0, candidate.b / 100.0];
                }
            }
        }
    }

    for (color, point) in colors.iter_mut().zip(points) {
        *color = Lab::new(point[0] * 100.0, point[1] * 100.0, point[2] * 100.0);
    }
}

fn closest_index(target: &Lab, candidates: &[Lab]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            target
                .distance(a)
                .partial_cmp(&target.distance(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
}

fn relax_by_kmeans(means: &mut [Lab], samples: &[Lab], steps: usize) {
    if samples.is_empty() {
        return;
    }
    let mut closest = vec![0usize; samples.len()];

    for _ in 0..steps {
        for (sample, slot) in samples.iter().zip(closest.iter_mut()) {
            *slot = closest_index(sample, means).unwrap_or(0);
        }

        let mut free_samples: Vec<Lab> = samples.to_vec();
        for j in 0..means.len() {
            let (mut count, mut sum) = (0usize, [0.0f64; 3]);
            for (sample, &owner) in samples.iter().zip(&closest) {
                if owner == j {
                    count += 1;
                    sum[0] += sample.l;
                    sum[1] += sample.a;
                    sum[2] += sample.b;
                }
            }

            let candidate = (count > 0).then(|| {
                let n = count as f64;
                Lab::new(sum[0] / n, sum[1] / n, sum[2] / n)
            });

            let updated = match candidate {
                Some(mean) if mean.is_in_gamut() => mean,
                _ => {
                    // Empty cluster or centroid outside the gamut: snap to the
                    // nearest sample no other mean has claimed yet.
                    let target = candidate.unwrap_or(means[j]);
                    let pool = if free_samples.is_empty() {
                        samples
                    } else {
                        free_samples.as_slice()
                    };
                    closest_index(&target, pool).map_or(means[j], |i| pool[i])
                }
            };
            means[j] = updated;
            free_samples.retain(|s| *s != updated);
        }
    }
}

/// Picks a random palette index that is not in `used`.
///
/// # Errors
///
/// Returns [`PaletteError::Exhausted`] when every index of the palette is already used.
pub fn sample_unique(
    palette_len: usize,
    used: &[usize],
    rng: &mut impl Rng,
) -> Result<usize, PaletteError> {
    let free: Vec<usize> = (0..palette_len).filter(|i| !used.contains(i)).collect();
    free.choose(rng)
        .copied()
        .ok_or(PaletteError::Exhausted { size: palette_len })
}
