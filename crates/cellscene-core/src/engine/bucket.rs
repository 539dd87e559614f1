use crate::core::color::{PaletteError, Rgb, sample_unique};
use rand::Rng;
use std::fmt;

/// The traversal branch a bucket belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKind {
    Cytoplasm,
    Interior,
    Surface,
}

impl BucketKind {
    /// Segment used for this branch in ingredient paths.
    pub fn path_segment(self) -> &'static str {
        match self {
            BucketKind::Cytoplasm => "cytoplasme",
            BucketKind::Interior => "interior",
            BucketKind::Surface => "surface",
        }
    }

    /// Base color shared by every bucket of this kind, channels in `[0, 1]`.
    pub fn base_color(self) -> Rgb {
        match self {
            BucketKind::Cytoplasm => Rgb::new(1.0, 107.0 / 255.0, 66.0 / 255.0),
            BucketKind::Interior => Rgb::new(148.0 / 255.0, 66.0 / 255.0, 1.0),
            BucketKind::Surface => Rgb::new(173.0 / 255.0, 1.0, 66.0 / 255.0),
        }
    }
}

impl fmt::Display for BucketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Public description of a bucket, as reported to sinks and in load summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketDescriptor {
    /// Position of the bucket in traversal order.
    pub id: usize,
    pub kind: BucketKind,
    /// Path prefix shared by every ingredient of the bucket, e.g. `root.HIV.surface`.
    pub label: String,
    /// Color of the bucket's kind, channels in `[0, 1]`.
    pub base_color: Rgb,
}

/// Result of one color draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorDraw {
    pub index: usize,
    /// The palette was exhausted and an already-issued index was handed out again.
    pub reused: bool,
}

/// Per-branch color allocator.
///
/// Issues each palette index at most once until the palette is exhausted,
/// then cycles through issued indices least recently used first.
#[derive(Debug, Clone)]
pub struct ColorBucket {
    descriptor: BucketDescriptor,
    /// Issued indices, least recently issued first.
    issued: Vec<usize>,
}

impl ColorBucket {
    pub fn new(descriptor: BucketDescriptor) -> Self {
        Self {
            descriptor,
            issued: Vec::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.descriptor.id
    }

    pub fn descriptor(&self) -> &BucketDescriptor {
        &self.descriptor
    }

    pub fn issued(&self) -> &[usize] {
        &self.issued
    }

    /// Draws a palette index for a new structure.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::Exhausted`] only when the palette is empty, since
    /// there is then nothing to fall back on.
    pub fn draw(&mut self, palette_len: usize, rng: &mut impl Rng) -> Result<ColorDraw, PaletteError> {
        match sample_unique(palette_len, &self.issued, rng) {
            Ok(index) => {
                self.issued.push(index);
                Ok(ColorDraw {
                    index,
                    reused: false,
                })
            }
            Err(err) => {
                if self.issued.is_empty() {
                    return Err(err);
                }
                let index = self.issued.remove(0);
                self.issued.push(index);
                Ok(ColorDraw { index, reused: true })
            }
        }
    }
}
